// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stored workspace selection per user.
//!
//! The selection is advisory. The session manager re-validates it against
//! live memberships on every session init; a stale pointer is cleared, never
//! trusted.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stockroom_server_auth::{UserId, WorkspaceId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait SelectionStore: Send + Sync {
	async fn get_selection(&self, user_id: &UserId) -> Result<Option<WorkspaceId>, DbError>;
	async fn set_selection(
		&self,
		user_id: &UserId,
		workspace_id: &WorkspaceId,
	) -> Result<(), DbError>;
	async fn clear_selection(&self, user_id: &UserId) -> Result<(), DbError>;
}

/// Repository for the per-user workspace selection pointer.
#[derive(Clone)]
pub struct SelectionRepository {
	pool: SqlitePool,
}

impl SelectionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Read the stored selection for a user, if any.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_selection(&self, user_id: &UserId) -> Result<Option<WorkspaceId>, DbError> {
		let row = sqlx::query("SELECT workspace_id FROM workspace_selections WHERE user_id = ?")
			.bind(user_id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| {
			let id_str: String = r.get("workspace_id");
			Uuid::parse_str(&id_str)
				.map(WorkspaceId::new)
				.map_err(|e| DbError::Internal(format!("Invalid workspace ID: {e}")))
		})
		.transpose()
	}

	/// Upsert the stored selection for a user.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, workspace_id = %workspace_id))]
	pub async fn set_selection(
		&self,
		user_id: &UserId,
		workspace_id: &WorkspaceId,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO workspace_selections (user_id, workspace_id, updated_at)
			VALUES (?, ?, ?)
			ON CONFLICT(user_id) DO UPDATE SET workspace_id = excluded.workspace_id, updated_at = excluded.updated_at
			"#,
		)
		.bind(user_id.to_string())
		.bind(workspace_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Remove the stored selection for a user. Missing rows are fine.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn clear_selection(&self, user_id: &UserId) -> Result<(), DbError> {
		sqlx::query("DELETE FROM workspace_selections WHERE user_id = ?")
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}

#[async_trait]
impl SelectionStore for SelectionRepository {
	async fn get_selection(&self, user_id: &UserId) -> Result<Option<WorkspaceId>, DbError> {
		self.get_selection(user_id).await
	}

	async fn set_selection(
		&self,
		user_id: &UserId,
		workspace_id: &WorkspaceId,
	) -> Result<(), DbError> {
		self.set_selection(user_id, workspace_id).await
	}

	async fn clear_selection(&self, user_id: &UserId) -> Result<(), DbError> {
		self.clear_selection(user_id).await
	}
}
