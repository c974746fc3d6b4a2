// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace repository for database operations.
//!
//! Workspaces are the tenant boundary. Soft deletion is a `deleted_at`
//! timestamp; most reads exclude deleted rows, but the integrity auditor
//! needs to distinguish "soft-deleted" from "row does not exist at all",
//! hence [`WorkspaceRepository::all_ids_including_deleted`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashSet;
use stockroom_server_auth::{Workspace, WorkspaceId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
	async fn create_workspace(&self, workspace: &Workspace) -> Result<(), DbError>;
	async fn get_workspace_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>, DbError>;
	async fn get_workspace_by_id_including_deleted(
		&self,
		id: &WorkspaceId,
	) -> Result<Option<Workspace>, DbError>;
	async fn list_live_workspaces(&self) -> Result<Vec<Workspace>, DbError>;
	async fn list_workspaces_for_email(&self, email: &str) -> Result<Vec<Workspace>, DbError>;
	async fn all_ids_including_deleted(&self) -> Result<HashSet<WorkspaceId>, DbError>;
	async fn soft_delete_workspace(&self, id: &WorkspaceId) -> Result<(), DbError>;
}

/// Repository for workspace database operations.
#[derive(Clone)]
pub struct WorkspaceRepository {
	pool: SqlitePool,
}

impl WorkspaceRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new workspace.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate slug).
	#[tracing::instrument(skip(self, workspace), fields(workspace_id = %workspace.id, slug = %workspace.slug))]
	pub async fn create_workspace(&self, workspace: &Workspace) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO workspaces (id, name, slug, created_at, deleted_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(workspace.id.to_string())
		.bind(&workspace.name)
		.bind(&workspace.slug)
		.bind(workspace.created_at.to_rfc3339())
		.bind(workspace.deleted_at.map(|d| d.to_rfc3339()))
		.execute(&self.pool)
		.await?;

		tracing::debug!(workspace_id = %workspace.id, "workspace created");
		Ok(())
	}

	/// Get a workspace by ID, excluding soft-deleted ones.
	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn get_workspace_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, slug, created_at, deleted_at
			FROM workspaces
			WHERE id = ? AND deleted_at IS NULL
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_workspace(&r)).transpose()
	}

	/// Get a workspace by ID, including soft-deleted ones.
	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn get_workspace_by_id_including_deleted(
		&self,
		id: &WorkspaceId,
	) -> Result<Option<Workspace>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, slug, created_at, deleted_at
			FROM workspaces
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_workspace(&r)).transpose()
	}

	/// List all live (not soft-deleted) workspaces, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_live_workspaces(&self) -> Result<Vec<Workspace>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, slug, created_at, deleted_at
			FROM workspaces
			WHERE deleted_at IS NULL
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_workspace).collect()
	}

	/// List live workspaces referenced by a user's memberships, oldest first.
	///
	/// The email is compared against the stored (lowercased) membership key.
	#[tracing::instrument(skip(self, email))]
	pub async fn list_workspaces_for_email(&self, email: &str) -> Result<Vec<Workspace>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT DISTINCT w.id, w.name, w.slug, w.created_at, w.deleted_at
			FROM workspaces w
			INNER JOIN memberships m ON m.workspace_id = w.id
			WHERE m.user_email = ? AND w.deleted_at IS NULL
			ORDER BY w.created_at ASC
			"#,
		)
		.bind(email.to_ascii_lowercase())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_workspace).collect()
	}

	/// All workspace IDs, including soft-deleted rows.
	///
	/// Used by the integrity auditor to tell dangling references apart
	/// from references to soft-deleted workspaces.
	#[tracing::instrument(skip(self))]
	pub async fn all_ids_including_deleted(&self) -> Result<HashSet<WorkspaceId>, DbError> {
		let rows = sqlx::query("SELECT id FROM workspaces")
			.fetch_all(&self.pool)
			.await?;

		rows.iter()
			.map(|r| {
				let id_str: String = r.get("id");
				Uuid::parse_str(&id_str)
					.map(WorkspaceId::new)
					.map_err(|e| DbError::Internal(format!("Invalid workspace ID: {e}")))
			})
			.collect()
	}

	/// Soft-delete a workspace by setting `deleted_at`.
	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn soft_delete_workspace(&self, id: &WorkspaceId) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE workspaces SET deleted_at = ? WHERE id = ?")
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("workspace {id}")));
		}
		Ok(())
	}
}

fn row_to_workspace(row: &sqlx::sqlite::SqliteRow) -> Result<Workspace, DbError> {
	let id_str: String = row.get("id");
	let created_at: String = row.get("created_at");
	let deleted_at: Option<String> = row.get("deleted_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid workspace ID: {e}")))?;

	Ok(Workspace {
		id: WorkspaceId::new(id),
		name: row.get("name"),
		slug: row.get("slug"),
		created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
			.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
			.with_timezone(&Utc),
		deleted_at: deleted_at.and_then(|d| {
			chrono::DateTime::parse_from_rfc3339(&d)
				.map(|dt| dt.with_timezone(&Utc))
				.ok()
		}),
	})
}

#[async_trait]
impl WorkspaceStore for WorkspaceRepository {
	async fn create_workspace(&self, workspace: &Workspace) -> Result<(), DbError> {
		self.create_workspace(workspace).await
	}

	async fn get_workspace_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>, DbError> {
		self.get_workspace_by_id(id).await
	}

	async fn get_workspace_by_id_including_deleted(
		&self,
		id: &WorkspaceId,
	) -> Result<Option<Workspace>, DbError> {
		self.get_workspace_by_id_including_deleted(id).await
	}

	async fn list_live_workspaces(&self) -> Result<Vec<Workspace>, DbError> {
		self.list_live_workspaces().await
	}

	async fn list_workspaces_for_email(&self, email: &str) -> Result<Vec<Workspace>, DbError> {
		self.list_workspaces_for_email(email).await
	}

	async fn all_ids_including_deleted(&self) -> Result<HashSet<WorkspaceId>, DbError> {
		self.all_ids_including_deleted().await
	}

	async fn soft_delete_workspace(&self, id: &WorkspaceId) -> Result<(), DbError> {
		self.soft_delete_workspace(id).await
	}
}
