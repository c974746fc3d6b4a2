// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-workspace module toggles.
//!
//! A module with no row is treated as enabled; rows exist only to record an
//! explicit toggle.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::BTreeMap;
use stockroom_server_auth::WorkspaceId;

use crate::error::DbError;

#[async_trait]
pub trait ModuleSettingsStore: Send + Sync {
	async fn list_module_settings(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<BTreeMap<String, bool>, DbError>;
	async fn set_module_enabled(
		&self,
		workspace_id: &WorkspaceId,
		module_key: &str,
		enabled: bool,
	) -> Result<(), DbError>;
}

/// Repository for workspace module toggles.
#[derive(Clone)]
pub struct ModuleSettingsRepository {
	pool: SqlitePool,
}

impl ModuleSettingsRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Map of explicitly-toggled modules for a workspace.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn list_module_settings(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<BTreeMap<String, bool>, DbError> {
		let rows = sqlx::query("SELECT module_key, enabled FROM workspace_modules WHERE workspace_id = ?")
			.bind(workspace_id.to_string())
			.fetch_all(&self.pool)
			.await?;

		Ok(rows
			.iter()
			.map(|r| {
				let key: String = r.get("module_key");
				let enabled: i32 = r.get("enabled");
				(key, enabled != 0)
			})
			.collect())
	}

	/// Record an explicit enable or disable for one module.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, module_key))]
	pub async fn set_module_enabled(
		&self,
		workspace_id: &WorkspaceId,
		module_key: &str,
		enabled: bool,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO workspace_modules (workspace_id, module_key, enabled)
			VALUES (?, ?, ?)
			ON CONFLICT(workspace_id, module_key) DO UPDATE SET enabled = excluded.enabled
			"#,
		)
		.bind(workspace_id.to_string())
		.bind(module_key)
		.bind(enabled as i32)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}

#[async_trait]
impl ModuleSettingsStore for ModuleSettingsRepository {
	async fn list_module_settings(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<BTreeMap<String, bool>, DbError> {
		self.list_module_settings(workspace_id).await
	}

	async fn set_module_enabled(
		&self,
		workspace_id: &WorkspaceId,
		module_key: &str,
		enabled: bool,
	) -> Result<(), DbError> {
		self.set_module_enabled(workspace_id, module_key, enabled)
			.await
	}
}
