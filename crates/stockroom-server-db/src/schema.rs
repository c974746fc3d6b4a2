// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Idempotent schema bootstrap.
//!
//! Applied at server startup. Every statement is `CREATE … IF NOT EXISTS`
//! so re-running against an existing database is a no-op.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const STATEMENTS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS users (
		id TEXT PRIMARY KEY,
		email TEXT NOT NULL UNIQUE,
		display_name TEXT NOT NULL,
		is_platform_admin INTEGER NOT NULL DEFAULT 0,
		account_status TEXT NOT NULL DEFAULT 'active',
		created_at TEXT NOT NULL,
		deleted_at TEXT
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS workspaces (
		id TEXT PRIMARY KEY,
		name TEXT NOT NULL,
		slug TEXT NOT NULL UNIQUE,
		created_at TEXT NOT NULL,
		deleted_at TEXT
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS memberships (
		id TEXT PRIMARY KEY,
		workspace_id TEXT NOT NULL,
		user_id TEXT NOT NULL,
		user_email TEXT NOT NULL,
		role TEXT NOT NULL,
		permissions TEXT NOT NULL DEFAULT '{}',
		created_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_memberships_workspace_email ON memberships(workspace_id, user_email)",
	"CREATE INDEX IF NOT EXISTS idx_memberships_email ON memberships(user_email)",
	r#"
	CREATE TABLE IF NOT EXISTS audit_logs (
		id TEXT PRIMARY KEY,
		timestamp TEXT NOT NULL,
		event_type TEXT NOT NULL,
		workspace_id TEXT,
		actor_user_id TEXT,
		actor_email TEXT,
		resource_type TEXT,
		resource_id TEXT,
		action TEXT NOT NULL,
		ip_address TEXT,
		user_agent TEXT,
		details TEXT,
		created_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_audit_logs_event_type ON audit_logs(event_type)",
	"CREATE INDEX IF NOT EXISTS idx_audit_logs_workspace ON audit_logs(workspace_id)",
	r#"
	CREATE TABLE IF NOT EXISTS workspace_selections (
		user_id TEXT PRIMARY KEY,
		workspace_id TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS workspace_modules (
		workspace_id TEXT NOT NULL,
		module_key TEXT NOT NULL,
		enabled INTEGER NOT NULL DEFAULT 1,
		PRIMARY KEY (workspace_id, module_key)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS sessions (
		id TEXT PRIMARY KEY,
		user_id TEXT NOT NULL,
		token_hash TEXT NOT NULL,
		created_at TEXT NOT NULL,
		expires_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_sessions_token_hash ON sessions(token_hash)",
];

/// Create all tables and indexes if they do not exist.
#[tracing::instrument(skip(pool))]
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in STATEMENTS {
		sqlx::query(statement).execute(pool).await?;
	}
	tracing::debug!("database schema ensured");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;

	#[tokio::test]
	async fn ensure_schema_is_idempotent() {
		let pool = create_test_pool().await;
		ensure_schema(&pool).await.unwrap();
		ensure_schema(&pool).await.unwrap();
	}
}
