// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use stockroom_server_auth::AuditLogEntry;
use stockroom_server_db::{AuditLogRepository, DbError};

use crate::error::AuditSinkError;
use crate::sink::AuditSink;

/// Persists audit events into the `audit_logs` table.
pub struct SqliteAuditSink {
	repository: AuditLogRepository,
	pool: SqlitePool,
	name: String,
}

impl SqliteAuditSink {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			repository: AuditLogRepository::new(pool.clone()),
			pool,
			name: "sqlite".to_string(),
		}
	}
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
	fn name(&self) -> &str {
		&self.name
	}

	async fn publish(&self, event: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		self.repository.append_audit_log(&event).await.map_err(|e| {
			if is_transient_error(&e) {
				AuditSinkError::Transient(format!("database error: {e}"))
			} else {
				AuditSinkError::Permanent(format!("database error: {e}"))
			}
		})
	}

	async fn health_check(&self) -> Result<(), AuditSinkError> {
		sqlx::query("SELECT 1")
			.execute(&self.pool)
			.await
			.map_err(|e| AuditSinkError::Transient(format!("health check failed: {e}")))?;
		Ok(())
	}
}

fn is_transient_error(e: &DbError) -> bool {
	match e {
		DbError::Sqlx(sqlx::Error::Io(_)) => true,
		DbError::Sqlx(sqlx::Error::PoolTimedOut) => true,
		DbError::Sqlx(sqlx::Error::PoolClosed) => true,
		DbError::Sqlx(sqlx::Error::Database(db_err)) => {
			let msg = db_err.message().to_lowercase();
			msg.contains("busy") || msg.contains("locked") || msg.contains("timeout")
		}
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use stockroom_server_auth::{AuditEventType, AuditLogBuilder};
	use stockroom_server_db::testing::create_access_test_pool;

	#[tokio::test]
	async fn publish_writes_a_row() {
		let pool = create_access_test_pool().await;
		let sink = SqliteAuditSink::new(pool.clone());

		let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessGranted).build();
		sink.publish(Arc::new(entry)).await.unwrap();

		let repo = AuditLogRepository::new(pool);
		assert_eq!(
			repo.count_by_event_type("workspace_access_granted")
				.await
				.unwrap(),
			1
		);
	}

	#[tokio::test]
	async fn health_check_succeeds_on_live_pool() {
		let pool = create_access_test_pool().await;
		let sink = SqliteAuditSink::new(pool);
		sink.health_check().await.unwrap();
	}
}
