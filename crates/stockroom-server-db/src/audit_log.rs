// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Append-only audit log storage.
//!
//! Entries are inserted by the audit pipeline and read by the admin query
//! endpoint. There is deliberately no update or delete operation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stockroom_server_auth::{AuditLogEntry, WorkspaceId};

use crate::error::DbError;

/// Filters for reading back audit entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLogQuery {
	pub event_type: Option<String>,
	pub workspace_id: Option<WorkspaceId>,
	pub limit: i32,
	pub offset: i32,
}

/// A stored audit row, as returned to the admin query endpoint.
#[derive(Debug, Clone)]
pub struct StoredAuditLog {
	pub id: String,
	pub timestamp: String,
	pub event_type: String,
	pub workspace_id: Option<String>,
	pub actor_user_id: Option<String>,
	pub actor_email: Option<String>,
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,
	pub action: String,
	pub ip_address: Option<String>,
	pub user_agent: Option<String>,
	pub details: Option<serde_json::Value>,
}

#[async_trait]
pub trait AuditLogStore: Send + Sync {
	async fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<(), DbError>;
	async fn list_audit_logs(
		&self,
		query: &AuditLogQuery,
	) -> Result<(Vec<StoredAuditLog>, i64), DbError>;
}

/// Repository for audit log persistence.
#[derive(Clone)]
pub struct AuditLogRepository {
	pool: SqlitePool,
}

impl AuditLogRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Append one audit entry.
	#[tracing::instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub async fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<(), DbError> {
		let details_json = match &entry.details {
			serde_json::Value::Null => None,
			other => Some(serde_json::to_string(other)?),
		};

		sqlx::query(
			r#"
			INSERT INTO audit_logs (
				id, timestamp, event_type, workspace_id, actor_user_id, actor_email,
				resource_type, resource_id, action, ip_address, user_agent, details, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(entry.id.to_string())
		.bind(entry.timestamp.to_rfc3339())
		.bind(entry.event_type.to_string())
		.bind(entry.workspace_id.map(|w| w.to_string()))
		.bind(entry.actor_user_id.map(|u| u.to_string()))
		.bind(&entry.actor_email)
		.bind(&entry.resource_type)
		.bind(&entry.resource_id)
		.bind(&entry.action)
		.bind(&entry.ip_address)
		.bind(&entry.user_agent)
		.bind(details_json)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// List stored audit entries, newest first, with a total count.
	#[tracing::instrument(skip(self))]
	pub async fn list_audit_logs(
		&self,
		query: &AuditLogQuery,
	) -> Result<(Vec<StoredAuditLog>, i64), DbError> {
		let limit = if query.limit <= 0 { 50 } else { query.limit };
		let offset = query.offset.max(0);

		let event_type = query.event_type.clone();
		let workspace_id = query.workspace_id.map(|w| w.to_string());

		let total: i64 = sqlx::query_scalar(
			r#"
			SELECT COUNT(*) FROM audit_logs
			WHERE (? IS NULL OR event_type = ?)
			  AND (? IS NULL OR workspace_id = ?)
			"#,
		)
		.bind(&event_type)
		.bind(&event_type)
		.bind(&workspace_id)
		.bind(&workspace_id)
		.fetch_one(&self.pool)
		.await?;

		let rows = sqlx::query(
			r#"
			SELECT id, timestamp, event_type, workspace_id, actor_user_id, actor_email,
			       resource_type, resource_id, action, ip_address, user_agent, details
			FROM audit_logs
			WHERE (? IS NULL OR event_type = ?)
			  AND (? IS NULL OR workspace_id = ?)
			ORDER BY timestamp DESC
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(&event_type)
		.bind(&event_type)
		.bind(&workspace_id)
		.bind(&workspace_id)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		let logs = rows
			.iter()
			.map(|r| {
				let details: Option<String> = r.get("details");
				Ok(StoredAuditLog {
					id: r.get("id"),
					timestamp: r.get("timestamp"),
					event_type: r.get("event_type"),
					workspace_id: r.get("workspace_id"),
					actor_user_id: r.get("actor_user_id"),
					actor_email: r.get("actor_email"),
					resource_type: r.get("resource_type"),
					resource_id: r.get("resource_id"),
					action: r.get("action"),
					ip_address: r.get("ip_address"),
					user_agent: r.get("user_agent"),
					details: details.and_then(|d| serde_json::from_str(&d).ok()),
				})
			})
			.collect::<Result<Vec<_>, DbError>>()?;

		Ok((logs, total))
	}

	/// Count stored entries for one event type. Test and report helper.
	pub async fn count_by_event_type(&self, event_type: &str) -> Result<i64, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE event_type = ?")
			.bind(event_type)
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}

#[async_trait]
impl AuditLogStore for AuditLogRepository {
	async fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<(), DbError> {
		self.append_audit_log(entry).await
	}

	async fn list_audit_logs(
		&self,
		query: &AuditLogQuery,
	) -> Result<(Vec<StoredAuditLog>, i64), DbError> {
		self.list_audit_logs(query).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_access_test_pool;
	use stockroom_server_auth::{AuditEventType, AuditLogBuilder};

	#[tokio::test]
	async fn append_and_list() {
		let pool = create_access_test_pool().await;
		let repo = AuditLogRepository::new(pool);

		let ws = WorkspaceId::generate();
		let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessDenied)
			.workspace(ws)
			.actor_email("buyer@example.com")
			.details(serde_json::json!({"reason": "no_membership"}))
			.build();
		repo.append_audit_log(&entry).await.unwrap();

		let (logs, total) = repo
			.list_audit_logs(&AuditLogQuery {
				event_type: Some("workspace_access_denied".to_string()),
				..Default::default()
			})
			.await
			.unwrap();

		assert_eq!(total, 1);
		assert_eq!(logs[0].event_type, "workspace_access_denied");
		assert_eq!(logs[0].workspace_id.as_deref(), Some(ws.to_string().as_str()));
		assert_eq!(logs[0].details.as_ref().unwrap()["reason"], "no_membership");
	}

	#[tokio::test]
	async fn workspace_filter_applies() {
		let pool = create_access_test_pool().await;
		let repo = AuditLogRepository::new(pool);

		let ws_a = WorkspaceId::generate();
		let ws_b = WorkspaceId::generate();
		for ws in [ws_a, ws_b] {
			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessGranted)
				.workspace(ws)
				.build();
			repo.append_audit_log(&entry).await.unwrap();
		}

		let (logs, total) = repo
			.list_audit_logs(&AuditLogQuery {
				workspace_id: Some(ws_a),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 1);
		assert_eq!(logs.len(), 1);
	}
}
