// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership repository for database operations.
//!
//! Memberships bind a user (by lowercased email) to a workspace. All list
//! operations order by `created_at ASC` so the integrity auditor's
//! keep-oldest duplicate policy is an explicit contract rather than an
//! accident of result ordering.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stockroom_server_auth::{
	Membership, MembershipId, PermissionSet, UserId, WorkspaceId, WorkspaceRole,
};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait MembershipStore: Send + Sync {
	async fn create_membership(&self, membership: &Membership) -> Result<(), DbError>;
	async fn get_membership_by_id(&self, id: &MembershipId) -> Result<Option<Membership>, DbError>;
	async fn find_memberships(
		&self,
		workspace_id: &WorkspaceId,
		email: &str,
	) -> Result<Vec<Membership>, DbError>;
	async fn list_memberships_for_workspace(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<Vec<Membership>, DbError>;
	async fn list_all_memberships(
		&self,
		workspace_id: Option<&WorkspaceId>,
	) -> Result<Vec<Membership>, DbError>;
	async fn delete_membership(&self, id: &MembershipId) -> Result<bool, DbError>;
}

/// Repository for membership database operations.
///
/// All IDs are UUIDs stored as strings in SQLite; the permission map is a
/// JSON column.
#[derive(Clone)]
pub struct MembershipRepository {
	pool: SqlitePool,
}

impl MembershipRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new membership. The email is stored lowercased.
	#[tracing::instrument(
		skip(self, membership),
		fields(membership_id = %membership.id, workspace_id = %membership.workspace_id)
	)]
	pub async fn create_membership(&self, membership: &Membership) -> Result<(), DbError> {
		let permissions_json = serde_json::to_string(&membership.permissions)?;

		sqlx::query(
			r#"
			INSERT INTO memberships (id, workspace_id, user_id, user_email, role, permissions, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(membership.id.to_string())
		.bind(membership.workspace_id.to_string())
		.bind(membership.user_id.to_string())
		.bind(membership.user_email.to_ascii_lowercase())
		.bind(membership.role.to_string())
		.bind(permissions_json)
		.bind(membership.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(membership_id = %membership.id, "membership created");
		Ok(())
	}

	/// Get a membership by ID.
	#[tracing::instrument(skip(self), fields(membership_id = %id))]
	pub async fn get_membership_by_id(
		&self,
		id: &MembershipId,
	) -> Result<Option<Membership>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, workspace_id, user_id, user_email, role, permissions, created_at
			FROM memberships
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_membership(&r)).transpose()
	}

	/// Find memberships for one `(workspace, email)` pair, oldest first.
	///
	/// Exactly one row is the healthy state; more than one is a duplicate
	/// defect surfaced to the caller unreconciled.
	#[tracing::instrument(skip(self, email), fields(workspace_id = %workspace_id))]
	pub async fn find_memberships(
		&self,
		workspace_id: &WorkspaceId,
		email: &str,
	) -> Result<Vec<Membership>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, workspace_id, user_id, user_email, role, permissions, created_at
			FROM memberships
			WHERE workspace_id = ? AND user_email = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(workspace_id.to_string())
		.bind(email.to_ascii_lowercase())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_membership).collect()
	}

	/// List all memberships in a workspace, oldest first.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn list_memberships_for_workspace(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<Vec<Membership>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, workspace_id, user_id, user_email, role, permissions, created_at
			FROM memberships
			WHERE workspace_id = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(workspace_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_membership).collect()
	}

	/// List all memberships, optionally bounded to one workspace, ordered
	/// by `created_at ASC`.
	#[tracing::instrument(skip(self))]
	pub async fn list_all_memberships(
		&self,
		workspace_id: Option<&WorkspaceId>,
	) -> Result<Vec<Membership>, DbError> {
		let rows = match workspace_id {
			Some(ws) => {
				sqlx::query(
					r#"
					SELECT id, workspace_id, user_id, user_email, role, permissions, created_at
					FROM memberships
					WHERE workspace_id = ?
					ORDER BY created_at ASC
					"#,
				)
				.bind(ws.to_string())
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					r#"
					SELECT id, workspace_id, user_id, user_email, role, permissions, created_at
					FROM memberships
					ORDER BY created_at ASC
					"#,
				)
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(row_to_membership).collect()
	}

	/// Delete a membership by ID.
	///
	/// Returns `false` if no row existed. Another actor deleting the row
	/// first is not an error; batch repairs rely on this.
	#[tracing::instrument(skip(self), fields(membership_id = %id))]
	pub async fn delete_membership(&self, id: &MembershipId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM memberships WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

fn row_to_membership(row: &sqlx::sqlite::SqliteRow) -> Result<Membership, DbError> {
	let id_str: String = row.get("id");
	let workspace_id_str: String = row.get("workspace_id");
	let user_id_str: String = row.get("user_id");
	let role_str: String = row.get("role");
	let permissions_json: String = row.get("permissions");
	let created_at: String = row.get("created_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid membership ID: {e}")))?;
	// Membership rows may reference workspaces that no longer exist; the
	// id itself must still parse.
	let workspace_id = Uuid::parse_str(&workspace_id_str)
		.map_err(|e| DbError::Internal(format!("Invalid workspace ID: {e}")))?;
	let user_id =
		Uuid::parse_str(&user_id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	let permissions: PermissionSet = serde_json::from_str(&permissions_json)?;

	Ok(Membership {
		id: MembershipId::new(id),
		workspace_id: WorkspaceId::new(workspace_id),
		user_id: UserId::new(user_id),
		user_email: row.get("user_email"),
		role: WorkspaceRole::parse_or_viewer(&role_str),
		permissions,
		created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
			.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
			.with_timezone(&Utc),
	})
}

#[async_trait]
impl MembershipStore for MembershipRepository {
	async fn create_membership(&self, membership: &Membership) -> Result<(), DbError> {
		self.create_membership(membership).await
	}

	async fn get_membership_by_id(&self, id: &MembershipId) -> Result<Option<Membership>, DbError> {
		self.get_membership_by_id(id).await
	}

	async fn find_memberships(
		&self,
		workspace_id: &WorkspaceId,
		email: &str,
	) -> Result<Vec<Membership>, DbError> {
		self.find_memberships(workspace_id, email).await
	}

	async fn list_memberships_for_workspace(
		&self,
		workspace_id: &WorkspaceId,
	) -> Result<Vec<Membership>, DbError> {
		self.list_memberships_for_workspace(workspace_id).await
	}

	async fn list_all_memberships(
		&self,
		workspace_id: Option<&WorkspaceId>,
	) -> Result<Vec<Membership>, DbError> {
		self.list_all_memberships(workspace_id).await
	}

	async fn delete_membership(&self, id: &MembershipId) -> Result<bool, DbError> {
		self.delete_membership(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_access_test_pool, sample_membership, sample_workspace};
	use crate::workspace::WorkspaceRepository;

	#[tokio::test]
	async fn create_and_find_membership() {
		let pool = create_access_test_pool().await;
		let workspaces = WorkspaceRepository::new(pool.clone());
		let memberships = MembershipRepository::new(pool);

		let ws = sample_workspace("acme");
		workspaces.create_workspace(&ws).await.unwrap();

		let m = sample_membership(&ws.id, "Buyer@Example.com", WorkspaceRole::Member);
		memberships.create_membership(&m).await.unwrap();

		// stored lowercased, looked up case-insensitively
		let found = memberships
			.find_memberships(&ws.id, "buyer@EXAMPLE.com")
			.await
			.unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].user_email, "buyer@example.com");
		assert_eq!(found[0].role, WorkspaceRole::Member);
	}

	#[tokio::test]
	async fn find_orders_oldest_first() {
		let pool = create_access_test_pool().await;
		let memberships = MembershipRepository::new(pool);
		let ws_id = WorkspaceId::generate();

		let mut older = sample_membership(&ws_id, "a@x.com", WorkspaceRole::Member);
		older.created_at = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
			.unwrap()
			.with_timezone(&Utc);
		let mut newer = sample_membership(&ws_id, "a@x.com", WorkspaceRole::Admin);
		newer.created_at = chrono::DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
			.unwrap()
			.with_timezone(&Utc);

		// insert newest first to prove ordering comes from created_at
		memberships.create_membership(&newer).await.unwrap();
		memberships.create_membership(&older).await.unwrap();

		let found = memberships.find_memberships(&ws_id, "a@x.com").await.unwrap();
		assert_eq!(found.len(), 2);
		assert_eq!(found[0].id, older.id);
		assert_eq!(found[1].id, newer.id);
	}

	#[tokio::test]
	async fn delete_missing_membership_returns_false() {
		let pool = create_access_test_pool().await;
		let memberships = MembershipRepository::new(pool);

		let removed = memberships
			.delete_membership(&MembershipId::generate())
			.await
			.unwrap();
		assert!(!removed);
	}

	#[tokio::test]
	async fn permissions_roundtrip_through_json_column() {
		let pool = create_access_test_pool().await;
		let memberships = MembershipRepository::new(pool);
		let ws_id = WorkspaceId::generate();

		let mut m = sample_membership(&ws_id, "a@x.com", WorkspaceRole::Member);
		m.permissions.modules.insert(
			"orders".to_string(),
			stockroom_server_auth::ModulePermissions {
				view: true,
				edit: false,
			},
		);
		memberships.create_membership(&m).await.unwrap();

		let found = memberships
			.get_membership_by_id(&m.id)
			.await
			.unwrap()
			.unwrap();
		assert!(found.permissions.can_view("orders"));
		assert!(!found.permissions.can_edit("orders"));
	}
}
