// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers for database operations.
//!
//! Shared by this crate's tests and by downstream crates that exercise the
//! repositories against an in-memory database.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use stockroom_server_auth::{
	AccountStatus, Membership, MembershipId, PermissionSet, User, UserId, Workspace, WorkspaceId,
	WorkspaceRole,
};

use crate::schema::ensure_schema;

/// Create an in-memory SQLite pool with no tables.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:")
		.await
		.expect("Failed to create test pool")
}

/// Create an in-memory SQLite pool with the full schema applied.
pub async fn create_access_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	ensure_schema(&pool)
		.await
		.expect("Failed to create test schema");
	pool
}

/// A live workspace named after its slug.
pub fn sample_workspace(slug: &str) -> Workspace {
	Workspace {
		id: WorkspaceId::generate(),
		name: format!("Workspace {slug}"),
		slug: slug.to_string(),
		created_at: Utc::now(),
		deleted_at: None,
	}
}

/// An active, non-admin user.
pub fn sample_user(email: &str) -> User {
	User {
		id: UserId::generate(),
		email: email.to_string(),
		display_name: "Test User".to_string(),
		is_platform_admin: false,
		account_status: AccountStatus::Active,
		created_at: Utc::now(),
		deleted_at: None,
	}
}

/// A membership with empty module permissions.
pub fn sample_membership(workspace_id: &WorkspaceId, email: &str, role: WorkspaceRole) -> Membership {
	Membership {
		id: MembershipId::generate(),
		workspace_id: *workspace_id,
		user_id: UserId::generate(),
		user_email: email.to_string(),
		role,
		permissions: PermissionSet::default(),
		created_at: Utc::now(),
	}
}
