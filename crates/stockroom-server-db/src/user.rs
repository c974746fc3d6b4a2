// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! Users are written by the identity-provider sync; the access core only
//! reads them. Creation exists here for provisioning and tests.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stockroom_server_auth::{AccountStatus, User, UserId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new user. The email is stored lowercased.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, email, display_name, is_platform_admin, account_status, created_at, deleted_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(user.email.to_ascii_lowercase())
		.bind(&user.display_name)
		.bind(user.is_platform_admin as i32)
		.bind(user.account_status.to_string())
		.bind(user.created_at.to_rfc3339())
		.bind(user.deleted_at.map(|d| d.to_rfc3339()))
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Get a user by ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, is_platform_admin, account_status, created_at, deleted_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Get a user by email (case-insensitive).
	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, is_platform_admin, account_status, created_at, deleted_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email.to_ascii_lowercase())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id_str: String = row.get("id");
	let is_platform_admin: i32 = row.get("is_platform_admin");
	let account_status: String = row.get("account_status");
	let created_at: String = row.get("created_at");
	let deleted_at: Option<String> = row.get("deleted_at");

	let id =
		Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	Ok(User {
		id: UserId::new(id),
		email: row.get("email"),
		display_name: row.get("display_name"),
		is_platform_admin: is_platform_admin != 0,
		account_status: match account_status.as_str() {
			"deleted" => AccountStatus::Deleted,
			_ => AccountStatus::Active,
		},
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
impl UserStore for UserRepository {
	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		self.create_user(user).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_email(email).await
	}
}
