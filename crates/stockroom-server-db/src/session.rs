// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Auth session storage.
//!
//! Sessions hold a hash of the bearer token, never the token itself. Expiry
//! is enforced at lookup time; expired rows are deleted lazily.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use stockroom_server_auth::{SessionId, UserId};
use uuid::Uuid;

use crate::error::DbError;

/// A stored auth session.
#[derive(Debug, Clone)]
pub struct AuthSession {
	pub id: SessionId,
	pub user_id: UserId,
	pub token_hash: String,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl AuthSession {
	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		self.expires_at <= now
	}
}

#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn create_session(&self, session: &AuthSession) -> Result<(), DbError>;
	async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<AuthSession>, DbError>;
	async fn delete_session(&self, id: &SessionId) -> Result<(), DbError>;
	async fn delete_expired_sessions(&self) -> Result<u64, DbError>;
}

/// Repository for auth session database operations.
#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new session row.
	#[tracing::instrument(skip(self, session), fields(session_id = %session.id, user_id = %session.user_id))]
	pub async fn create_session(&self, session: &AuthSession) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(&session.token_hash)
		.bind(session.created_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Look up a session by token hash.
	///
	/// Expired sessions are deleted on sight and reported as absent.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<AuthSession>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, token_hash, created_at, expires_at
			FROM sessions
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let session = row_to_session(&row)?;

		if session.is_expired(Utc::now()) {
			self.delete_session(&session.id).await?;
			return Ok(None);
		}

		Ok(Some(session))
	}

	/// Delete one session. Missing rows are fine.
	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn delete_session(&self, id: &SessionId) -> Result<(), DbError> {
		sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	/// Delete all expired sessions, returning how many were removed.
	#[tracing::instrument(skip(self))]
	pub async fn delete_expired_sessions(&self) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<AuthSession, DbError> {
	let id_str: String = row.get("id");
	let user_id_str: String = row.get("user_id");
	let created_at: String = row.get("created_at");
	let expires_at: String = row.get("expires_at");

	let id =
		Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid session ID: {e}")))?;
	let user_id =
		Uuid::parse_str(&user_id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	Ok(AuthSession {
		id: SessionId::new(id),
		user_id: UserId::new(user_id),
		token_hash: row.get("token_hash"),
		created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
			.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
			.with_timezone(&Utc),
		expires_at: chrono::DateTime::parse_from_rfc3339(&expires_at)
			.map_err(|e| DbError::Internal(format!("Invalid expires_at: {e}")))?
			.with_timezone(&Utc),
	})
}

#[async_trait]
impl SessionStore for SessionRepository {
	async fn create_session(&self, session: &AuthSession) -> Result<(), DbError> {
		self.create_session(session).await
	}

	async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<AuthSession>, DbError> {
		self.get_session_by_token_hash(token_hash).await
	}

	async fn delete_session(&self, id: &SessionId) -> Result<(), DbError> {
		self.delete_session(id).await
	}

	async fn delete_expired_sessions(&self) -> Result<u64, DbError> {
		self.delete_expired_sessions().await
	}
}
