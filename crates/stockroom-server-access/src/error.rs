// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for access-control decisions.
//!
//! Denial messages are deliberately non-leaking: a caller cannot tell a
//! missing workspace from a missing membership. Integrity violations never
//! surface as errors; they land in reports.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccessError>;

#[derive(Error, Debug)]
pub enum AccessError {
	#[error("authentication required")]
	Unauthenticated,

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("{0}")]
	Forbidden(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("internal error: {0}")]
	Unexpected(String),
}

impl AccessError {
	/// The denial handed to any caller lacking a membership. One message for
	/// every cause so responses do not reveal workspace existence.
	pub fn not_a_member() -> Self {
		AccessError::Forbidden("you are not a member of this workspace".to_string())
	}

	/// The denial for admin operations attempted by anyone but the
	/// configured platform owner.
	pub fn owner_required() -> Self {
		AccessError::Forbidden("this operation requires the platform owner".to_string())
	}

	/// HTTP status code this error maps to.
	pub fn status_code(&self) -> u16 {
		match self {
			AccessError::Unauthenticated => 401,
			AccessError::InvalidArgument(_) => 400,
			AccessError::Forbidden(_) => 403,
			AccessError::NotFound(_) => 404,
			AccessError::Unexpected(_) => 500,
		}
	}
}

impl From<stockroom_server_db::DbError> for AccessError {
	fn from(e: stockroom_server_db::DbError) -> Self {
		AccessError::Unexpected(e.to_string())
	}
}
