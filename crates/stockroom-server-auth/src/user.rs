// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User entity and identity comparison helpers.
//!
//! Users are provisioned by the external identity provider; the access core
//! reads them to make authorization decisions and never writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountStatus, UserId};

/// A user account as seen by the access core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier.
	pub id: UserId,
	/// Primary email. Comparison key for memberships; compared
	/// case-insensitively everywhere.
	pub email: String,
	/// Display name shown in rosters and audit reports.
	pub display_name: String,
	/// Global platform-admin role flag. Grants visibility of all live
	/// workspaces, but NOT the cross-tenant security operations — those
	/// require the configured owner email.
	pub is_platform_admin: bool,
	/// Account lifecycle state.
	pub account_status: AccountStatus,
	/// When the account was created.
	pub created_at: DateTime<Utc>,
	/// Soft-delete marker mirrored from the identity provider.
	pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
	/// Returns true if this account is deleted and must not hold a session.
	pub fn is_deleted(&self) -> bool {
		self.deleted_at.is_some() || self.account_status == AccountStatus::Deleted
	}

	/// Case-insensitive exact email comparison.
	///
	/// This is the only sanctioned way to compare a user against a
	/// configured identity. No substring or domain matching.
	pub fn email_matches(&self, other: &str) -> bool {
		self.email.eq_ignore_ascii_case(other)
	}

	/// The email lowered for use as a membership lookup key.
	pub fn email_key(&self) -> String {
		self.email.to_ascii_lowercase()
	}
}
