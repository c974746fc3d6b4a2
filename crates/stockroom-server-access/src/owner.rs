// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The platform-owner gate.
//!
//! A single configured email authorizes every cross-tenant security
//! operation. The comparison is exact and case-insensitive; the
//! `is_platform_admin` role flag does not pass this gate. The asymmetry is
//! intentional: admins see more, only the owner repairs.

use stockroom_server_auth::User;
use stockroom_server_config::PlatformConfig;

use crate::error::AccessError;

/// Checks callers against the configured platform-owner email.
#[derive(Debug, Clone)]
pub struct OwnerGate {
	owner_email: String,
}

impl OwnerGate {
	pub fn new(config: &PlatformConfig) -> Self {
		Self {
			owner_email: config.owner_email.clone(),
		}
	}

	/// Build a gate from a raw email, normalizing it the way the config
	/// layer does. Test convenience.
	pub fn from_email(email: &str) -> Self {
		Self {
			owner_email: email.trim().to_ascii_lowercase(),
		}
	}

	/// A gate that matches nobody.
	pub fn disabled() -> Self {
		Self {
			owner_email: String::new(),
		}
	}

	/// The configured owner email in comparison-key form; empty when unset.
	pub fn owner_email(&self) -> &str {
		&self.owner_email
	}

	/// Exact, case-insensitive comparison against the configured owner.
	/// An unset owner email matches nobody.
	pub fn is_owner_email(&self, email: &str) -> bool {
		!self.owner_email.is_empty() && self.owner_email.eq_ignore_ascii_case(email.trim())
	}

	/// Returns true if this user is the platform owner.
	pub fn is_owner(&self, user: &User) -> bool {
		self.is_owner_email(&user.email)
	}

	/// Gate an admin operation on the owner identity.
	///
	/// `is_platform_admin` alone is insufficient here.
	pub fn require_owner(&self, user: &User) -> Result<(), AccessError> {
		if self.is_owner(user) {
			Ok(())
		} else {
			tracing::warn!(user_id = %user.id, "admin operation refused: caller is not the platform owner");
			Err(AccessError::owner_required())
		}
	}
}
