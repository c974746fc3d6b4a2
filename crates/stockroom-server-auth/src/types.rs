// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! This module defines the foundational types used throughout the access
//! system:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity
//!   types ([`UserId`], [`WorkspaceId`], [`MembershipId`], [`SessionId`])
//!   preventing accidental mixing
//! - **Role enum**: Hierarchical per-workspace roles ([`WorkspaceRole`])
//! - **Account status**: Lifecycle state of a user account ([`AccountStatus`])
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(WorkspaceId, "Unique identifier for a workspace (tenant).");
define_id_type!(MembershipId, "Unique identifier for a workspace membership.");
define_id_type!(SessionId, "Unique identifier for an authentication session.");

// =============================================================================
// Workspace Roles
// =============================================================================

/// Roles within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
	/// Full workspace control, bypasses per-module permission checks.
	Owner,
	/// Manage members and settings within this workspace.
	Admin,
	/// Standard member access, subject to per-module permissions.
	Member,
	/// Read-only access, subject to per-module permissions.
	Viewer,
}

impl WorkspaceRole {
	/// Returns all available workspace roles.
	pub fn all() -> &'static [WorkspaceRole] {
		&[
			WorkspaceRole::Owner,
			WorkspaceRole::Admin,
			WorkspaceRole::Member,
			WorkspaceRole::Viewer,
		]
	}

	/// Returns true if this role has at least the permissions of the given role.
	pub fn has_permission_of(&self, other: &WorkspaceRole) -> bool {
		self.rank() <= other.rank()
	}

	/// Parse a role from its wire string, falling back to `Viewer` for
	/// unknown values so a corrupted row never grants elevated access.
	pub fn parse_or_viewer(s: &str) -> Self {
		match s {
			"owner" => WorkspaceRole::Owner,
			"admin" => WorkspaceRole::Admin,
			"member" => WorkspaceRole::Member,
			_ => WorkspaceRole::Viewer,
		}
	}

	fn rank(&self) -> u8 {
		match self {
			WorkspaceRole::Owner => 0,
			WorkspaceRole::Admin => 1,
			WorkspaceRole::Member => 2,
			WorkspaceRole::Viewer => 3,
		}
	}
}

impl fmt::Display for WorkspaceRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WorkspaceRole::Owner => write!(f, "owner"),
			WorkspaceRole::Admin => write!(f, "admin"),
			WorkspaceRole::Member => write!(f, "member"),
			WorkspaceRole::Viewer => write!(f, "viewer"),
		}
	}
}

// =============================================================================
// Account Status
// =============================================================================

/// Lifecycle state of a user account.
///
/// Users are created and deleted by the external identity provider; the
/// access core only reads this flag to block deleted accounts at session
/// initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
	/// Account is active and may hold sessions.
	#[default]
	Active,
	/// Account is deleted; any session must be terminated.
	Deleted,
}

impl fmt::Display for AccountStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccountStatus::Active => write!(f, "active"),
			AccountStatus::Deleted => write!(f, "deleted"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn workspace_id_roundtrips() {
			let uuid = Uuid::new_v4();
			let workspace_id = WorkspaceId::new(uuid);
			assert_eq!(workspace_id.into_inner(), uuid);
		}

		#[test]
		fn ids_generate_unique() {
			assert_ne!(UserId::generate(), UserId::generate());
			assert_ne!(MembershipId::generate(), MembershipId::generate());
		}

		#[test]
		fn workspace_id_serializes_as_uuid() {
			let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
			let workspace_id = WorkspaceId::new(uuid);
			let json = serde_json::to_string(&workspace_id).unwrap();
			assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
		}

		proptest! {
			#[test]
			fn user_id_roundtrip_any_uuid(a: u128) {
				let uuid = Uuid::from_u128(a);
				let user_id = UserId::new(uuid);
				prop_assert_eq!(user_id.into_inner(), uuid);
				prop_assert_eq!(Uuid::from(user_id), uuid);
			}

			#[test]
			fn workspace_id_serde_roundtrip(a: u128) {
				let uuid = Uuid::from_u128(a);
				let workspace_id = WorkspaceId::new(uuid);
				let json = serde_json::to_string(&workspace_id).unwrap();
				let deserialized: WorkspaceId = serde_json::from_str(&json).unwrap();
				prop_assert_eq!(workspace_id, deserialized);
			}

			#[test]
			fn membership_id_display_matches_uuid(a: u128) {
				let uuid = Uuid::from_u128(a);
				let membership_id = MembershipId::new(uuid);
				prop_assert_eq!(membership_id.to_string(), uuid.to_string());
			}
		}
	}

	mod roles {
		use super::*;

		#[test]
		fn role_permission_hierarchy() {
			assert!(WorkspaceRole::Owner.has_permission_of(&WorkspaceRole::Admin));
			assert!(WorkspaceRole::Owner.has_permission_of(&WorkspaceRole::Viewer));
			assert!(WorkspaceRole::Admin.has_permission_of(&WorkspaceRole::Member));
			assert!(!WorkspaceRole::Admin.has_permission_of(&WorkspaceRole::Owner));
			assert!(!WorkspaceRole::Member.has_permission_of(&WorkspaceRole::Admin));
			assert!(WorkspaceRole::Viewer.has_permission_of(&WorkspaceRole::Viewer));
			assert!(!WorkspaceRole::Viewer.has_permission_of(&WorkspaceRole::Member));
		}

		#[test]
		fn serializes_snake_case() {
			let json = serde_json::to_string(&WorkspaceRole::Viewer).unwrap();
			assert_eq!(json, "\"viewer\"");
		}

		#[test]
		fn parse_roundtrips_known_roles() {
			for role in WorkspaceRole::all() {
				assert_eq!(WorkspaceRole::parse_or_viewer(&role.to_string()), *role);
			}
		}

		#[test]
		fn parse_unknown_falls_back_to_viewer() {
			assert_eq!(
				WorkspaceRole::parse_or_viewer("superuser"),
				WorkspaceRole::Viewer
			);
		}
	}

	mod account_status {
		use super::*;

		#[test]
		fn default_is_active() {
			assert_eq!(AccountStatus::default(), AccountStatus::Active);
		}

		#[test]
		fn serializes_snake_case() {
			let json = serde_json::to_string(&AccountStatus::Deleted).unwrap();
			assert_eq!(json, "\"deleted\"");
		}
	}
}
