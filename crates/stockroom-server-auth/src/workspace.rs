// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace (tenant) and membership entities.
//!
//! A [`Workspace`] is the isolation boundary for all business data. A
//! [`Membership`] binds one user to one workspace, carrying a role and a
//! per-module [`PermissionSet`]. The invariant enforced by the integrity
//! auditor is exactly one membership per `(workspace_id, user_email)` pair,
//! each referencing an existing workspace row.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MembershipId, UserId, WorkspaceId, WorkspaceRole};

/// A workspace: one isolated customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
	/// Unique identifier.
	pub id: WorkspaceId,
	/// Human-readable name.
	pub name: String,
	/// URL-safe slug.
	pub slug: String,
	/// When the workspace was created.
	pub created_at: DateTime<Utc>,
	/// Soft-delete marker. A deleted workspace must never be selectable
	/// as active, regardless of membership.
	pub deleted_at: Option<DateTime<Utc>>,
}

impl Workspace {
	/// Returns true if the workspace is live (not soft-deleted).
	pub fn is_live(&self) -> bool {
		self.deleted_at.is_none()
	}
}

/// View/edit flags for a single dashboard module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermissions {
	pub view: bool,
	pub edit: bool,
}

/// Member-management flags, separate from module permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMgmtPermissions {
	pub can_add_members: bool,
	pub can_remove_members: bool,
}

/// Per-module permission map carried on a membership.
///
/// Keys are module identifiers ("orders", "inventory", "returns", …).
/// Owners bypass this map entirely; the session helpers consult it for
/// every other role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
	/// Module key → view/edit flags.
	#[serde(default)]
	pub modules: BTreeMap<String, ModulePermissions>,
	/// Member management flags.
	#[serde(default)]
	pub member_mgmt: MemberMgmtPermissions,
}

impl PermissionSet {
	/// Returns true if the module may be viewed. Missing entries deny.
	pub fn can_view(&self, module_key: &str) -> bool {
		self.modules.get(module_key).is_some_and(|p| p.view)
	}

	/// Returns true if the module may be edited. Missing entries deny.
	pub fn can_edit(&self, module_key: &str) -> bool {
		self.modules.get(module_key).is_some_and(|p| p.edit)
	}
}

/// A membership binding one user to one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
	/// Unique identifier.
	pub id: MembershipId,
	/// The workspace this membership authorizes. Must reference an
	/// existing workspace row; dangling references are integrity defects.
	pub workspace_id: WorkspaceId,
	/// The member's user id.
	pub user_id: UserId,
	/// The member's email, stored lowercased as the lookup key.
	pub user_email: String,
	/// Role within the workspace.
	pub role: WorkspaceRole,
	/// Per-module permissions.
	pub permissions: PermissionSet,
	/// When the membership was created. The duplicate-reconciliation
	/// policy keeps the earliest-created record.
	pub created_at: DateTime<Utc>,
}
