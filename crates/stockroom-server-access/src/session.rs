// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace session manager.
//!
//! A [`WorkspaceSession`] is the resolved "which tenant am I acting in"
//! state for one user. The stored selection pointer is advisory only: it is
//! re-validated against live memberships on every init and every switch,
//! and cleared the moment it fails validation. Nothing in this module ever
//! creates a workspace or membership.

use std::collections::BTreeMap;
use std::sync::Arc;

use stockroom_server_audit::AuditService;
use stockroom_server_auth::{
	AuditEventType, AuditLogBuilder, Membership, MembershipId, PermissionSet, User, UserId,
	Workspace, WorkspaceId, WorkspaceRole,
};
use stockroom_server_db::{MembershipStore, ModuleSettingsStore, SelectionStore, WorkspaceStore};

use crate::error::AccessError;
use crate::owner::OwnerGate;

/// Outcome of session initialization.
#[derive(Debug)]
pub enum SessionState {
	/// The user has an active workspace.
	Active(Box<WorkspaceSession>),
	/// The user exists but belongs to no workspace. The dashboard renders
	/// an empty state; nothing is provisioned on their behalf.
	NoWorkspace,
	/// The account is deleted and must not hold a session.
	Blocked,
}

/// Resolved per-user workspace context.
#[derive(Debug, Clone)]
pub struct WorkspaceSession {
	pub user_id: UserId,
	/// Comparison-key form of the user's email.
	pub user_email: String,
	/// Platform-admin standing: the role flag or the owner-email match.
	pub is_platform_admin: bool,
	/// The active workspace. Always live.
	pub workspace: Workspace,
	pub role: WorkspaceRole,
	pub permissions: PermissionSet,
	/// Absent when a platform admin acts without a membership.
	pub membership_id: Option<MembershipId>,
	/// Workspaces this user could switch to.
	pub candidates: Vec<Workspace>,
	module_settings: BTreeMap<String, bool>,
}

impl WorkspaceSession {
	pub fn is_owner(&self) -> bool {
		self.role == WorkspaceRole::Owner
	}

	pub fn is_admin(&self) -> bool {
		self.role.has_permission_of(&WorkspaceRole::Admin)
	}

	/// Owners see every page; everyone else consults the permission map.
	pub fn can_view_page(&self, module_key: &str) -> bool {
		self.is_owner() || self.permissions.can_view(module_key)
	}

	pub fn can_edit_page(&self, module_key: &str) -> bool {
		self.is_owner() || self.permissions.can_edit(module_key)
	}

	/// Module availability for this workspace. Platform admins bypass the
	/// toggles; a module without an explicit row is enabled.
	pub fn is_module_enabled(&self, module_key: &str) -> bool {
		if self.is_platform_admin {
			return true;
		}
		self.module_settings.get(module_key).copied().unwrap_or(true)
	}
}

pub struct SessionManager {
	workspaces: Arc<dyn WorkspaceStore>,
	memberships: Arc<dyn MembershipStore>,
	selections: Arc<dyn SelectionStore>,
	modules: Arc<dyn ModuleSettingsStore>,
	audit: Arc<AuditService>,
	owner_gate: OwnerGate,
}

impl SessionManager {
	pub fn new(
		workspaces: Arc<dyn WorkspaceStore>,
		memberships: Arc<dyn MembershipStore>,
		selections: Arc<dyn SelectionStore>,
		modules: Arc<dyn ModuleSettingsStore>,
		audit: Arc<AuditService>,
		owner_gate: OwnerGate,
	) -> Self {
		Self {
			workspaces,
			memberships,
			selections,
			modules,
			audit,
			owner_gate,
		}
	}

	/// Build the workspace session for a freshly authenticated user.
	///
	/// The stored selection is honored only if it points into the candidate
	/// set and is backed by a membership (platform admins excepted). A stale
	/// pointer is cleared, audited, and replaced by the first valid
	/// candidate. No candidate at all yields [`SessionState::NoWorkspace`].
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn init_session(&self, user: &User) -> Result<SessionState, AccessError> {
		if user.is_deleted() {
			tracing::warn!(user_id = %user.id, "session refused for deleted account");
			return Ok(SessionState::Blocked);
		}

		let is_platform_admin = user.is_platform_admin || self.owner_gate.is_owner(user);
		let candidates = self
			.candidate_workspaces(&user.email_key(), is_platform_admin)
			.await?;
		if candidates.is_empty() {
			return Ok(SessionState::NoWorkspace);
		}

		if let Some(selected) = self.selections.get_selection(&user.id).await? {
			if candidates.iter().any(|w| w.id == selected) {
				if let Some(session) = self
					.try_activate(user, is_platform_admin, &candidates, selected)
					.await?
				{
					return Ok(SessionState::Active(Box::new(session)));
				}
			}
			// Stale pointer: candidate set moved on or the membership is gone.
			self.selections.clear_selection(&user.id).await?;
			self.audit.log(
				AuditLogBuilder::new(AuditEventType::WorkspaceAccessBlocked)
					.workspace(selected)
					.actor(user.id, user.email_key())
					.action("Cleared stored workspace selection")
					.details(serde_json::json!({ "reason": "no_membership" }))
					.build(),
			);
			tracing::warn!(user_id = %user.id, workspace_id = %selected, "stored selection failed re-validation");
		}

		for candidate in &candidates {
			if let Some(session) = self
				.try_activate(user, is_platform_admin, &candidates, candidate.id)
				.await?
			{
				self.selections
					.set_selection(&user.id, &session.workspace.id)
					.await?;
				return Ok(SessionState::Active(Box::new(session)));
			}
		}

		Ok(SessionState::NoWorkspace)
	}

	/// Re-validate an existing session from scratch.
	///
	/// Identical to [`Self::init_session`]: the stored pointer goes through
	/// the same membership check, so a revoked membership downgrades the
	/// session on the next refresh.
	pub async fn refresh(&self, user: &User) -> Result<SessionState, AccessError> {
		self.init_session(user).await
	}

	/// Move the session to another workspace.
	///
	/// Membership is re-verified exactly like init. A refused switch writes
	/// a `workspace_switch_blocked` entry and leaves both the session and
	/// the persisted pointer untouched.
	#[tracing::instrument(skip(self, session), fields(user_id = %session.user_id, target = %target))]
	pub async fn switch_workspace(
		&self,
		session: &mut WorkspaceSession,
		target: WorkspaceId,
	) -> Result<(), AccessError> {
		let workspace = self.workspaces.get_workspace_by_id(&target).await?;
		let membership = match workspace {
			Some(_) => {
				self.memberships
					.find_memberships(&target, &session.user_email)
					.await?
					.into_iter()
					.next()
			}
			None => None,
		};

		let allowed = workspace.is_some() && (session.is_platform_admin || membership.is_some());
		if !allowed {
			self.audit.log(
				AuditLogBuilder::new(AuditEventType::WorkspaceSwitchBlocked)
					.workspace(target)
					.actor(session.user_id, session.user_email.clone())
					.action("Refused workspace switch")
					.details(serde_json::json!({ "reason": "no_membership" }))
					.build(),
			);
			tracing::warn!(user_id = %session.user_id, workspace_id = %target, "workspace switch refused");
			return Err(AccessError::not_a_member());
		}

		let workspace = workspace.ok_or_else(|| AccessError::Unexpected("workspace vanished".to_string()))?;
		self.selections.set_selection(&session.user_id, &target).await?;
		// The candidate set may have moved since init; hand back a current one.
		session.candidates = self
			.candidate_workspaces(&session.user_email, session.is_platform_admin)
			.await?;
		self.apply_workspace(session, workspace, membership).await?;
		Ok(())
	}

	/// The only provisioning entry point, and it always fails.
	///
	/// Historically an empty candidate set auto-created a workspace, which
	/// silently cross-linked tenants. Any caller reaching for provisioning
	/// gets a loud log, an audit entry, and an error.
	pub fn auto_provision_disabled(&self, user: &User) -> AccessError {
		tracing::error!(
			user_id = %user.id,
			"implicit workspace provisioning attempted; refusing"
		);
		self.audit.log(
			AuditLogBuilder::new(AuditEventType::WorkspaceAutoCreateBlocked)
				.actor(user.id, user.email_key())
				.action("Blocked implicit workspace creation")
				.build(),
		);
		AccessError::Forbidden("workspace auto-provisioning is disabled".to_string())
	}

	async fn candidate_workspaces(
		&self,
		email_key: &str,
		is_platform_admin: bool,
	) -> Result<Vec<Workspace>, AccessError> {
		let candidates = if is_platform_admin {
			self.workspaces.list_live_workspaces().await?
		} else {
			self.workspaces.list_workspaces_for_email(email_key).await?
		};
		Ok(candidates)
	}

	/// Activate `target` if the user may hold it; `None` means not eligible.
	async fn try_activate(
		&self,
		user: &User,
		is_platform_admin: bool,
		candidates: &[Workspace],
		target: WorkspaceId,
	) -> Result<Option<WorkspaceSession>, AccessError> {
		let Some(workspace) = candidates.iter().find(|w| w.id == target).cloned() else {
			return Ok(None);
		};

		let membership = self
			.memberships
			.find_memberships(&target, &user.email_key())
			.await?
			.into_iter()
			.next();

		if membership.is_none() && !is_platform_admin {
			return Ok(None);
		}

		let mut session = WorkspaceSession {
			user_id: user.id,
			user_email: user.email_key(),
			is_platform_admin,
			workspace: workspace.clone(),
			role: WorkspaceRole::Viewer,
			permissions: PermissionSet::default(),
			membership_id: None,
			candidates: candidates.to_vec(),
			module_settings: BTreeMap::new(),
		};
		self.apply_workspace(&mut session, workspace, membership).await?;
		Ok(Some(session))
	}

	async fn apply_workspace(
		&self,
		session: &mut WorkspaceSession,
		workspace: Workspace,
		membership: Option<Membership>,
	) -> Result<(), AccessError> {
		session.module_settings = self.modules.list_module_settings(&workspace.id).await?;
		match membership {
			Some(m) => {
				session.role = m.role;
				session.permissions = m.permissions;
				session.membership_id = Some(m.id);
			}
			None => {
				// Platform admin acting without a membership row.
				session.role = WorkspaceRole::Owner;
				session.permissions = PermissionSet::default();
				session.membership_id = None;
			}
		}
		session.workspace = workspace;
		Ok(())
	}
}
