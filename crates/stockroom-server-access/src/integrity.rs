// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership integrity auditor.
//!
//! Two scans over the membership table: references to workspace rows that
//! do not exist at all (soft-deleted rows still count as existing), and
//! duplicate `(workspace, email)` records. Both default to dry-run.
//! Findings are reported, never raised as errors; deletions are per-record
//! and best-effort.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stockroom_server_audit::AuditService;
use stockroom_server_auth::{
	AuditEventType, AuditLogBuilder, Membership, MembershipId, User, WorkspaceId,
};
use stockroom_server_db::{MembershipStore, WorkspaceStore};

use crate::error::AccessError;
use crate::owner::OwnerGate;

/// Options for an integrity cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
	/// Report without deleting. This is the default; destructive runs are
	/// always an explicit opt-in.
	pub dry_run: bool,
	/// Bound the scan to one workspace.
	pub workspace_id: Option<WorkspaceId>,
}

impl Default for CleanupOptions {
	fn default() -> Self {
		Self {
			dry_run: true,
			workspace_id: None,
		}
	}
}

/// One membership flagged by a scan.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipRecord {
	pub membership_id: MembershipId,
	pub user_email: String,
	pub workspace_id: WorkspaceId,
	pub created_at: DateTime<Utc>,
}

impl From<&Membership> for MembershipRecord {
	fn from(m: &Membership) -> Self {
		Self {
			membership_id: m.id,
			user_email: m.user_email.clone(),
			workspace_id: m.workspace_id,
			created_at: m.created_at,
		}
	}
}

/// Findings for one scan category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupCategory {
	pub found: usize,
	pub removed: usize,
	pub memberships: Vec<MembershipRecord>,
}

/// Report produced by [`IntegrityAuditor::cleanup_invalid_memberships`].
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
	pub timestamp: DateTime<Utc>,
	pub dry_run: bool,
	pub invalid_workspace_refs: CleanupCategory,
	pub duplicates: CleanupCategory,
}

/// One workspace roster line in the access audit report.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
	pub user_email: String,
	pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceRoster {
	pub workspace_id: WorkspaceId,
	pub name: String,
	pub slug: String,
	pub members: Vec<RosterEntry>,
}

/// A user flagged for holding memberships in unusually many workspaces.
#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousUser {
	pub user_email: String,
	pub workspace_count: usize,
}

/// Report produced by [`IntegrityAuditor::audit_workspace_access`].
#[derive(Debug, Clone, Serialize)]
pub struct AccessAuditReport {
	pub timestamp: DateTime<Utc>,
	pub total_workspaces: usize,
	pub total_memberships: usize,
	pub rosters: Vec<WorkspaceRoster>,
	pub suspicious_users: Vec<SuspiciousUser>,
}

pub struct IntegrityAuditor {
	workspaces: Arc<dyn WorkspaceStore>,
	memberships: Arc<dyn MembershipStore>,
	audit: Arc<AuditService>,
	owner_gate: OwnerGate,
	suspicious_threshold: usize,
}

impl IntegrityAuditor {
	pub fn new(
		workspaces: Arc<dyn WorkspaceStore>,
		memberships: Arc<dyn MembershipStore>,
		audit: Arc<AuditService>,
		owner_gate: OwnerGate,
		suspicious_threshold: usize,
	) -> Self {
		Self {
			workspaces,
			memberships,
			audit,
			owner_gate,
			suspicious_threshold,
		}
	}

	/// Scan for invalid workspace references and duplicate memberships.
	///
	/// Owner-gated. Only a failure to read the base lists aborts the run;
	/// individual deletes that fail are logged and skipped.
	#[tracing::instrument(skip(self, caller), fields(caller_id = %caller.id, dry_run = opts.dry_run))]
	pub async fn cleanup_invalid_memberships(
		&self,
		caller: &User,
		opts: CleanupOptions,
	) -> Result<CleanupReport, AccessError> {
		self.owner_gate.require_owner(caller)?;

		let all = self
			.memberships
			.list_all_memberships(opts.workspace_id.as_ref())
			.await?;
		let known_workspaces = self.workspaces.all_ids_including_deleted().await?;

		let mut invalid: Vec<Membership> = Vec::new();
		let mut valid: Vec<Membership> = Vec::new();
		for m in all {
			if known_workspaces.contains(&m.workspace_id) {
				valid.push(m);
			} else {
				invalid.push(m);
			}
		}

		// Keep-oldest contract: sort explicitly, never trust store order.
		valid.sort_by_key(|m| m.created_at);
		let mut seen: HashSet<(WorkspaceId, String)> = HashSet::new();
		let mut duplicates: Vec<Membership> = Vec::new();
		for m in &valid {
			let key = (m.workspace_id, m.user_email.to_ascii_lowercase());
			if !seen.insert(key) {
				duplicates.push(m.clone());
			}
		}

		let mut report = CleanupReport {
			timestamp: Utc::now(),
			dry_run: opts.dry_run,
			invalid_workspace_refs: CleanupCategory {
				found: invalid.len(),
				removed: 0,
				memberships: invalid.iter().map(MembershipRecord::from).collect(),
			},
			duplicates: CleanupCategory {
				found: duplicates.len(),
				removed: 0,
				memberships: duplicates.iter().map(MembershipRecord::from).collect(),
			},
		};

		if !opts.dry_run {
			report.invalid_workspace_refs.removed = self.delete_best_effort(&invalid).await;
			report.duplicates.removed = self.delete_best_effort(&duplicates).await;
		}

		self.audit.log(
			AuditLogBuilder::new(AuditEventType::MembershipCleanup)
				.actor(caller.id, caller.email_key())
				.action("Membership integrity cleanup")
				.details(serde_json::json!({
					"dry_run": report.dry_run,
					"invalid_found": report.invalid_workspace_refs.found,
					"invalid_removed": report.invalid_workspace_refs.removed,
					"duplicates_found": report.duplicates.found,
					"duplicates_removed": report.duplicates.removed,
				}))
				.build(),
		);

		tracing::info!(
			invalid_found = report.invalid_workspace_refs.found,
			duplicates_found = report.duplicates.found,
			dry_run = report.dry_run,
			"integrity cleanup finished"
		);
		Ok(report)
	}

	/// Cross-tenant access report: rosters, totals, and users in
	/// suspiciously many workspaces. Read-only and owner-gated.
	#[tracing::instrument(skip(self, caller), fields(caller_id = %caller.id))]
	pub async fn audit_workspace_access(
		&self,
		caller: &User,
		workspace_id: Option<WorkspaceId>,
	) -> Result<AccessAuditReport, AccessError> {
		self.owner_gate.require_owner(caller)?;

		let workspaces = match workspace_id {
			Some(id) => self
				.workspaces
				.get_workspace_by_id(&id)
				.await?
				.into_iter()
				.collect(),
			None => self.workspaces.list_live_workspaces().await?,
		};

		// Totals and the suspicious-user scan cover every membership row in
		// scope, including rows whose tenant is soft-deleted or dangling.
		// Rosters stay scoped to live workspaces.
		let all_memberships = self
			.memberships
			.list_all_memberships(workspace_id.as_ref())
			.await?;
		let total_memberships = all_memberships.len();
		let mut per_user: HashMap<String, HashSet<WorkspaceId>> = HashMap::new();
		for m in &all_memberships {
			per_user
				.entry(m.user_email.to_ascii_lowercase())
				.or_default()
				.insert(m.workspace_id);
		}

		let mut rosters = Vec::with_capacity(workspaces.len());
		for ws in &workspaces {
			let members = self.memberships.list_memberships_for_workspace(&ws.id).await?;
			rosters.push(WorkspaceRoster {
				workspace_id: ws.id,
				name: ws.name.clone(),
				slug: ws.slug.clone(),
				members: members
					.iter()
					.map(|m| RosterEntry {
						user_email: m.user_email.clone(),
						role: m.role.to_string(),
					})
					.collect(),
			});
		}

		let mut suspicious_users: Vec<SuspiciousUser> = per_user
			.into_iter()
			.filter(|(email, workspaces)| {
				workspaces.len() > self.suspicious_threshold && !self.owner_gate.is_owner_email(email)
			})
			.map(|(user_email, workspaces)| SuspiciousUser {
				user_email,
				workspace_count: workspaces.len(),
			})
			.collect();
		suspicious_users.sort_by(|a, b| a.user_email.cmp(&b.user_email));

		let report = AccessAuditReport {
			timestamp: Utc::now(),
			total_workspaces: workspaces.len(),
			total_memberships,
			rosters,
			suspicious_users,
		};

		self.audit.log(
			AuditLogBuilder::new(AuditEventType::WorkspaceAccessAudit)
				.actor(caller.id, caller.email_key())
				.action("Workspace access audit")
				.details(serde_json::json!({
					"total_workspaces": report.total_workspaces,
					"total_memberships": report.total_memberships,
					"suspicious_users": report.suspicious_users.len(),
				}))
				.build(),
		);

		Ok(report)
	}

	async fn delete_best_effort(&self, records: &[Membership]) -> usize {
		let mut removed = 0;
		for m in records {
			match self.memberships.delete_membership(&m.id).await {
				Ok(true) => removed += 1,
				Ok(false) => {
					tracing::warn!(membership_id = %m.id, "membership already gone during cleanup");
				}
				Err(e) => {
					tracing::warn!(membership_id = %m.id, error = %e, "failed to delete membership; continuing");
				}
			}
		}
		removed
	}
}
