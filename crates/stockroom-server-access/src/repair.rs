// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Targeted membership repair.
//!
//! Removes specific `(workspace, email)` memberships, typically after an
//! access audit surfaced rows that should not exist. Owner-gated, dry-run
//! by default, best-effort per record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stockroom_server_audit::AuditService;
use stockroom_server_auth::{AuditEventType, AuditLogBuilder, User, WorkspaceId};
use stockroom_server_db::MembershipStore;

use crate::error::AccessError;
use crate::integrity::MembershipRecord;
use crate::owner::OwnerGate;

/// Options for a repair run.
#[derive(Debug, Clone)]
pub struct RemoveMembershipsOptions {
	pub workspace_id: WorkspaceId,
	/// Emails to remove; compared lowercased.
	pub emails: Vec<String>,
	pub dry_run: bool,
}

impl RemoveMembershipsOptions {
	pub fn new(workspace_id: WorkspaceId, emails: Vec<String>) -> Self {
		Self {
			workspace_id,
			emails,
			dry_run: true,
		}
	}
}

/// Report produced by [`RepairTools::remove_memberships`].
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
	pub timestamp: DateTime<Utc>,
	pub workspace_id: WorkspaceId,
	pub dry_run: bool,
	pub matched: Vec<MembershipRecord>,
	pub removed_count: usize,
}

pub struct RepairTools {
	memberships: Arc<dyn MembershipStore>,
	audit: Arc<AuditService>,
	owner_gate: OwnerGate,
}

impl RepairTools {
	pub fn new(
		memberships: Arc<dyn MembershipStore>,
		audit: Arc<AuditService>,
		owner_gate: OwnerGate,
	) -> Self {
		Self {
			memberships,
			audit,
			owner_gate,
		}
	}

	/// Remove the memberships matching the given emails in one workspace.
	///
	/// No matches is a zero-result report, not an error. Deletions continue
	/// past per-record failures; each removal writes one
	/// `workspace_access_revoked` entry and the run one summary entry.
	#[tracing::instrument(skip(self, caller, opts), fields(
		caller_id = %caller.id,
		workspace_id = %opts.workspace_id,
		dry_run = opts.dry_run,
	))]
	pub async fn remove_memberships(
		&self,
		caller: &User,
		opts: RemoveMembershipsOptions,
	) -> Result<RepairReport, AccessError> {
		self.owner_gate.require_owner(caller)?;

		if opts.emails.is_empty() {
			return Err(AccessError::InvalidArgument(
				"at least one email is required".to_string(),
			));
		}

		let targets: Vec<String> = opts
			.emails
			.iter()
			.map(|e| e.trim().to_ascii_lowercase())
			.collect();

		let matched: Vec<_> = self
			.memberships
			.list_memberships_for_workspace(&opts.workspace_id)
			.await?
			.into_iter()
			.filter(|m| targets.contains(&m.user_email.to_ascii_lowercase()))
			.collect();

		let mut removed_count = 0;
		if !opts.dry_run {
			for m in &matched {
				match self.memberships.delete_membership(&m.id).await {
					Ok(true) => {
						removed_count += 1;
						self.audit.log(
							AuditLogBuilder::new(AuditEventType::WorkspaceAccessRevoked)
								.workspace(opts.workspace_id)
								.actor(caller.id, caller.email_key())
								.resource("membership", m.id.to_string())
								.action("Removed membership by repair")
								.details(serde_json::json!({ "user_email": m.user_email }))
								.build(),
						);
					}
					Ok(false) => {
						tracing::warn!(membership_id = %m.id, "membership already gone during repair");
					}
					Err(e) => {
						tracing::warn!(membership_id = %m.id, error = %e, "failed to remove membership; continuing");
					}
				}
			}
		}

		let report = RepairReport {
			timestamp: Utc::now(),
			workspace_id: opts.workspace_id,
			dry_run: opts.dry_run,
			matched: matched.iter().map(MembershipRecord::from).collect(),
			removed_count,
		};

		self.audit.log(
			AuditLogBuilder::new(AuditEventType::WorkspaceMembershipRepair)
				.workspace(opts.workspace_id)
				.actor(caller.id, caller.email_key())
				.action("Membership repair run")
				.details(serde_json::json!({
					"dry_run": report.dry_run,
					"matched": report.matched.len(),
					"removed": report.removed_count,
				}))
				.build(),
		);

		Ok(report)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use stockroom_server_audit::{QueueOverflowPolicy, SqliteAuditSink};
	use stockroom_server_auth::WorkspaceRole;
	use stockroom_server_db::testing::{
		create_access_test_pool, sample_membership, sample_user, sample_workspace,
	};
	use stockroom_server_db::{AuditLogRepository, MembershipRepository, WorkspaceRepository};
	use tokio::time::{sleep, Duration};

	struct Fixture {
		repair: RepairTools,
		workspaces: WorkspaceRepository,
		memberships: MembershipRepository,
		audit_logs: AuditLogRepository,
	}

	async fn fixture() -> Fixture {
		let pool = create_access_test_pool().await;
		let sink = Arc::new(SqliteAuditSink::new(pool.clone()));
		let audit = Arc::new(AuditService::new(
			64,
			QueueOverflowPolicy::DropNewest,
			vec![sink],
		));
		Fixture {
			repair: RepairTools::new(
				Arc::new(MembershipRepository::new(pool.clone())),
				audit,
				OwnerGate::from_email("ops@example.com"),
			),
			workspaces: WorkspaceRepository::new(pool.clone()),
			memberships: MembershipRepository::new(pool.clone()),
			audit_logs: AuditLogRepository::new(pool),
		}
	}

	fn owner() -> User {
		sample_user("ops@example.com")
	}

	#[tokio::test]
	async fn repair_requires_the_owner() {
		let f = fixture().await;
		let stranger = sample_user("admin@x.com");

		let err = f
			.repair
			.remove_memberships(
				&stranger,
				RemoveMembershipsOptions::new(WorkspaceId::generate(), vec!["a@x.com".to_string()]),
			)
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), 403);
	}

	#[tokio::test]
	async fn empty_email_list_is_invalid() {
		let f = fixture().await;
		let err = f
			.repair
			.remove_memberships(
				&owner(),
				RemoveMembershipsOptions::new(WorkspaceId::generate(), vec![]),
			)
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), 400);
	}

	#[tokio::test]
	async fn dry_run_matches_without_removing() {
		let f = fixture().await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Member);
		f.memberships.create_membership(&m).await.unwrap();

		let report = f
			.repair
			.remove_memberships(
				&owner(),
				RemoveMembershipsOptions::new(ws.id, vec!["A@X.com".to_string()]),
			)
			.await
			.unwrap();

		assert!(report.dry_run);
		assert_eq!(report.matched.len(), 1);
		assert_eq!(report.removed_count, 0);
		assert_eq!(
			f.memberships.list_all_memberships(None).await.unwrap().len(),
			1
		);
	}

	#[tokio::test]
	async fn real_run_removes_matches_and_audits_each() {
		let f = fixture().await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		for email in ["a@x.com", "b@x.com", "keep@x.com"] {
			f.memberships
				.create_membership(&sample_membership(&ws.id, email, WorkspaceRole::Member))
				.await
				.unwrap();
		}

		let mut opts = RemoveMembershipsOptions::new(
			ws.id,
			vec!["a@x.com".to_string(), "b@x.com".to_string()],
		);
		opts.dry_run = false;
		let report = f.repair.remove_memberships(&owner(), opts).await.unwrap();

		assert_eq!(report.matched.len(), 2);
		assert_eq!(report.removed_count, 2);

		let remaining = f.memberships.list_all_memberships(None).await.unwrap();
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].user_email, "keep@x.com");

		sleep(Duration::from_millis(50)).await;
		assert_eq!(
			f.audit_logs
				.count_by_event_type("workspace_access_revoked")
				.await
				.unwrap(),
			2
		);
		assert_eq!(
			f.audit_logs
				.count_by_event_type("workspace_membership_repair")
				.await
				.unwrap(),
			1
		);
	}

	#[tokio::test]
	async fn no_matches_is_a_zero_result_report() {
		let f = fixture().await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();

		let mut opts = RemoveMembershipsOptions::new(ws.id, vec!["ghost@x.com".to_string()]);
		opts.dry_run = false;
		let report = f.repair.remove_memberships(&owner(), opts).await.unwrap();

		assert!(report.matched.is_empty());
		assert_eq!(report.removed_count, 0);
	}
}
