// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership resolver: the single authorization decision point.
//!
//! Every protected request funnels through [`AccessResolver::resolve_access`].
//! The decision depends only on the owner gate and the membership table;
//! audit delivery is fire-and-forget and can never change the outcome.

use std::sync::Arc;

use stockroom_server_audit::AuditService;
use stockroom_server_auth::{
	AuditEventType, AuditLogBuilder, MembershipId, PermissionSet, RequestContext, User, WorkspaceId,
	WorkspaceRole,
};
use stockroom_server_db::{MembershipStore, WorkspaceStore};

use crate::error::AccessError;
use crate::owner::OwnerGate;

/// The outcome of a successful membership verification.
#[derive(Debug, Clone)]
pub struct AccessDecision {
	pub workspace_id: WorkspaceId,
	pub role: WorkspaceRole,
	pub permissions: PermissionSet,
	/// `None` when the platform owner bypassed membership lookup.
	pub membership_id: Option<MembershipId>,
	pub owner_bypass: bool,
}

pub struct AccessResolver {
	workspaces: Arc<dyn WorkspaceStore>,
	memberships: Arc<dyn MembershipStore>,
	audit: Arc<AuditService>,
	owner_gate: OwnerGate,
}

impl AccessResolver {
	pub fn new(
		workspaces: Arc<dyn WorkspaceStore>,
		memberships: Arc<dyn MembershipStore>,
		audit: Arc<AuditService>,
		owner_gate: OwnerGate,
	) -> Self {
		Self {
			workspaces,
			memberships,
			audit,
			owner_gate,
		}
	}

	/// Verify that `user` may act inside `workspace_id`.
	///
	/// The platform owner is authorized without a membership lookup. For
	/// everyone else a live workspace and at least one membership row are
	/// required; a soft-deleted or missing workspace denies with the same
	/// message as a missing membership.
	#[tracing::instrument(skip(self, user, ctx), fields(
		user_id = user.map(|u| u.id.to_string()),
		workspace_id = workspace_id.map(|w| w.to_string()),
	))]
	pub async fn resolve_access(
		&self,
		user: Option<&User>,
		workspace_id: Option<WorkspaceId>,
		ctx: &RequestContext,
	) -> Result<AccessDecision, AccessError> {
		let user = user.ok_or(AccessError::Unauthenticated)?;
		let workspace_id = workspace_id
			.ok_or_else(|| AccessError::InvalidArgument("workspace id is required".to_string()))?;

		if self.owner_gate.is_owner(user) {
			self.audit.log(
				AuditLogBuilder::new(AuditEventType::AppOwnerAccess)
					.workspace(workspace_id)
					.actor(user.id, user.email_key())
					.action("Platform owner bypassed membership lookup")
					.request_context(ctx)
					.build(),
			);
			tracing::info!(user_id = %user.id, workspace_id = %workspace_id, "owner bypass granted");
			return Ok(AccessDecision {
				workspace_id,
				role: WorkspaceRole::Owner,
				permissions: PermissionSet::default(),
				membership_id: None,
				owner_bypass: true,
			});
		}

		let workspace = self.workspaces.get_workspace_by_id(&workspace_id).await?;
		if workspace.is_none() {
			// Missing and soft-deleted workspaces deny exactly like a
			// missing membership so the response leaks nothing.
			self.log_denied(user, workspace_id, ctx);
			return Err(AccessError::not_a_member());
		}

		let memberships = self
			.memberships
			.find_memberships(&workspace_id, &user.email_key())
			.await?;

		let Some(membership) = memberships.first() else {
			self.log_denied(user, workspace_id, ctx);
			return Err(AccessError::not_a_member());
		};

		if memberships.len() > 1 {
			tracing::warn!(
				user_id = %user.id,
				workspace_id = %workspace_id,
				count = memberships.len(),
				"duplicate memberships found; first (oldest) wins"
			);
		}

		self.audit.log(
			AuditLogBuilder::new(AuditEventType::WorkspaceAccessGranted)
				.workspace(workspace_id)
				.actor(user.id, user.email_key())
				.resource("membership", membership.id.to_string())
				.action("Membership verified")
				.request_context(ctx)
				.build(),
		);

		Ok(AccessDecision {
			workspace_id,
			role: membership.role,
			permissions: membership.permissions.clone(),
			membership_id: Some(membership.id),
			owner_bypass: false,
		})
	}

	fn log_denied(&self, user: &User, workspace_id: WorkspaceId, ctx: &RequestContext) {
		self.audit.log(
			AuditLogBuilder::new(AuditEventType::WorkspaceAccessDenied)
				.workspace(workspace_id)
				.actor(user.id, user.email_key())
				.action("Denied access: no membership")
				.details(serde_json::json!({ "reason": "no_membership" }))
				.request_context(ctx)
				.build(),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use stockroom_server_audit::{QueueOverflowPolicy, SqliteAuditSink};
	use stockroom_server_auth::AccountStatus;
	use stockroom_server_db::testing::{
		create_access_test_pool, sample_membership, sample_user, sample_workspace,
	};
	use stockroom_server_db::{AuditLogRepository, MembershipRepository, WorkspaceRepository};
	use tokio::time::{sleep, Duration};

	struct Fixture {
		resolver: AccessResolver,
		workspaces: WorkspaceRepository,
		memberships: MembershipRepository,
		audit_logs: AuditLogRepository,
	}

	async fn fixture(owner_email: &str) -> Fixture {
		let pool = create_access_test_pool().await;
		let sink = Arc::new(SqliteAuditSink::new(pool.clone()));
		let audit = Arc::new(AuditService::new(
			64,
			QueueOverflowPolicy::DropNewest,
			vec![sink],
		));
		Fixture {
			resolver: AccessResolver::new(
				Arc::new(WorkspaceRepository::new(pool.clone())),
				Arc::new(MembershipRepository::new(pool.clone())),
				audit,
				OwnerGate::from_email(owner_email),
			),
			workspaces: WorkspaceRepository::new(pool.clone()),
			memberships: MembershipRepository::new(pool.clone()),
			audit_logs: AuditLogRepository::new(pool),
		}
	}

	#[tokio::test]
	async fn missing_user_is_unauthenticated() {
		let f = fixture("").await;
		let err = f
			.resolver
			.resolve_access(None, Some(WorkspaceId::generate()), &RequestContext::default())
			.await
			.unwrap_err();
		assert!(matches!(err, AccessError::Unauthenticated));
	}

	#[tokio::test]
	async fn missing_workspace_id_is_invalid_argument() {
		let f = fixture("").await;
		let user = sample_user("a@x.com");
		let err = f
			.resolver
			.resolve_access(Some(&user), None, &RequestContext::default())
			.await
			.unwrap_err();
		assert!(matches!(err, AccessError::InvalidArgument(_)));
	}

	#[tokio::test]
	async fn member_is_granted_with_membership_role() {
		let f = fixture("").await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Member);
		f.memberships.create_membership(&m).await.unwrap();

		let user = sample_user("a@x.com");
		let decision = f
			.resolver
			.resolve_access(Some(&user), Some(ws.id), &RequestContext::default())
			.await
			.unwrap();

		assert_eq!(decision.role, WorkspaceRole::Member);
		assert_eq!(decision.membership_id, Some(m.id));
		assert!(!decision.owner_bypass);

		sleep(Duration::from_millis(50)).await;
		assert_eq!(
			f.audit_logs
				.count_by_event_type("workspace_access_granted")
				.await
				.unwrap(),
			1
		);
	}

	#[tokio::test]
	async fn non_member_is_denied_with_one_audit_entry() {
		let f = fixture("").await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Member);
		f.memberships.create_membership(&m).await.unwrap();

		let user = sample_user("b@x.com");
		let ctx = RequestContext {
			ip_address: Some("10.1.2.3".to_string()),
			user_agent: Some("test-agent".to_string()),
			referrer: Some("https://app.example.com/orders".to_string()),
		};
		let err = f
			.resolver
			.resolve_access(Some(&user), Some(ws.id), &ctx)
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "you are not a member of this workspace");

		sleep(Duration::from_millis(50)).await;
		let (logs, total) = f
			.audit_logs
			.list_audit_logs(&stockroom_server_db::AuditLogQuery {
				event_type: Some("workspace_access_denied".to_string()),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 1);
		let details = logs[0].details.as_ref().unwrap();
		assert_eq!(details["reason"], "no_membership");
		assert_eq!(details["referrer"], "https://app.example.com/orders");
		assert_eq!(logs[0].ip_address.as_deref(), Some("10.1.2.3"));
	}

	#[tokio::test]
	async fn deleted_workspace_denies_like_missing_membership() {
		let f = fixture("").await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Owner);
		f.memberships.create_membership(&m).await.unwrap();
		f.workspaces.soft_delete_workspace(&ws.id).await.unwrap();

		let user = sample_user("a@x.com");
		let deleted_err = f
			.resolver
			.resolve_access(Some(&user), Some(ws.id), &RequestContext::default())
			.await
			.unwrap_err();
		let missing_err = f
			.resolver
			.resolve_access(
				Some(&user),
				Some(WorkspaceId::generate()),
				&RequestContext::default(),
			)
			.await
			.unwrap_err();

		assert_eq!(deleted_err.to_string(), missing_err.to_string());
	}

	#[tokio::test]
	async fn owner_email_bypasses_membership_lookup() {
		let f = fixture("ops@example.com").await;
		let user = sample_user("Ops@Example.COM");

		// no workspace row, no membership; the owner is still authorized
		let decision = f
			.resolver
			.resolve_access(
				Some(&user),
				Some(WorkspaceId::generate()),
				&RequestContext::default(),
			)
			.await
			.unwrap();
		assert_eq!(decision.role, WorkspaceRole::Owner);
		assert!(decision.owner_bypass);
		assert_eq!(decision.membership_id, None);

		sleep(Duration::from_millis(50)).await;
		assert_eq!(
			f.audit_logs
				.count_by_event_type("app_owner_access")
				.await
				.unwrap(),
			1
		);
	}

	#[tokio::test]
	async fn oldest_membership_wins_on_duplicates() {
		let f = fixture("").await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();

		let mut older = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Viewer);
		older.created_at = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
			.unwrap()
			.with_timezone(&chrono::Utc);
		let mut newer = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Admin);
		newer.created_at = chrono::DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
			.unwrap()
			.with_timezone(&chrono::Utc);
		f.memberships.create_membership(&newer).await.unwrap();
		f.memberships.create_membership(&older).await.unwrap();

		let user = sample_user("a@x.com");
		let decision = f
			.resolver
			.resolve_access(Some(&user), Some(ws.id), &RequestContext::default())
			.await
			.unwrap();
		assert_eq!(decision.membership_id, Some(older.id));
		assert_eq!(decision.role, WorkspaceRole::Viewer);
	}

	#[tokio::test]
	async fn decision_unchanged_when_audit_queue_is_full() {
		let pool = create_access_test_pool().await;
		// Capacity 1 on a current-thread runtime: the queue fills and stays
		// full because the background task never gets to run between logs.
		let audit = Arc::new(AuditService::new(1, QueueOverflowPolicy::DropNewest, vec![]));
		let workspaces = WorkspaceRepository::new(pool.clone());
		let memberships = MembershipRepository::new(pool.clone());
		let resolver = AccessResolver::new(
			Arc::new(workspaces.clone()),
			Arc::new(memberships.clone()),
			audit,
			OwnerGate::disabled(),
		);

		let ws = sample_workspace("t1");
		workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Member);
		memberships.create_membership(&m).await.unwrap();

		let member = sample_user("a@x.com");
		let stranger = sample_user("b@x.com");

		// burn the single queue slot
		let granted = resolver
			.resolve_access(Some(&member), Some(ws.id), &RequestContext::default())
			.await;
		assert!(granted.is_ok());

		// denied audit entry is dropped; the 403 still comes back
		let err = resolver
			.resolve_access(Some(&stranger), Some(ws.id), &RequestContext::default())
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), 403);
	}

	#[tokio::test]
	async fn deleted_user_flag_does_not_affect_resolver() {
		// resolver answers membership questions; session init blocks deleted
		// users before ever reaching here
		let f = fixture("").await;
		let ws = sample_workspace("t1");
		f.workspaces.create_workspace(&ws).await.unwrap();
		let m = sample_membership(&ws.id, "a@x.com", WorkspaceRole::Member);
		f.memberships.create_membership(&m).await.unwrap();

		let mut user = sample_user("a@x.com");
		user.account_status = AccountStatus::Deleted;
		let decision = f
			.resolver
			.resolve_access(Some(&user), Some(ws.id), &RequestContext::default())
			.await;
		assert!(decision.is_ok());
	}
}
