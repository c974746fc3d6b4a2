// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Owner-only admin handlers: access audits, integrity cleanup, targeted
//! repair, and the audit log query.
//!
//! The owner gate lives in the core operations; these handlers only map
//! reports onto wire types. The audit log query gates here because it reads
//! storage directly.

use axum::{
	extract::{Query, State},
	Extension, Json,
};

use stockroom_server_access::{
	CleanupCategory, CleanupOptions, MembershipRecord, RemoveMembershipsOptions,
};
use stockroom_server_api::{
	AccessAuditParams, AccessAuditResponse, AuditLogEntryResponse, CleanupCategoryResponse,
	CleanupRequest, CleanupResponse, FlaggedMembershipResponse, ListAuditLogsParams,
	ListAuditLogsResponse, RemoveMembershipsRequest, RemoveMembershipsResponse,
	RosterEntryResponse, SuspiciousUserResponse, WorkspaceRosterResponse,
};
use stockroom_server_db::AuditLogQuery;

use crate::{api::AppState, auth::CurrentUser, error::ApiError, routes::parse_workspace_id};

fn flagged(records: Vec<MembershipRecord>) -> Vec<FlaggedMembershipResponse> {
	records
		.into_iter()
		.map(|r| FlaggedMembershipResponse {
			membership_id: r.membership_id.to_string(),
			user_email: r.user_email,
			workspace_id: r.workspace_id.to_string(),
			created_at: r.created_at,
		})
		.collect()
}

fn category(c: CleanupCategory) -> CleanupCategoryResponse {
	CleanupCategoryResponse {
		found: c.found,
		removed: c.removed,
		memberships: flagged(c.memberships),
	}
}

/// GET /api/admin/workspaces/access-audit - cross-tenant membership report.
pub async fn access_audit(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Query(params): Query<AccessAuditParams>,
) -> Result<Json<AccessAuditResponse>, ApiError> {
	let workspace_id = params
		.workspace_id
		.as_deref()
		.map(parse_workspace_id)
		.transpose()?;

	let report = state
		.integrity
		.audit_workspace_access(&current.user, workspace_id)
		.await?;

	Ok(Json(AccessAuditResponse {
		timestamp: report.timestamp,
		total_workspaces: report.total_workspaces,
		total_memberships: report.total_memberships,
		rosters: report
			.rosters
			.into_iter()
			.map(|r| WorkspaceRosterResponse {
				workspace_id: r.workspace_id.to_string(),
				name: r.name,
				slug: r.slug,
				members: r
					.members
					.into_iter()
					.map(|m| RosterEntryResponse {
						user_email: m.user_email,
						role: m.role,
					})
					.collect(),
			})
			.collect(),
		suspicious_users: report
			.suspicious_users
			.into_iter()
			.map(|u| SuspiciousUserResponse {
				user_email: u.user_email,
				workspace_count: u.workspace_count,
			})
			.collect(),
	}))
}

/// POST /api/admin/memberships/cleanup - integrity cleanup run.
pub async fn cleanup_memberships(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Json(payload): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, ApiError> {
	let workspace_id = payload
		.workspace_id
		.as_deref()
		.map(parse_workspace_id)
		.transpose()?;

	let report = state
		.integrity
		.cleanup_invalid_memberships(
			&current.user,
			CleanupOptions {
				dry_run: payload.dry_run,
				workspace_id,
			},
		)
		.await?;

	Ok(Json(CleanupResponse {
		timestamp: report.timestamp,
		dry_run: report.dry_run,
		invalid_workspace_refs: category(report.invalid_workspace_refs),
		duplicates: category(report.duplicates),
	}))
}

/// POST /api/admin/memberships/remove - targeted membership removal.
pub async fn remove_memberships(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Json(payload): Json<RemoveMembershipsRequest>,
) -> Result<Json<RemoveMembershipsResponse>, ApiError> {
	let workspace_id = parse_workspace_id(&payload.workspace_id)?;

	let mut opts = RemoveMembershipsOptions::new(workspace_id, payload.emails);
	opts.dry_run = payload.dry_run;

	let report = state.repair.remove_memberships(&current.user, opts).await?;

	Ok(Json(RemoveMembershipsResponse {
		timestamp: report.timestamp,
		workspace_id: report.workspace_id.to_string(),
		dry_run: report.dry_run,
		matched: flagged(report.matched),
		removed_count: report.removed_count,
	}))
}

/// GET /api/admin/audit-logs - paginated audit log listing.
pub async fn list_audit_logs(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Query(params): Query<ListAuditLogsParams>,
) -> Result<Json<ListAuditLogsResponse>, ApiError> {
	state.owner_gate.require_owner(&current.user)?;

	let workspace_id = params
		.workspace_id
		.as_deref()
		.map(parse_workspace_id)
		.transpose()?;

	let query = AuditLogQuery {
		event_type: params.event_type,
		workspace_id,
		limit: params.limit,
		offset: params.offset,
	};
	let (logs, total) = state.audit_logs.list_audit_logs(&query).await?;

	Ok(Json(ListAuditLogsResponse {
		logs: logs
			.into_iter()
			.map(|l| AuditLogEntryResponse {
				id: l.id,
				timestamp: l.timestamp,
				event_type: l.event_type,
				workspace_id: l.workspace_id,
				actor_user_id: l.actor_user_id,
				actor_email: l.actor_email,
				resource_type: l.resource_type,
				resource_id: l.resource_id,
				action: l.action,
				ip_address: l.ip_address,
				user_agent: l.user_agent,
				details: l.details,
			})
			.collect(),
		total,
		limit: query.limit,
		offset: query.offset,
	}))
}
