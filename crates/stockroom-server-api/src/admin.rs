// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Owner-only admin surface: access audits, integrity cleanup, targeted
//! repair, and the audit log query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
	true
}

fn default_limit() -> i32 {
	50
}

/// Query parameters for the access audit report.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessAuditParams {
	pub workspace_id: Option<String>,
}

/// One member line in a workspace roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntryResponse {
	pub user_email: String,
	pub role: String,
}

/// One workspace roster in the access audit report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceRosterResponse {
	pub workspace_id: String,
	pub name: String,
	pub slug: String,
	pub members: Vec<RosterEntryResponse>,
}

/// A user flagged by the access audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousUserResponse {
	pub user_email: String,
	pub workspace_count: usize,
}

/// The access audit report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessAuditResponse {
	pub timestamp: DateTime<Utc>,
	pub total_workspaces: usize,
	pub total_memberships: usize,
	pub rosters: Vec<WorkspaceRosterResponse>,
	pub suspicious_users: Vec<SuspiciousUserResponse>,
}

/// Request for an integrity cleanup run. Dry-run unless stated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRequest {
	#[serde(default = "default_true")]
	pub dry_run: bool,
	pub workspace_id: Option<String>,
}

/// A membership flagged by a cleanup or repair scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedMembershipResponse {
	pub membership_id: String,
	pub user_email: String,
	pub workspace_id: String,
	pub created_at: DateTime<Utc>,
}

/// Findings for one cleanup category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupCategoryResponse {
	pub found: usize,
	pub removed: usize,
	pub memberships: Vec<FlaggedMembershipResponse>,
}

/// The integrity cleanup report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
	pub timestamp: DateTime<Utc>,
	pub dry_run: bool,
	pub invalid_workspace_refs: CleanupCategoryResponse,
	pub duplicates: CleanupCategoryResponse,
}

/// Request to remove specific memberships from one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMembershipsRequest {
	pub workspace_id: String,
	pub emails: Vec<String>,
	#[serde(default = "default_true")]
	pub dry_run: bool,
}

/// The repair report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMembershipsResponse {
	pub timestamp: DateTime<Utc>,
	pub workspace_id: String,
	pub dry_run: bool,
	pub matched: Vec<FlaggedMembershipResponse>,
	pub removed_count: usize,
}

/// Query parameters for the audit log listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAuditLogsParams {
	pub event_type: Option<String>,
	pub workspace_id: Option<String>,
	#[serde(default = "default_limit")]
	pub limit: i32,
	#[serde(default)]
	pub offset: i32,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntryResponse {
	pub id: String,
	pub timestamp: String,
	pub event_type: String,
	pub workspace_id: Option<String>,
	pub actor_user_id: Option<String>,
	pub actor_email: Option<String>,
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,
	pub action: String,
	pub ip_address: Option<String>,
	pub user_agent: Option<String>,
	pub details: Option<serde_json::Value>,
}

/// Paginated list of audit logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAuditLogsResponse {
	pub logs: Vec<AuditLogEntryResponse>,
	pub total: i64,
	pub limit: i32,
	pub offset: i32,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cleanup_request_defaults_to_dry_run() {
		let req: CleanupRequest = serde_json::from_str("{}").unwrap();
		assert!(req.dry_run);
		assert!(req.workspace_id.is_none());
	}

	#[test]
	fn remove_request_defaults_to_dry_run() {
		let req: RemoveMembershipsRequest =
			serde_json::from_str(r#"{"workspace_id": "w", "emails": ["a@x.com"]}"#).unwrap();
		assert!(req.dry_run);
	}

	#[test]
	fn audit_log_params_default_pagination() {
		let params: ListAuditLogsParams = serde_json::from_str("{}").unwrap();
		assert_eq!(params.limit, 50);
		assert_eq!(params.offset, 0);
	}
}
