// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_server_auth::PermissionSet;

/// Request to verify membership in a workspace.
///
/// The id travels as a string so a malformed UUID maps to a 400, not a
/// body-rejection error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyAccessRequest {
	pub workspace_id: String,
}

/// Successful membership verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyAccessResponse {
	pub workspace_id: String,
	pub role: String,
	pub permissions: PermissionSet,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub membership_id: Option<String>,
	pub owner_bypass: bool,
}

/// A workspace in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceResponse {
	pub id: String,
	pub name: String,
	pub slug: String,
	pub created_at: DateTime<Utc>,
}

/// The caller's candidate workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWorkspacesResponse {
	pub workspaces: Vec<WorkspaceResponse>,
	pub total: usize,
}
