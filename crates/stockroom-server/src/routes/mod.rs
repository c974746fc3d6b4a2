// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers, grouped by surface.

pub mod admin;
pub mod events;
pub mod health;
pub mod workspaces;

use stockroom_server_access::AccessError;
use stockroom_server_auth::WorkspaceId;
use uuid::Uuid;

use crate::error::ApiError;

/// Workspace ids travel as strings; a malformed one is the caller's fault.
pub(crate) fn parse_workspace_id(raw: &str) -> Result<WorkspaceId, ApiError> {
	Uuid::parse_str(raw.trim())
		.map(WorkspaceId::new)
		.map_err(|_| {
			ApiError(AccessError::InvalidArgument(
				"workspace_id must be a UUID".to_string(),
			))
		})
}
