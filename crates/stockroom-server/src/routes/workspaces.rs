// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace membership verification and listing.

use axum::{extract::State, Extension, Json};

use stockroom_server_api::{
	ListWorkspacesResponse, VerifyAccessRequest, VerifyAccessResponse, WorkspaceResponse,
};
use stockroom_server_auth::RequestContext;

use crate::{api::AppState, auth::CurrentUser, error::ApiError, routes::parse_workspace_id};

/// POST /api/workspaces/verify - resolve the caller's standing in a workspace.
pub async fn verify_access(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Extension(ctx): Extension<RequestContext>,
	Json(payload): Json<VerifyAccessRequest>,
) -> Result<Json<VerifyAccessResponse>, ApiError> {
	let workspace_id = parse_workspace_id(&payload.workspace_id)?;

	let decision = state
		.resolver
		.resolve_access(Some(&current.user), Some(workspace_id), &ctx)
		.await?;

	Ok(Json(VerifyAccessResponse {
		workspace_id: decision.workspace_id.to_string(),
		role: decision.role.to_string(),
		permissions: decision.permissions,
		membership_id: decision.membership_id.map(|id| id.to_string()),
		owner_bypass: decision.owner_bypass,
	}))
}

/// GET /api/workspaces - the caller's candidate workspaces.
///
/// Platform admins and the owner see every live workspace; everyone else
/// sees the live workspaces their memberships point at.
pub async fn list_workspaces(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
) -> Result<Json<ListWorkspacesResponse>, ApiError> {
	let privileged = current.user.is_platform_admin || state.owner_gate.is_owner(&current.user);

	let workspaces = if privileged {
		state.workspaces.list_live_workspaces().await?
	} else {
		state
			.workspaces
			.list_workspaces_for_email(&current.user.email_key())
			.await?
	};

	let workspaces: Vec<WorkspaceResponse> = workspaces
		.into_iter()
		.map(|w| WorkspaceResponse {
			id: w.id.to_string(),
			name: w.name,
			slug: w.slug,
			created_at: w.created_at,
		})
		.collect();

	Ok(Json(ListWorkspacesResponse {
		total: workspaces.len(),
		workspaces,
	}))
}
