// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-reported access events.

use axum::{extract::State, Extension, Json};

use stockroom_server_access::AccessError;
use stockroom_server_api::{LogAccessEventRequest, LogAccessEventResponse};
use stockroom_server_auth::{AuditEventType, AuditLogEntry, RequestContext};

use crate::{api::AppState, auth::CurrentUser, error::ApiError, routes::parse_workspace_id};

/// POST /api/audit/events - forward a client event into the audit log.
///
/// Identity and request context are stamped server-side; the client only
/// names the action. A full queue drops the event rather than fail the
/// request, reported through `queued`.
pub async fn log_access_event(
	State(state): State<AppState>,
	Extension(current): Extension<CurrentUser>,
	Extension(ctx): Extension<RequestContext>,
	Json(payload): Json<LogAccessEventRequest>,
) -> Result<Json<LogAccessEventResponse>, ApiError> {
	let action = payload.action.trim();
	if action.is_empty() {
		return Err(ApiError(AccessError::InvalidArgument(
			"action must not be empty".to_string(),
		)));
	}

	let workspace_id = payload
		.workspace_id
		.as_deref()
		.map(parse_workspace_id)
		.transpose()?;

	let mut builder = AuditLogEntry::builder(AuditEventType::AccessEvent)
		.actor(current.user.id, current.user.email.clone())
		.action(action)
		.request_context(&ctx);
	if let Some(workspace_id) = workspace_id {
		builder = builder.workspace(workspace_id);
	}
	if payload.entity_type.is_some() || payload.entity_id.is_some() {
		builder = builder.resource(
			payload.entity_type.unwrap_or_default(),
			payload.entity_id.unwrap_or_default(),
		);
	}
	if let Some(details) = payload.details {
		builder = builder.details(details);
	}

	let queued = state.audit_service.log(builder.build());
	Ok(Json(LogAccessEventResponse { queued }))
}
