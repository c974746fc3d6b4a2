// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer-token authentication middleware.
//!
//! Tokens travel as `Authorization: Bearer <token>` and are stored hashed;
//! the middleware hashes the presented token and looks the session up by
//! hash. In dev mode the `x-dev-user-email` header selects a user directly.
//! Token values are never logged.

use axum::{
	extract::{Request, State},
	http::header::{AUTHORIZATION, REFERER, USER_AGENT},
	http::{HeaderMap, HeaderName, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use sha2::{Digest, Sha256};

use stockroom_server_access::AccessError;
use stockroom_server_api::ErrorResponse;
use stockroom_server_auth::{RequestContext, SessionId, User};

use crate::{api::AppState, error::ApiError};

/// Dev-mode header naming the user to act as. Ignored outside dev mode.
pub const DEV_USER_HEADER: &str = "x-dev-user-email";

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
	pub user: User,
	/// Absent for dev-mode authentication.
	pub session_id: Option<SessionId>,
}

/// Hash a bearer token the way sessions store it.
pub fn hash_token(token: &str) -> String {
	hex::encode(Sha256::digest(token.as_bytes()))
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<String> {
	headers
		.get(name)
		.and_then(|v| v.to_str().ok())
		.map(|v| v.to_string())
}

/// Capture best-effort request context for audit entries.
///
/// `x-forwarded-for` may carry a proxy chain; the first hop is the client.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
	let ip_address = headers
		.get(X_FORWARDED_FOR)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.split(',').next())
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty());

	RequestContext {
		ip_address,
		user_agent: header_str(headers, USER_AGENT),
		referrer: header_str(headers, REFERER),
	}
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|t| !t.is_empty())
}

async fn authenticate(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<Option<CurrentUser>, AccessError> {
	if state.dev_mode {
		if let Some(email) = headers.get(DEV_USER_HEADER).and_then(|v| v.to_str().ok()) {
			let user = state.users.get_user_by_email(email).await?;
			return Ok(user.filter(|u| !u.is_deleted()).map(|user| CurrentUser {
				user,
				session_id: None,
			}));
		}
	}

	let Some(token) = bearer_token(headers) else {
		return Ok(None);
	};

	let hash = hash_token(token);
	let Some(session) = state.sessions.get_session_by_token_hash(&hash).await? else {
		return Ok(None);
	};
	let Some(user) = state.users.get_user_by_id(&session.user_id).await? else {
		return Ok(None);
	};
	// A deleted account keeps no usable session.
	if user.is_deleted() {
		return Ok(None);
	}

	Ok(Some(CurrentUser {
		user,
		session_id: Some(session.id),
	}))
}

/// Middleware guarding the `/api` routes.
///
/// Inserts [`CurrentUser`] and [`RequestContext`] extensions on success;
/// anything else is a 401 with the flat error body.
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> Response {
	let ctx = request_context(request.headers());
	request.extensions_mut().insert(ctx);

	match authenticate(&state, request.headers()).await {
		Ok(Some(current)) => {
			request.extensions_mut().insert(current);
			next.run(request).await
		}
		Ok(None) => (
			StatusCode::UNAUTHORIZED,
			Json(ErrorResponse::new("authentication required")),
		)
			.into_response(),
		Err(e) => ApiError(e).into_response(),
	}
}
