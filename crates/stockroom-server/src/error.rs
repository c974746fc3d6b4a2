// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error mapping for access-control failures.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use stockroom_server_access::AccessError;
use stockroom_server_api::ErrorResponse;

/// Wrapper turning an [`AccessError`] into the flat `{"error": ...}` body.
///
/// Server-side failures are logged with their cause and surfaced as a bare
/// "internal error" so storage details never reach the client.
#[derive(Debug)]
pub struct ApiError(pub AccessError);

impl From<AccessError> for ApiError {
	fn from(e: AccessError) -> Self {
		ApiError(e)
	}
}

impl From<stockroom_server_db::DbError> for ApiError {
	fn from(e: stockroom_server_db::DbError) -> Self {
		ApiError(AccessError::from(e))
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = StatusCode::from_u16(self.0.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		let message = if status.is_server_error() {
			tracing::error!(error = %self.0, "request failed");
			"internal error".to_string()
		} else {
			self.0.to_string()
		};

		(status, Json(ErrorResponse::new(message))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forbidden_keeps_its_message() {
		let response = ApiError(AccessError::not_a_member()).into_response();
		assert_eq!(response.status(), StatusCode::FORBIDDEN);
	}

	#[test]
	fn unexpected_is_scrubbed_to_a_500() {
		let response =
			ApiError(AccessError::Unexpected("sqlite said no".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
