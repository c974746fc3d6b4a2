// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health probe.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use stockroom_server_api::HealthResponse;

use crate::api::AppState;

/// GET /health - liveness probe backed by a database round trip.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => (
			StatusCode::OK,
			Json(HealthResponse {
				status: "ok".to_string(),
			}),
		),
		Err(e) => {
			tracing::error!(error = %e, "health check database probe failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(HealthResponse {
					status: "degraded".to_string(),
				}),
			)
		}
	}
}
