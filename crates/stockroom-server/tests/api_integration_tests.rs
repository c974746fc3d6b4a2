// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the HTTP surface.
//!
//! Tests cover:
//! - Bearer-token authentication and session expiry
//! - Membership verification, owner bypass, and denial responses
//! - Owner gating of the admin routes
//! - Dry-run defaults on destructive admin operations
//! - Client access events landing in the audit log

use axum::{
	body::Body,
	http::{header::AUTHORIZATION, Request, StatusCode},
};
use chrono::{Duration, Utc};
use stockroom_server::auth::hash_token;
use stockroom_server::{create_app_state, create_router, AppState};
use stockroom_server_auth::{SessionId, User, WorkspaceRole};
use stockroom_server_config::ServerConfig;
use stockroom_server_db::testing::{
	create_access_test_pool, sample_membership, sample_user, sample_workspace,
};
use stockroom_server_db::AuthSession;
use tower::ServiceExt;

const OWNER_EMAIL: &str = "owner@example.com";

async fn setup() -> (axum::Router, AppState) {
	let pool = create_access_test_pool().await;
	let mut config = ServerConfig::default();
	config.platform.owner_email = OWNER_EMAIL.to_string();
	let state = create_app_state(pool, &config).await;
	(create_router(state.clone()), state)
}

/// Create a user with a live session and return their bearer token.
async fn login(state: &AppState, email: &str) -> (User, String) {
	let user = sample_user(email);
	state.users.create_user(&user).await.unwrap();
	let token = format!("tok_{}", user.id);
	let session = AuthSession {
		id: SessionId::generate(),
		user_id: user.id,
		token_hash: hash_token(&token),
		created_at: Utc::now(),
		expires_at: Utc::now() + Duration::hours(24),
	};
	state.sessions.create_session(&session).await.unwrap();
	(user, token)
}

fn post_json(uri: &str, token: &str, body: &str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.body(Body::empty())
		.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
	let (app, _state) = setup().await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn api_routes_require_a_token() {
	let (app, _state) = setup().await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/workspaces/verify")
				.header("content-type", "application/json")
				.body(Body::from(r#"{"workspace_id": "w"}"#))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	let json = body_json(response).await;
	assert_eq!(json["error"], "authentication required");
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
	let (app, state) = setup().await;
	let user = sample_user("late@example.com");
	state.users.create_user(&user).await.unwrap();
	let session = AuthSession {
		id: SessionId::generate(),
		user_id: user.id,
		token_hash: hash_token("tok_expired"),
		created_at: Utc::now() - Duration::hours(48),
		expires_at: Utc::now() - Duration::hours(24),
	};
	state.sessions.create_session(&session).await.unwrap();

	let response = app
		.oneshot(get_authed("/api/workspaces", "tok_expired"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_rejects_malformed_workspace_id() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;

	let response = app
		.oneshot(post_json(
			"/api/workspaces/verify",
			&token,
			r#"{"workspace_id": "not-a-uuid"}"#,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_denies_without_membership() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;
	let workspace = sample_workspace("acme");
	state.workspaces.create_workspace(&workspace).await.unwrap();

	let response = app
		.oneshot(post_json(
			"/api/workspaces/verify",
			&token,
			&format!(r#"{{"workspace_id": "{}"}}"#, workspace.id),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let json = body_json(response).await;
	assert_eq!(json["error"], "you are not a member of this workspace");
}

#[tokio::test]
async fn verify_grants_membership_role() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;
	let workspace = sample_workspace("acme");
	state.workspaces.create_workspace(&workspace).await.unwrap();
	let membership = sample_membership(&workspace.id, "alice@example.com", WorkspaceRole::Member);
	let pool = state.pool.clone();
	stockroom_server_db::MembershipRepository::new(pool)
		.create_membership(&membership)
		.await
		.unwrap();

	let response = app
		.oneshot(post_json(
			"/api/workspaces/verify",
			&token,
			&format!(r#"{{"workspace_id": "{}"}}"#, workspace.id),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["role"], "member");
	assert_eq!(json["owner_bypass"], false);
	assert_eq!(json["membership_id"], membership.id.to_string());
}

#[tokio::test]
async fn owner_bypasses_membership_lookup() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, OWNER_EMAIL).await;
	let workspace = sample_workspace("acme");
	state.workspaces.create_workspace(&workspace).await.unwrap();

	let response = app
		.oneshot(post_json(
			"/api/workspaces/verify",
			&token,
			&format!(r#"{{"workspace_id": "{}"}}"#, workspace.id),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["role"], "owner");
	assert_eq!(json["owner_bypass"], true);
}

#[tokio::test]
async fn list_workspaces_is_scoped_to_memberships() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;
	let mine = sample_workspace("mine");
	let other = sample_workspace("other");
	state.workspaces.create_workspace(&mine).await.unwrap();
	state.workspaces.create_workspace(&other).await.unwrap();
	let membership = sample_membership(&mine.id, "alice@example.com", WorkspaceRole::Member);
	stockroom_server_db::MembershipRepository::new(state.pool.clone())
		.create_membership(&membership)
		.await
		.unwrap();

	let response = app
		.oneshot(get_authed("/api/workspaces", &token))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["total"], 1);
	assert_eq!(json["workspaces"][0]["slug"], "mine");
}

#[tokio::test]
async fn admin_routes_refuse_non_owner() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;

	let response = app
		.oneshot(post_json("/api/admin/memberships/cleanup", &token, "{}"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let json = body_json(response).await;
	assert_eq!(json["error"], "this operation requires the platform owner");
}

#[tokio::test]
async fn platform_admin_flag_does_not_open_admin_routes() {
	let (app, state) = setup().await;
	let mut user = sample_user("admin@example.com");
	user.is_platform_admin = true;
	state.users.create_user(&user).await.unwrap();
	let token = "tok_admin".to_string();
	let session = AuthSession {
		id: SessionId::generate(),
		user_id: user.id,
		token_hash: hash_token(&token),
		created_at: Utc::now(),
		expires_at: Utc::now() + Duration::hours(24),
	};
	state.sessions.create_session(&session).await.unwrap();

	let response = app
		.oneshot(get_authed("/api/admin/audit-logs", &token))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cleanup_defaults_to_dry_run() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, OWNER_EMAIL).await;

	let response = app
		.oneshot(post_json("/api/admin/memberships/cleanup", &token, "{}"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["dry_run"], true);
}

#[tokio::test]
async fn remove_requires_emails() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, OWNER_EMAIL).await;
	let workspace = sample_workspace("acme");
	state.workspaces.create_workspace(&workspace).await.unwrap();

	let response = app
		.oneshot(post_json(
			"/api/admin/memberships/remove",
			&token,
			&format!(r#"{{"workspace_id": "{}", "emails": []}}"#, workspace.id),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn access_event_lands_in_the_audit_log() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;

	let response = app
		.oneshot(post_json(
			"/api/audit/events",
			&token,
			r#"{"action": "viewed orders", "details": {"page": 2}}"#,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["queued"], true);

	// The pipeline delivers asynchronously.
	tokio::time::sleep(std::time::Duration::from_millis(50)).await;
	let count = state
		.audit_logs
		.count_by_event_type("access_event")
		.await
		.unwrap();
	assert_eq!(count, 1);
}

#[tokio::test]
async fn access_event_carries_the_entity_reference() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, "alice@example.com").await;

	let response = app
		.oneshot(post_json(
			"/api/audit/events",
			&token,
			r#"{"action": "exported orders", "entity_type": "order", "entity_id": "ord_42"}"#,
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	tokio::time::sleep(std::time::Duration::from_millis(50)).await;
	let (logs, total) = state
		.audit_logs
		.list_audit_logs(&stockroom_server_db::AuditLogQuery {
			event_type: Some("access_event".to_string()),
			workspace_id: None,
			limit: 10,
			offset: 0,
		})
		.await
		.unwrap();
	assert_eq!(total, 1);
	assert_eq!(logs[0].resource_type.as_deref(), Some("order"));
	assert_eq!(logs[0].resource_id.as_deref(), Some("ord_42"));
}

#[tokio::test]
async fn owner_can_page_the_audit_log() {
	let (app, state) = setup().await;
	let (_, token) = login(&state, OWNER_EMAIL).await;

	let response = app
		.clone()
		.oneshot(post_json(
			"/api/audit/events",
			&token,
			r#"{"action": "checked stock levels"}"#,
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	tokio::time::sleep(std::time::Duration::from_millis(50)).await;

	let response = app
		.oneshot(get_authed(
			"/api/admin/audit-logs?event_type=access_event&limit=10",
			&token,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["total"], 1);
	assert_eq!(json["logs"][0]["event_type"], "access_event");
	assert_eq!(json["logs"][0]["actor_email"], OWNER_EMAIL);
}
