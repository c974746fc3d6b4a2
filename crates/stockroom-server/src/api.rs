// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use sqlx::SqlitePool;

use stockroom_server_access::{
	AccessResolver, IntegrityAuditor, OwnerGate, RepairTools, SessionManager,
};
use stockroom_server_audit::{AuditService, AuditSink, SqliteAuditSink, TracingAuditSink};
use stockroom_server_config::ServerConfig;
use stockroom_server_db::{
	AuditLogRepository, MembershipRepository, ModuleSettingsRepository, SelectionRepository,
	SessionRepository, UserRepository, WorkspaceRepository,
};

use crate::{auth, routes};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub users: Arc<UserRepository>,
	pub sessions: Arc<SessionRepository>,
	pub workspaces: Arc<WorkspaceRepository>,
	pub audit_logs: Arc<AuditLogRepository>,
	pub audit_service: Arc<AuditService>,
	pub resolver: Arc<AccessResolver>,
	pub session_manager: Arc<SessionManager>,
	pub integrity: Arc<IntegrityAuditor>,
	pub repair: Arc<RepairTools>,
	pub owner_gate: OwnerGate,
	pub dev_mode: bool,
}

/// Creates the application state, wiring repositories, the audit pipeline,
/// and the access-control services.
pub async fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let users = Arc::new(UserRepository::new(pool.clone()));
	let sessions = Arc::new(SessionRepository::new(pool.clone()));
	let workspaces = Arc::new(WorkspaceRepository::new(pool.clone()));
	let memberships = Arc::new(MembershipRepository::new(pool.clone()));
	let selections = Arc::new(SelectionRepository::new(pool.clone()));
	let modules = Arc::new(ModuleSettingsRepository::new(pool.clone()));
	let audit_logs = Arc::new(AuditLogRepository::new(pool.clone()));

	let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();
	if config.audit.enabled {
		sinks.push(Arc::new(SqliteAuditSink::new(pool.clone())));
		sinks.push(Arc::new(TracingAuditSink::new()));
	}
	let audit_service = Arc::new(AuditService::new(
		config.audit.queue_capacity,
		config.audit.queue_overflow_policy,
		sinks,
	));

	let owner_gate = OwnerGate::new(&config.platform);

	let resolver = Arc::new(AccessResolver::new(
		workspaces.clone(),
		memberships.clone(),
		audit_service.clone(),
		owner_gate.clone(),
	));
	let session_manager = Arc::new(SessionManager::new(
		workspaces.clone(),
		memberships.clone(),
		selections,
		modules,
		audit_service.clone(),
		owner_gate.clone(),
	));
	let integrity = Arc::new(IntegrityAuditor::new(
		workspaces.clone(),
		memberships.clone(),
		audit_service.clone(),
		owner_gate.clone(),
		config.platform.suspicious_workspace_threshold,
	));
	let repair = Arc::new(RepairTools::new(
		memberships,
		audit_service.clone(),
		owner_gate.clone(),
	));

	AppState {
		pool,
		users,
		sessions,
		workspaces,
		audit_logs,
		audit_service,
		resolver,
		session_manager,
		integrity,
		repair,
		owner_gate,
		dev_mode: config.auth.dev_mode,
	}
}

/// Creates the router. Everything under `/api` requires authentication.
pub fn create_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/workspaces/verify", post(routes::workspaces::verify_access))
		.route("/workspaces", get(routes::workspaces::list_workspaces))
		.route("/audit/events", post(routes::events::log_access_event))
		.route(
			"/admin/workspaces/access-audit",
			get(routes::admin::access_audit),
		)
		.route(
			"/admin/memberships/cleanup",
			post(routes::admin::cleanup_memberships),
		)
		.route(
			"/admin/memberships/remove",
			post(routes::admin::remove_memberships),
		)
		.route("/admin/audit-logs", get(routes::admin::list_audit_logs))
		.layer(middleware::from_fn_with_state(
			state.clone(),
			auth::auth_layer,
		));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.nest("/api", api_routes)
		.with_state(state)
}
