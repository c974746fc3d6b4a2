// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the Stockroom server HTTP API.
//!
//! Requests and responses only; no handlers here. Failure bodies are always
//! the flat [`ErrorResponse`].

pub mod admin;
pub mod events;
pub mod workspaces;

use serde::{Deserialize, Serialize};

/// The only failure body shape the API produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>) -> Self {
		Self {
			error: error.into(),
		}
	}
}

/// Health probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
}

pub use admin::{
	AccessAuditParams, AccessAuditResponse, AuditLogEntryResponse, CleanupCategoryResponse,
	CleanupRequest, CleanupResponse, FlaggedMembershipResponse, ListAuditLogsParams,
	ListAuditLogsResponse, RemoveMembershipsRequest, RemoveMembershipsResponse,
	RosterEntryResponse, SuspiciousUserResponse, WorkspaceRosterResponse,
};
pub use events::{LogAccessEventRequest, LogAccessEventResponse};
pub use workspaces::{
	ListWorkspacesResponse, VerifyAccessRequest, VerifyAccessResponse, WorkspaceResponse,
};
