// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace access-control core.
//!
//! Four services built on the store traits from `stockroom-server-db`:
//!
//! - [`AccessResolver`]: the per-request membership verification path
//! - [`SessionManager`]: workspace selection, switching, and session helpers
//! - [`IntegrityAuditor`]: invalid-reference and duplicate reconciliation
//! - [`RepairTools`]: targeted membership removal
//!
//! All admin operations pass the [`OwnerGate`]; every security decision
//! feeds the audit pipeline without ever depending on it.

pub mod error;
pub mod integrity;
pub mod owner;
pub mod repair;
pub mod resolver;
pub mod session;

pub use error::{AccessError, Result};
pub use integrity::{
	AccessAuditReport, CleanupCategory, CleanupOptions, CleanupReport, IntegrityAuditor,
	MembershipRecord, RosterEntry, SuspiciousUser, WorkspaceRoster,
};
pub use owner::OwnerGate;
pub use repair::{RemoveMembershipsOptions, RepairReport, RepairTools};
pub use resolver::{AccessDecision, AccessResolver};
pub use session::{SessionManager, SessionState, WorkspaceSession};
