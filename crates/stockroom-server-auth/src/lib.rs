// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity, workspace, and membership types for the Stockroom server.
//!
//! This crate defines the domain model shared by the access-control core
//! and the persistence layer:
//!
//! - **ID newtypes**: type-safe UUID wrappers ([`UserId`], [`WorkspaceId`],
//!   [`MembershipId`], [`SessionId`])
//! - **Roles and permissions**: [`WorkspaceRole`] and the per-module
//!   [`PermissionSet`] carried on a [`Membership`]
//! - **Entities**: [`User`], [`Workspace`], [`Membership`]
//! - **Audit model**: [`AuditEventType`], [`AuditLogEntry`] and its builder,
//!   plus the [`RequestContext`] captured on security decisions

pub mod audit;
pub mod types;
pub mod user;
pub mod workspace;

pub use audit::{
	AuditEventType, AuditLogBuilder, AuditLogEntry, RequestContext, AUDIT_RETENTION_DAYS,
};
pub use types::{AccountStatus, MembershipId, SessionId, UserId, WorkspaceId, WorkspaceRole};
pub use user::User;
pub use workspace::{Membership, MemberMgmtPermissions, ModulePermissions, PermissionSet, Workspace};
