// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Stockroom server.
//!
//! Each area exposes a `*Store` trait plus a concrete `*Repository` backed
//! by a shared [`sqlx::SqlitePool`]. Consumers hold `Arc<dyn Store>` so the
//! access core can be tested against in-memory databases.

pub mod audit_log;
pub mod error;
pub mod membership;
pub mod modules;
pub mod pool;
pub mod schema;
pub mod selection;
pub mod session;
pub mod testing;
pub mod user;
pub mod workspace;

pub use audit_log::{AuditLogQuery, AuditLogRepository, AuditLogStore, StoredAuditLog};
pub use error::{DbError, Result};
pub use membership::{MembershipRepository, MembershipStore};
pub use modules::{ModuleSettingsRepository, ModuleSettingsStore};
pub use pool::create_pool;
pub use schema::ensure_schema;
pub use selection::{SelectionRepository, SelectionStore};
pub use session::{AuthSession, SessionRepository, SessionStore};
pub use user::{UserRepository, UserStore};
pub use workspace::{WorkspaceRepository, WorkspaceStore};
