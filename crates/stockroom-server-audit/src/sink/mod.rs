// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod sqlite;
pub mod tracing;

use std::sync::Arc;

use async_trait::async_trait;
use stockroom_server_auth::AuditLogEntry;

pub use crate::error::AuditSinkError;

/// Destination for audit events.
///
/// Sinks receive events from the pipeline's background task; a failing sink
/// must never block or fail the caller that logged the event.
#[async_trait]
pub trait AuditSink: Send + Sync {
	fn name(&self) -> &str;

	async fn publish(&self, event: Arc<AuditLogEntry>) -> Result<(), AuditSinkError>;

	async fn health_check(&self) -> Result<(), AuditSinkError> {
		Ok(())
	}
}
