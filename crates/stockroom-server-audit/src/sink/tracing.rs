// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use stockroom_server_auth::AuditLogEntry;

use crate::error::AuditSinkError;
use crate::sink::AuditSink;

/// Emits audit events as structured tracing events.
///
/// Used in development and as a secondary sink so events remain visible in
/// logs even if database writes fail.
pub struct TracingAuditSink {
	name: String,
}

impl TracingAuditSink {
	pub fn new() -> Self {
		Self {
			name: "tracing".to_string(),
		}
	}
}

impl Default for TracingAuditSink {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		&self.name
	}

	async fn publish(&self, event: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		tracing::info!(
			target: "audit",
			event_id = %event.id,
			event_type = %event.event_type,
			workspace_id = event.workspace_id.map(|w| w.to_string()),
			actor_email = event.actor_email.as_deref(),
			action = %event.action,
			details = %event.details,
			"audit event"
		);
		Ok(())
	}
}
