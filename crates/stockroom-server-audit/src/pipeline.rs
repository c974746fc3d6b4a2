// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The audit pipeline.
//!
//! Callers hand events to [`AuditService::log`], which enqueues and returns
//! immediately. A background task drains the queue and fans each event out
//! to every configured sink. Sink failures are logged and never surfaced to
//! the caller; authorization decisions must not depend on audit delivery.

use std::sync::Arc;

use stockroom_server_auth::AuditLogEntry;
use stockroom_server_config::QueueOverflowPolicy;
use tokio::sync::mpsc;
use tracing::{instrument, warn};

use crate::error::{AuditError, AuditResult};
use crate::sink::AuditSink;

pub struct AuditService {
	tx: mpsc::Sender<AuditLogEntry>,
	overflow_policy: QueueOverflowPolicy,
}

impl AuditService {
	pub fn new(
		queue_capacity: usize,
		overflow_policy: QueueOverflowPolicy,
		sinks: Vec<Arc<dyn AuditSink>>,
	) -> Self {
		let (tx, rx) = mpsc::channel(queue_capacity);

		tokio::spawn(Self::background_task(rx, sinks));

		Self {
			tx,
			overflow_policy,
		}
	}

	async fn background_task(mut rx: mpsc::Receiver<AuditLogEntry>, sinks: Vec<Arc<dyn AuditSink>>) {
		while let Some(entry) = rx.recv().await {
			let event = Arc::new(entry);

			for sink in &sinks {
				let sink = Arc::clone(sink);
				let event = Arc::clone(&event);

				tokio::spawn(async move {
					if let Err(e) = sink.publish(event).await {
						warn!(sink = sink.name(), error = %e, "audit sink publish failed");
					}
				});
			}
		}
	}

	/// Log an audit event to the queue for processing.
	///
	/// Returns `true` if the event was queued, `false` if dropped.
	///
	/// With `Block`, the send is spawned so the caller still does not wait;
	/// with `DropNewest`, a full queue drops the new event.
	#[instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub fn log(&self, entry: AuditLogEntry) -> bool {
		match self.overflow_policy {
			QueueOverflowPolicy::Block => {
				let tx = self.tx.clone();
				tokio::spawn(async move {
					let _ = tx.send(entry).await;
				});
				true
			}
			QueueOverflowPolicy::DropNewest => self.tx.try_send(entry).is_ok(),
		}
	}

	/// Enqueue an event, waiting for queue space. Used at shutdown and in
	/// tests where delivery must not race the assertion.
	pub async fn log_blocking(&self, entry: AuditLogEntry) -> AuditResult<()> {
		self.tx.send(entry).await.map_err(|_| AuditError::Shutdown)
	}
}
