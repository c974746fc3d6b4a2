// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Asynchronous audit pipeline.
//!
//! Events are queued on a bounded channel and fanned out to sinks by a
//! background task. Logging never fails the caller.

pub mod error;
pub mod pipeline;
pub mod sink;

pub use error::{AuditError, AuditResult, AuditSinkError};
pub use pipeline::AuditService;
pub use sink::sqlite::SqliteAuditSink;
pub use sink::tracing::TracingAuditSink;
pub use sink::AuditSink;

pub use stockroom_server_config::QueueOverflowPolicy;
