// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, each with a resolved config and a partial layer.

pub mod audit;
pub mod auth;
pub mod database;
pub mod http;
pub mod logging;
pub mod platform;

pub use audit::{AuditConfig, AuditConfigLayer, QueueOverflowPolicy};
pub use auth::{AuthConfig, AuthConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use platform::{PlatformConfig, PlatformConfigLayer};
