// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Stockroom server.
//!
//! This crate provides:
//! - Layered configuration from defaults and environment variables
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`STOCKROOM_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use stockroom_server_config::load_config_from_env;
//!
//! let config = load_config_from_env()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub platform: PlatformConfig,
	pub audit: AuditConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults and environment with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`STOCKROOM_SERVER_*`)
/// 2. Built-in defaults
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource), Box::new(EnvSource)];

	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let platform = layer.platform.unwrap_or_default().finalize();
	let audit = layer.audit.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth, &platform)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		audit_enabled = audit.enabled,
		owner_configured = !platform.owner_email.is_empty(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		platform,
		audit,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, platform: &PlatformConfig) -> Result<(), ConfigError> {
	if auth.dev_mode && auth.environment == "production" {
		return Err(ConfigError::Validation(
			"STOCKROOM_SERVER_AUTH_DEV_MODE=1 is set while STOCKROOM_SERVER_ENV=production. \
			 This is a security risk. Remove STOCKROOM_SERVER_AUTH_DEV_MODE or set \
			 STOCKROOM_SERVER_ENV to a non-production value."
				.to_string(),
		));
	}

	if !platform.owner_email.is_empty() && !platform.owner_email.contains('@') {
		return Err(ConfigError::Validation(format!(
			"STOCKROOM_SERVER_PLATFORM_OWNER_EMAIL {:?} is not an email address",
			platform.owner_email
		)));
	}

	Ok(())
}
