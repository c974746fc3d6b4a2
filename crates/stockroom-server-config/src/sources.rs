// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources and precedence.
//!
//! Two sources are supported: built-in defaults and environment variables
//! (`STOCKROOM_SERVER_*`). Environment wins.

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuditConfigLayer, AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	PlatformConfigLayer, QueueOverflowPolicy,
};

/// Source precedence, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults,
	Environment,
}

/// A configuration source producing a partial layer.
pub trait ConfigSource {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults: an empty layer, so section defaults apply at finalize.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// Environment variable source (`STOCKROOM_SERVER_*`).
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()),
			auth: Some(load_auth_from_env()?),
			platform: Some(load_platform_from_env()?),
			audit: Some(load_audit_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
	T::Err: std::fmt::Display,
{
	match env_var(name) {
		Some(raw) => raw
			.parse::<T>()
			.map(Some)
			.map_err(|e| ConfigError::InvalidValue {
				var: name.to_string(),
				message: e.to_string(),
			}),
		None => Ok(None),
	}
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(name) {
		Some(raw) => match raw.as_str() {
			"1" | "true" | "yes" => Ok(Some(true)),
			"0" | "false" | "no" => Ok(Some(false)),
			other => Err(ConfigError::InvalidValue {
				var: name.to_string(),
				message: format!("expected boolean, got {other:?}"),
			}),
		},
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("STOCKROOM_SERVER_HTTP_HOST"),
		port: env_parse("STOCKROOM_SERVER_HTTP_PORT")?,
	})
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("STOCKROOM_SERVER_DATABASE_URL"),
	}
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		dev_mode: env_bool("STOCKROOM_SERVER_AUTH_DEV_MODE")?,
		environment: env_var("STOCKROOM_SERVER_ENV"),
		session_ttl_hours: env_parse("STOCKROOM_SERVER_AUTH_SESSION_TTL_HOURS")?,
	})
}

fn load_platform_from_env() -> Result<PlatformConfigLayer, ConfigError> {
	Ok(PlatformConfigLayer {
		owner_email: env_var("STOCKROOM_SERVER_PLATFORM_OWNER_EMAIL"),
		suspicious_workspace_threshold: env_parse("STOCKROOM_SERVER_PLATFORM_SUSPICIOUS_THRESHOLD")?,
	})
}

fn load_audit_from_env() -> Result<AuditConfigLayer, ConfigError> {
	let queue_overflow_policy = match env_var("STOCKROOM_SERVER_AUDIT_OVERFLOW_POLICY").as_deref() {
		Some("drop_newest") => Some(QueueOverflowPolicy::DropNewest),
		Some("block") => Some(QueueOverflowPolicy::Block),
		Some(other) => {
			return Err(ConfigError::InvalidValue {
				var: "STOCKROOM_SERVER_AUDIT_OVERFLOW_POLICY".to_string(),
				message: format!("expected drop_newest or block, got {other:?}"),
			})
		}
		None => None,
	};

	Ok(AuditConfigLayer {
		enabled: env_bool("STOCKROOM_SERVER_AUDIT_ENABLED")?,
		queue_capacity: env_parse("STOCKROOM_SERVER_AUDIT_QUEUE_CAPACITY")?,
		queue_overflow_policy,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		filter: env_var("STOCKROOM_SERVER_LOG_FILTER"),
		json: env_var("STOCKROOM_SERVER_LOG_JSON").map(|v| v == "1" || v == "true"),
	}
}
