// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication behavior configuration.

use serde::Deserialize;

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Bypass bearer-token authentication. Development only; refused in
	/// production by [`crate::load_config_from_env`] validation.
	pub dev_mode: bool,
	/// Deployment environment name ("development", "staging", "production").
	pub environment: String,
	/// Session lifetime in hours.
	pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			environment: "development".to_string(),
			session_ttl_hours: 24 * 30,
		}
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub session_ttl_hours: Option<i64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(defaults.dev_mode),
			environment: self.environment.unwrap_or(defaults.environment),
			session_ttl_hours: self.session_ttl_hours.unwrap_or(defaults.session_ttl_hours),
		}
	}
}
