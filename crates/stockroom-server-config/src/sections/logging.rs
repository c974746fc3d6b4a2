// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use serde::Deserialize;

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Default tracing filter directive (overridden by `RUST_LOG`).
	pub filter: String,
	/// Emit JSON-formatted logs.
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			filter: "info".to_string(),
			json: false,
		}
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub filter: Option<String>,
	#[serde(default)]
	pub json: Option<bool>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.filter.is_some() {
			self.filter = other.filter;
		}
		if other.json.is_some() {
			self.json = other.json;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		let defaults = LoggingConfig::default();
		LoggingConfig {
			filter: self.filter.unwrap_or(defaults.filter),
			json: self.json.unwrap_or(defaults.json),
		}
	}
}
