// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid value for {var}: {message}")]
	InvalidValue { var: String, message: String },

	#[error("Missing required configuration: {0}")]
	Missing(String),

	#[error("Validation error: {0}")]
	Validation(String),
}
