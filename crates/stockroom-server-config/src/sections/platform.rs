// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform operator configuration.
//!
//! A single configured owner email gates every cross-tenant security
//! operation (access audits, integrity cleanup, membership repair). This is
//! deliberately not a role: workspace admins manage one workspace, the
//! platform owner manages the platform.

use serde::Deserialize;

/// Platform configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct PlatformConfig {
	/// The operator identity, stored lowercased. Compared with exact,
	/// case-insensitive equality only — never substring or domain matching.
	pub owner_email: String,
	/// Maximum distinct workspaces a user may belong to before the access
	/// audit flags them as suspicious.
	pub suspicious_workspace_threshold: usize,
}

impl PlatformConfig {
	/// Default flagging threshold: strictly more than 5 workspaces.
	pub const DEFAULT_SUSPICIOUS_THRESHOLD: usize = 5;
}

/// Platform configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformConfigLayer {
	#[serde(default)]
	pub owner_email: Option<String>,
	#[serde(default)]
	pub suspicious_workspace_threshold: Option<usize>,
}

impl PlatformConfigLayer {
	pub fn merge(&mut self, other: PlatformConfigLayer) {
		if other.owner_email.is_some() {
			self.owner_email = other.owner_email;
		}
		if other.suspicious_workspace_threshold.is_some() {
			self.suspicious_workspace_threshold = other.suspicious_workspace_threshold;
		}
	}

	pub fn finalize(self) -> PlatformConfig {
		PlatformConfig {
			owner_email: self
				.owner_email
				.map(|e| e.trim().to_ascii_lowercase())
				.unwrap_or_default(),
			suspicious_workspace_threshold: self
				.suspicious_workspace_threshold
				.unwrap_or(PlatformConfig::DEFAULT_SUSPICIOUS_THRESHOLD),
		}
	}
}
