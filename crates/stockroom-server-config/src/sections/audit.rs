// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_QUEUE_CAPACITY: usize = 10000;

/// What to do when the audit queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflowPolicy {
	/// Drop the event being logged.
	#[default]
	DropNewest,
	/// Spawn a task that waits for capacity.
	Block,
}

/// Audit configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuditConfig {
	pub enabled: bool,
	pub queue_capacity: usize,
	pub queue_overflow_policy: QueueOverflowPolicy,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
			queue_overflow_policy: QueueOverflowPolicy::default(),
		}
	}
}

/// Audit configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub queue_capacity: Option<usize>,
	#[serde(default)]
	pub queue_overflow_policy: Option<QueueOverflowPolicy>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: AuditConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.queue_overflow_policy.is_some() {
			self.queue_overflow_policy = other.queue_overflow_policy;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		let defaults = AuditConfig::default();
		AuditConfig {
			enabled: self.enabled.unwrap_or(defaults.enabled),
			queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
			queue_overflow_policy: self
				.queue_overflow_policy
				.unwrap_or(defaults.queue_overflow_policy),
		}
	}
}
