// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// A client-reported access event forwarded into the audit log.
///
/// The server stamps identity and request context; clients only supply what
/// happened. Stored under the `access_event` type regardless of the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogAccessEventRequest {
	pub workspace_id: Option<String>,
	pub action: String,
	/// Entity the event concerns, e.g. `"order"` / an order id. Both parts
	/// are optional but stored together.
	#[serde(default)]
	pub entity_type: Option<String>,
	#[serde(default)]
	pub entity_id: Option<String>,
	#[serde(default)]
	pub details: Option<serde_json::Value>,
}

/// Acknowledgement for a logged event.
///
/// `queued` is best-effort: a full audit queue drops the event without
/// failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogAccessEventResponse {
	pub queued: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn details_are_optional() {
		let req: LogAccessEventRequest =
			serde_json::from_str(r#"{"action": "viewed orders"}"#).unwrap();
		assert_eq!(req.action, "viewed orders");
		assert!(req.details.is_none());
		assert!(req.workspace_id.is_none());
		assert!(req.entity_type.is_none());
		assert!(req.entity_id.is_none());
	}

	#[test]
	fn entity_fields_deserialize() {
		let req: LogAccessEventRequest = serde_json::from_str(
			r#"{"action": "exported orders", "entity_type": "order", "entity_id": "ord_42"}"#,
		)
		.unwrap();
		assert_eq!(req.entity_type.as_deref(), Some("order"));
		assert_eq!(req.entity_id.as_deref(), Some("ord_42"));
	}
}
