// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit event model for workspace security decisions.
//!
//! Every authorize/deny decision, blocked switch, revocation, and integrity
//! scan produces one [`AuditLogEntry`]. Entries are append-only: nothing in
//! the server updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{UserId, WorkspaceId};

/// Retention period for audit logs in days.
pub const AUDIT_RETENTION_DAYS: i64 = 90;

/// Types of workspace security events recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	/// Membership verification succeeded.
	WorkspaceAccessGranted,
	/// Membership verification failed (no membership).
	WorkspaceAccessDenied,
	/// A stored workspace selection failed re-validation and was cleared.
	WorkspaceAccessBlocked,
	/// A membership was forcibly removed by the repair tools.
	WorkspaceAccessRevoked,
	/// A workspace switch was refused for lack of membership.
	WorkspaceSwitchBlocked,
	/// A code path attempted implicit workspace/membership provisioning.
	WorkspaceAutoCreateBlocked,
	/// Summary of a targeted membership repair run.
	WorkspaceMembershipRepair,
	/// A cross-tenant access audit report was produced.
	WorkspaceAccessAudit,
	/// Summary of an integrity cleanup scan (invalid + duplicate records).
	MembershipCleanup,
	/// The platform owner bypassed membership lookup.
	AppOwnerAccess,
	/// A client-reported access event forwarded through the log endpoint.
	AccessEvent,
}

impl std::fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			AuditEventType::WorkspaceAccessGranted => "workspace_access_granted",
			AuditEventType::WorkspaceAccessDenied => "workspace_access_denied",
			AuditEventType::WorkspaceAccessBlocked => "workspace_access_blocked",
			AuditEventType::WorkspaceAccessRevoked => "workspace_access_revoked",
			AuditEventType::WorkspaceSwitchBlocked => "workspace_switch_blocked",
			AuditEventType::WorkspaceAutoCreateBlocked => "workspace_auto_create_blocked",
			AuditEventType::WorkspaceMembershipRepair => "workspace_membership_repair",
			AuditEventType::WorkspaceAccessAudit => "workspace_access_audit",
			AuditEventType::MembershipCleanup => "membership_cleanup",
			AuditEventType::AppOwnerAccess => "app_owner_access",
			AuditEventType::AccessEvent => "access_event",
		};
		write!(f, "{s}")
	}
}

/// Request-scoped context captured on access decisions.
///
/// All fields are best-effort: absent when the transport does not supply
/// them. Never used for authorization, only recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
	/// IP address of the request origin.
	pub ip_address: Option<String>,
	/// User agent string from the request.
	pub user_agent: Option<String>,
	/// Referrer header, when present.
	pub referrer: Option<String>,
}

/// An entry in the audit log recording a workspace security event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
	/// Unique identifier for this audit entry.
	pub id: Uuid,
	/// When the event occurred.
	pub timestamp: DateTime<Utc>,
	/// The type of event.
	pub event_type: AuditEventType,
	/// The workspace involved; `None` for cross-tenant events.
	pub workspace_id: Option<WorkspaceId>,
	/// The user the event concerns (if known).
	pub actor_user_id: Option<UserId>,
	/// The acting user's email (comparison key form).
	pub actor_email: Option<String>,
	/// The type of resource affected (e.g., "membership", "workspace").
	pub resource_type: Option<String>,
	/// The ID of the resource affected.
	pub resource_id: Option<String>,
	/// Human-readable description of the action.
	pub action: String,
	/// IP address of the request origin.
	pub ip_address: Option<String>,
	/// User agent string from the request.
	pub user_agent: Option<String>,
	/// Additional event-specific details (reason codes, counts).
	pub details: serde_json::Value,
}

impl AuditLogEntry {
	/// Create a new audit log builder for the given event type.
	pub fn builder(event_type: AuditEventType) -> AuditLogBuilder {
		AuditLogBuilder::new(event_type)
	}
}

/// Builder for constructing audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
	event_type: AuditEventType,
	workspace_id: Option<WorkspaceId>,
	actor_user_id: Option<UserId>,
	actor_email: Option<String>,
	resource_type: Option<String>,
	resource_id: Option<String>,
	action: Option<String>,
	ip_address: Option<String>,
	user_agent: Option<String>,
	details: serde_json::Value,
}

impl AuditLogBuilder {
	/// Create a new builder for the given event type.
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			workspace_id: None,
			actor_user_id: None,
			actor_email: None,
			resource_type: None,
			resource_id: None,
			action: None,
			ip_address: None,
			user_agent: None,
			details: serde_json::Value::Null,
		}
	}

	/// Set the workspace the event concerns.
	pub fn workspace(mut self, workspace_id: WorkspaceId) -> Self {
		self.workspace_id = Some(workspace_id);
		self
	}

	/// Set the acting user's id and email.
	pub fn actor(mut self, user_id: UserId, email: impl Into<String>) -> Self {
		self.actor_user_id = Some(user_id);
		self.actor_email = Some(email.into());
		self
	}

	/// Set the acting user's email only (id unknown, e.g. denied lookups).
	pub fn actor_email(mut self, email: impl Into<String>) -> Self {
		self.actor_email = Some(email.into());
		self
	}

	/// Set the resource type and ID affected by this event.
	pub fn resource(
		mut self,
		resource_type: impl Into<String>,
		resource_id: impl Into<String>,
	) -> Self {
		self.resource_type = Some(resource_type.into());
		self.resource_id = Some(resource_id.into());
		self
	}

	/// Set the human-readable action description.
	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	/// Attach request context (ip, user agent; referrer goes to details).
	pub fn request_context(mut self, ctx: &RequestContext) -> Self {
		self.ip_address = ctx.ip_address.clone();
		self.user_agent = ctx.user_agent.clone();
		if let Some(ref referrer) = ctx.referrer {
			if let serde_json::Value::Object(ref mut map) = self.details {
				map.insert(
					"referrer".to_string(),
					serde_json::Value::String(referrer.clone()),
				);
			} else if self.details.is_null() {
				self.details = serde_json::json!({ "referrer": referrer });
			}
		}
		self
	}

	/// Set additional event-specific details.
	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	/// Build the audit log entry.
	pub fn build(self) -> AuditLogEntry {
		AuditLogEntry {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			workspace_id: self.workspace_id,
			actor_user_id: self.actor_user_id,
			actor_email: self.actor_email,
			resource_type: self.resource_type,
			resource_id: self.resource_id,
			action: self.action.unwrap_or_else(|| self.event_type.to_string()),
			ip_address: self.ip_address,
			user_agent: self.user_agent,
			details: self.details,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod audit_event_type {
		use super::*;

		#[test]
		fn display_returns_snake_case() {
			assert_eq!(
				AuditEventType::WorkspaceAccessDenied.to_string(),
				"workspace_access_denied"
			);
			assert_eq!(
				AuditEventType::WorkspaceAutoCreateBlocked.to_string(),
				"workspace_auto_create_blocked"
			);
			assert_eq!(AuditEventType::AppOwnerAccess.to_string(), "app_owner_access");
		}

		#[test]
		fn all_event_types_serialize_deserialize() {
			let events = [
				AuditEventType::WorkspaceAccessGranted,
				AuditEventType::WorkspaceAccessDenied,
				AuditEventType::WorkspaceAccessBlocked,
				AuditEventType::WorkspaceAccessRevoked,
				AuditEventType::WorkspaceSwitchBlocked,
				AuditEventType::WorkspaceAutoCreateBlocked,
				AuditEventType::WorkspaceMembershipRepair,
				AuditEventType::WorkspaceAccessAudit,
				AuditEventType::MembershipCleanup,
				AuditEventType::AppOwnerAccess,
				AuditEventType::AccessEvent,
			];

			for event in events {
				let json = serde_json::to_string(&event).unwrap();
				let roundtrip: AuditEventType = serde_json::from_str(&json).unwrap();
				assert_eq!(event, roundtrip);
				assert_eq!(json, format!("\"{event}\""));
			}
		}
	}

	mod audit_log_builder {
		use super::*;
		use serde_json::json;

		#[test]
		fn builds_minimal_entry() {
			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessGranted).build();

			assert_eq!(entry.event_type, AuditEventType::WorkspaceAccessGranted);
			assert!(entry.workspace_id.is_none());
			assert!(entry.actor_user_id.is_none());
			assert_eq!(entry.action, "workspace_access_granted");
			assert_eq!(entry.details, serde_json::Value::Null);
		}

		#[test]
		fn builds_full_entry() {
			let workspace_id = WorkspaceId::generate();
			let user_id = UserId::generate();

			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessDenied)
				.workspace(workspace_id)
				.actor(user_id, "buyer@example.com")
				.resource("membership", "none")
				.action("Denied access: no membership")
				.details(json!({"reason": "no_membership"}))
				.build();

			assert_eq!(entry.workspace_id, Some(workspace_id));
			assert_eq!(entry.actor_user_id, Some(user_id));
			assert_eq!(entry.actor_email.as_deref(), Some("buyer@example.com"));
			assert_eq!(entry.details["reason"], "no_membership");
		}

		#[test]
		fn request_context_captures_ip_ua_and_referrer() {
			let ctx = RequestContext {
				ip_address: Some("10.0.0.1".to_string()),
				user_agent: Some("Mozilla/5.0".to_string()),
				referrer: Some("https://app.example.com/orders".to_string()),
			};

			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessDenied)
				.request_context(&ctx)
				.build();

			assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
			assert_eq!(entry.user_agent.as_deref(), Some("Mozilla/5.0"));
			assert_eq!(entry.details["referrer"], "https://app.example.com/orders");
		}

		#[test]
		fn request_context_merges_into_existing_details() {
			let ctx = RequestContext {
				ip_address: None,
				user_agent: None,
				referrer: Some("https://app.example.com".to_string()),
			};

			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessDenied)
				.details(serde_json::json!({"reason": "no_membership"}))
				.request_context(&ctx)
				.build();

			assert_eq!(entry.details["reason"], "no_membership");
			assert_eq!(entry.details["referrer"], "https://app.example.com");
		}

		#[test]
		fn generates_unique_ids() {
			let entry1 = AuditLogBuilder::new(AuditEventType::AccessEvent).build();
			let entry2 = AuditLogBuilder::new(AuditEventType::AccessEvent).build();
			assert_ne!(entry1.id, entry2.id);
		}

		#[test]
		fn custom_action_overrides_default() {
			let entry = AuditLogBuilder::new(AuditEventType::WorkspaceAccessRevoked)
				.action("Removed unexpected membership")
				.build();
			assert_eq!(entry.action, "Removed unexpected membership");
		}
	}

	mod constants {
		use super::*;

		#[test]
		fn retention_days_is_90() {
			assert_eq!(AUDIT_RETENTION_DAYS, 90);
		}
	}
}
