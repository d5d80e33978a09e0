//! Policy data model and evaluation.
//!
//! Two rule families gate a tool-augmented conversation: trusted-data
//! policies classify a tool's *output* (trusted, untrusted, or blocked)
//! and invocation policies gate the next tool *call* given the
//! conversation's trust state. Both share the same operator vocabulary and
//! the same attribute-path addressing into semi-structured payloads.
//!
//! Policies are owned by the embedding application; the engine reads a
//! consistent snapshot per evaluation and never mutates them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod condition;
mod invocation;
mod path;
mod trusted_data;

pub use condition::condition_matches;
pub use invocation::authorize;
pub use path::AttributePath;
pub use trusted_data::classify;

/// Comparison operator shared by both policy families.
///
/// A closed set: evaluation is an exhaustive match, so adding a variant is
/// a compile-time event rather than a silent runtime fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Regex,
}

/// What a matching trusted-data policy does to the tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustAction {
    /// Any matching value blocks the whole output, before trust policies.
    BlockAlways,
    /// All extracted values must match for the output to count as trusted.
    MarkAsTrusted,
}

/// What a matching invocation policy does to the tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationAction {
    /// Deny the call regardless of trust state.
    BlockAlways,
    /// Permit the call even though the context carries untrusted data.
    AllowWhenContextIsUntrusted,
}

/// Per-tool configuration read from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub id: Uuid,
    pub name: String,
    /// Output from this tool is trusted even without a matching policy.
    pub data_is_trusted_by_default: bool,
    /// The tool may be invoked in an untrusted context unconditionally,
    /// overriding any invocation policies.
    pub allow_usage_when_untrusted_data_is_present: bool,
}

impl ToolConfig {
    /// A tool with both flags off: untrusted output, no untrusted-context
    /// usage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data_is_trusted_by_default: false,
            allow_usage_when_untrusted_data_is_present: false,
        }
    }

    /// Trust this tool's output when no policy matches.
    pub fn trusted_by_default(mut self) -> Self {
        self.data_is_trusted_by_default = true;
        self
    }

    /// Let this tool run in an untrusted context.
    pub fn allow_when_untrusted(mut self) -> Self {
        self.allow_usage_when_untrusted_data_is_present = true;
        self
    }

    /// Stand-in config for a tool the store does not know: both flags off,
    /// so an untrusted context denies it.
    pub(crate) fn default_deny(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            data_is_trusted_by_default: false,
            allow_usage_when_untrusted_data_is_present: false,
        }
    }
}

/// Classifies a tool's output by inspecting values at an attribute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDataPolicy {
    pub id: Uuid,
    pub tool_id: Uuid,
    /// Dotted path into the output, optionally with one `[*]` segment.
    pub attribute_path: String,
    pub operator: Operator,
    /// Comparand the extracted values are checked against.
    pub value: String,
    pub action: TrustAction,
    /// Human-readable description, surfaced in trust/block reasons.
    pub description: String,
}

impl TrustedDataPolicy {
    pub fn new(
        tool_id: Uuid,
        attribute_path: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        action: TrustAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_id,
            attribute_path: attribute_path.into(),
            operator,
            value: value.into(),
            action,
            description: description.into(),
        }
    }
}

/// Gates a tool call by inspecting one of its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationPolicy {
    pub id: Uuid,
    pub tool_id: Uuid,
    /// Argument to inspect; nested fields are addressed with dots
    /// ("user.email").
    pub argument_name: String,
    pub operator: Operator,
    pub value: String,
    pub action: InvocationAction,
    /// Human-readable justification, surfaced in denial reasons.
    pub reason: String,
}

impl ToolInvocationPolicy {
    pub fn new(
        tool_id: Uuid,
        argument_name: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        action: InvocationAction,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_id,
            argument_name: argument_name.into(),
            operator,
            value: value.into(),
            action,
            reason: reason.into(),
        }
    }
}

/// Outcome of classifying one tool output. Transient, scoped to a single
/// evaluation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustResult {
    pub is_trusted: bool,
    pub is_blocked: bool,
    /// Human-readable explanation, suitable for a blocked-content marker.
    pub reason: String,
}

impl TrustResult {
    pub fn trusted(reason: impl Into<String>) -> Self {
        Self {
            is_trusted: true,
            is_blocked: false,
            reason: reason.into(),
        }
    }

    pub fn untrusted(reason: impl Into<String>) -> Self {
        Self {
            is_trusted: false,
            is_blocked: false,
            reason: reason.into(),
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            is_trusted: false,
            is_blocked: true,
            reason: reason.into(),
        }
    }
}

/// Outcome of authorizing one tool call. Transient, scoped to a single
/// evaluation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub is_allowed: bool,
    /// Empty when allowed; a human-readable refusal reason when denied.
    pub reason: String,
}

impl InvocationResult {
    pub fn allowed() -> Self {
        Self {
            is_allowed: true,
            reason: String::new(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            is_allowed: false,
            reason: reason.into(),
        }
    }
}
