//! Assistant-message gating.
//!
//! Before an assistant response carrying tool calls is forwarded, every
//! call is checked against the tool's invocation policies and the
//! conversation trust state. A denied call replaces the whole assistant
//! message with a plain refusal, so the client never sees the blocked
//! call.

use crate::conversation::ChatMessage;
use crate::error::StoreError;
use crate::policy::{ToolConfig, authorize};
use crate::store::PolicyStore;

/// A denied tool call and the assistant message to send instead.
#[derive(Debug, Clone)]
pub struct ToolCallRefusal {
    /// Replacement assistant message carrying the refusal text and no tool
    /// calls.
    pub message: ChatMessage,
    /// Name of the denied tool.
    pub tool_name: String,
    /// The authorizer's denial reason.
    pub reason: String,
}

/// Authorize every tool call on an assistant message.
///
/// Returns `None` when all calls are permitted (or the message carries
/// none). The first denial wins and yields the refusal replacement. A tool
/// unknown to the store is authorized against an empty policy set and a
/// default-deny configuration, so an untrusted context refuses it.
///
/// A store failure propagates; the caller must fail closed.
pub async fn evaluate_tool_calls(
    assistant: &ChatMessage,
    store: &dyn PolicyStore,
    context_is_trusted: bool,
) -> Result<Option<ToolCallRefusal>, StoreError> {
    let Some(calls) = assistant.tool_calls.as_ref() else {
        return Ok(None);
    };

    for call in calls {
        let (tool, policies) = match store.tool_by_name(&call.name).await? {
            Some(tool) => {
                let policies = store.invocation_policies(tool.id).await?;
                (tool, policies)
            }
            None => (ToolConfig::default_deny(&call.name), Vec::new()),
        };

        let result = authorize(&call.arguments, &tool, context_is_trusted, &policies);
        if !result.is_allowed {
            tracing::debug!(
                tool = %call.name,
                reason = %result.reason,
                "tool call denied, replacing assistant message with refusal"
            );
            return Ok(Some(ToolCallRefusal {
                message: ChatMessage::assistant(refusal_text(&call.name, &result.reason)),
                tool_name: call.name.clone(),
                reason: result.reason,
            }));
        }
    }

    Ok(None)
}

fn refusal_text(tool_name: &str, reason: &str) -> String {
    format!("Tool call \"{tool_name}\" was denied by tool invocation policy: {reason}")
}
