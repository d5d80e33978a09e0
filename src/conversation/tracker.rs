//! Conversation-level trust tracking and redaction.
//!
//! Scans an ordered message history, classifies every tool result against
//! its tool's trusted-data policies, and produces a redacted message set
//! plus the conversation-wide trust flag the invocation authorizer
//! consumes. Deterministic over the message list and the policy snapshot;
//! no state survives between calls.

use std::collections::HashMap;

use serde_json::Value;

use crate::conversation::{ChatMessage, MessageContent, Role};
use crate::error::StoreError;
use crate::policy::{TrustResult, classify};
use crate::store::PolicyStore;

const REDACTION_PREFIX: &str = "[Content blocked by policy";

/// Outcome of evaluating a conversation's accumulated trust state.
#[derive(Debug, Clone)]
pub struct ConversationEvaluation {
    /// The message list safe to forward: blocked tool results are redacted,
    /// everything else passes through unchanged and in order.
    pub filtered_messages: Vec<ChatMessage>,
    /// Conversation-wide trust signal: false as soon as any tool result is
    /// not trusted (or cannot be attributed to a tool at all).
    pub context_is_trusted: bool,
}

/// Classifies tool results across a message history and redacts blocked
/// ones.
pub struct TrustTracker<'a> {
    store: &'a dyn PolicyStore,
}

impl<'a> TrustTracker<'a> {
    pub fn new(store: &'a dyn PolicyStore) -> Self {
        Self { store }
    }

    /// Evaluate the conversation's trust state.
    ///
    /// Two passes. The first classifies every tool result: the originating
    /// tool is looked up through an id-to-name index built from the
    /// assistant messages' tool calls, its policies are fetched from the
    /// store, and the classifier's verdict is accumulated into the global
    /// untrusted flag and the blocked set. The second pass rebuilds the
    /// message list with blocked results redacted.
    ///
    /// A store failure propagates; the caller must fail closed.
    pub async fn evaluate(
        &self,
        messages: &[ChatMessage],
    ) -> Result<ConversationEvaluation, StoreError> {
        // The tool result message carries only the tool_call_id; index the
        // assistant tool calls up front so attribution is a lookup instead
        // of a backward scan per result.
        let call_names = index_tool_calls(messages);

        let mut has_untrusted_data = false;
        let mut block_reasons: HashMap<String, String> = HashMap::new();

        for message in messages.iter().filter(|m| m.role == Role::Tool) {
            let Some(tool_call_id) = message.tool_call_id.as_deref() else {
                // A result without a call id cannot be attributed.
                has_untrusted_data = true;
                continue;
            };

            let content = message.content.as_text();
            if is_redaction_marker(&content) {
                // Redacted on a previous pass: still untrusted data, but
                // classified once already. Re-evaluation stays idempotent.
                has_untrusted_data = true;
                continue;
            }

            let Some(tool_name) = call_names.get(tool_call_id) else {
                tracing::warn!(
                    tool_call_id,
                    "tool result has no matching tool call, marking conversation untrusted"
                );
                has_untrusted_data = true;
                continue;
            };

            let payload = parse_tool_output(&content);
            let result = self.classify_output(tool_name, &payload).await?;
            tracing::debug!(
                tool = %tool_name,
                tool_call_id,
                trusted = result.is_trusted,
                blocked = result.is_blocked,
                "classified tool result"
            );

            if !result.is_trusted {
                has_untrusted_data = true;
            }
            if result.is_blocked {
                block_reasons.insert(tool_call_id.to_string(), result.reason);
            }
        }

        let filtered_messages = redact_blocked(messages, &block_reasons);

        Ok(ConversationEvaluation {
            filtered_messages,
            context_is_trusted: !has_untrusted_data,
        })
    }

    async fn classify_output(
        &self,
        tool_name: &str,
        payload: &Value,
    ) -> Result<TrustResult, StoreError> {
        let Some(tool) = self.store.tool_by_name(tool_name).await? else {
            // An unknown tool has no policies and no default-trust flag.
            return Ok(TrustResult::untrusted(format!(
                "No trust policy defined for tool {tool_name} - data is untrusted by default"
            )));
        };
        let policies = self.store.trusted_data_policies(tool.id).await?;
        Ok(classify(payload, &tool, &policies))
    }
}

/// Build the `tool_call_id -> tool_name` index in one forward pass. Later
/// assistant messages win on id collisions, matching a most-recent-first
/// scan.
fn index_tool_calls(messages: &[ChatMessage]) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for message in messages.iter().filter(|m| m.role == Role::Assistant) {
        for call in message.tool_calls.iter().flatten() {
            index.insert(call.id.clone(), call.name.clone());
        }
    }
    index
}

/// Parse a tool result as structured data, falling back to the raw string
/// when it is not valid JSON.
fn parse_tool_output(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()))
}

fn is_redaction_marker(content: &str) -> bool {
    content.starts_with(REDACTION_PREFIX) && content.ends_with(']')
}

fn redaction_marker(reason: &str) -> String {
    if reason.is_empty() {
        format!("{REDACTION_PREFIX}]")
    } else {
        format!("{REDACTION_PREFIX}: {reason}]")
    }
}

fn redact_blocked(
    messages: &[ChatMessage],
    block_reasons: &HashMap<String, String>,
) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|message| {
            let blocked_reason = (message.role == Role::Tool)
                .then(|| message.tool_call_id.as_deref())
                .flatten()
                .and_then(|id| block_reasons.get(id));
            match blocked_reason {
                Some(reason) => {
                    let mut redacted = message.clone();
                    redacted.content = MessageContent::Text(redaction_marker(reason));
                    redacted
                }
                None => message.clone(),
            }
        })
        .collect()
}
