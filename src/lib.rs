//! Trust propagation and policy enforcement for tool-augmented LLM
//! conversations.
//!
//! An agent that can read private data, ingest untrusted external content,
//! and take external actions is one prompt injection away from
//! exfiltration. This crate is the decision core a proxy puts between the
//! model and its tools: it classifies every tool result against
//! trusted-data policies, propagates a conversation-wide trust flag,
//! redacts blocked results, and authorizes (or refuses) the next tool
//! invocation.
//!
//! Data is untrusted by default. Only output matching a `mark_as_trusted`
//! policy (or produced by a tool configured to trust by default) counts as
//! trusted; `block_always` policies win over everything. In an untrusted
//! context a tool call is denied unless the tool overrides untrusted usage
//! or an explicit allow policy matches its arguments.
//!
//! The engine is a pure, deterministic function over the message history
//! and a policy snapshot supplied through [`PolicyStore`]; it performs no
//! content inspection and owns no storage.
//!
//! ```
//! use serde_json::json;
//! use trustgate::{Operator, ToolConfig, TrustAction, TrustedDataPolicy, classify};
//!
//! let tool = ToolConfig::new("fetch_data");
//! let policy = TrustedDataPolicy::new(
//!     tool.id,
//!     "source",
//!     Operator::Equal,
//!     "trusted-api",
//!     TrustAction::MarkAsTrusted,
//!     "internal API results are vetted",
//! );
//!
//! let verdict = classify(&json!({"value": {"source": "trusted-api"}}), &tool, &[policy]);
//! assert!(verdict.is_trusted);
//! ```

pub mod conversation;
pub mod error;
pub mod gate;
pub mod policy;
pub mod store;

pub use conversation::tracker::{ConversationEvaluation, TrustTracker};
pub use conversation::{ChatMessage, ContentPart, MessageContent, Role, ToolCall};
pub use error::{PathError, StoreError};
pub use gate::{ToolCallRefusal, evaluate_tool_calls};
pub use policy::{
    AttributePath, InvocationAction, InvocationResult, Operator, ToolConfig, ToolInvocationPolicy,
    TrustAction, TrustResult, TrustedDataPolicy, authorize, classify, condition_matches,
};
pub use store::{MemoryPolicyStore, PolicyStore};
