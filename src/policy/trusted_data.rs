//! Trusted-data classification for tool outputs.
//!
//! Data is UNTRUSTED by default: only output that explicitly matches a
//! `mark_as_trusted` policy (or comes from a tool configured to trust by
//! default) counts as trusted. `block_always` policies take precedence
//! over everything else, including the default-trust flag. This is an
//! allowlist: the absence of a matching policy never implies trust.

use serde_json::Value;

use crate::policy::{
    AttributePath, ToolConfig, TrustAction, TrustResult, TrustedDataPolicy, condition_matches,
};

/// Classify one tool output against the tool's trusted-data policies.
///
/// Pure function over its inputs; the policy snapshot must be consistent
/// for the duration of the call.
pub fn classify(
    tool_output: &Value,
    tool: &ToolConfig,
    policies: &[TrustedDataPolicy],
) -> TrustResult {
    if policies.is_empty() {
        return if tool.data_is_trusted_by_default {
            TrustResult::trusted(default_trust_reason(&tool.name))
        } else {
            TrustResult::untrusted(format!(
                "No trust policy defined for tool {} - data is untrusted by default",
                tool.name
            ))
        };
    }

    // Some clients wrap the actual output under a "value" key; unwrap once.
    let payload = unwrap_payload(tool_output);

    // Block pass: ANY matching extracted value blocks the whole output,
    // before trust policies and before the default-trust fallback.
    for policy in policies {
        if policy.action != TrustAction::BlockAlways {
            continue;
        }
        let Some(path) = parse_policy_path(policy) else {
            continue;
        };
        let blocked = path
            .extract(payload)
            .into_iter()
            .any(|value| condition_matches(value, policy.operator, &policy.value));
        if blocked {
            tracing::debug!(
                tool = %tool.name,
                policy = %policy.description,
                "tool output blocked by policy"
            );
            return TrustResult::blocked(format!(
                "Data blocked by policy: {}",
                policy.description
            ));
        }
    }

    // Trust pass: ALL extracted values must satisfy the condition. An
    // empty extraction never counts as trusted.
    for policy in policies {
        if policy.action != TrustAction::MarkAsTrusted {
            continue;
        }
        let Some(path) = parse_policy_path(policy) else {
            continue;
        };
        let values = path.extract(payload);
        if !values.is_empty()
            && values
                .iter()
                .all(|value| condition_matches(value, policy.operator, &policy.value))
        {
            return TrustResult::trusted(format!(
                "Data trusted by policy: {}",
                policy.description
            ));
        }
    }

    if tool.data_is_trusted_by_default {
        return TrustResult::trusted(default_trust_reason(&tool.name));
    }

    TrustResult::untrusted("Data does not match any trust policies - considered untrusted")
}

fn default_trust_reason(tool_name: &str) -> String {
    format!("Tool {tool_name} is configured to trust data by default")
}

/// Unwrap the canonical `value` envelope once if present. JSON `null`
/// counts as absent so `{"value": null}` falls back to the whole payload.
fn unwrap_payload(tool_output: &Value) -> &Value {
    match tool_output.get("value") {
        Some(inner) if !inner.is_null() => inner,
        _ => tool_output,
    }
}

/// Parse a policy's attribute path, logging and skipping the policy if it
/// is malformed. A broken policy fails closed, it never crashes a request.
fn parse_policy_path(policy: &TrustedDataPolicy) -> Option<AttributePath> {
    match AttributePath::parse(&policy.attribute_path) {
        Ok(path) => Some(path),
        Err(error) => {
            tracing::warn!(
                path = %policy.attribute_path,
                policy = %policy.description,
                %error,
                "malformed attribute path in trusted-data policy, skipping"
            );
            None
        }
    }
}
