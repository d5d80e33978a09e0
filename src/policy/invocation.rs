//! Tool-invocation authorization.
//!
//! Decides whether a tool call may proceed given its arguments, the tool's
//! configuration, and the conversation's trust state. Block policies are
//! evaluated first regardless of trust; in an untrusted context the call
//! is denied unless the tool overrides untrusted usage or an explicit
//! allow policy matches.

use serde_json::Value;

use crate::policy::{
    InvocationAction, InvocationResult, ToolConfig, ToolInvocationPolicy, condition_matches, path,
};

/// Authorize one tool call.
///
/// `arguments` is the call's argument object. A missing argument cannot
/// match a block rule (the rule is skipped), but an allow rule that cannot
/// inspect its argument denies the call outright.
pub fn authorize(
    arguments: &Value,
    tool: &ToolConfig,
    context_is_trusted: bool,
    policies: &[ToolInvocationPolicy],
) -> InvocationResult {
    // Block pass runs first, even for a trusted context.
    for policy in policies {
        if policy.action != InvocationAction::BlockAlways {
            continue;
        }
        let Some(value) = path::resolve(arguments, &policy.argument_name) else {
            continue;
        };
        if condition_matches(value, policy.operator, &policy.value) {
            tracing::debug!(
                tool = %tool.name,
                argument = %policy.argument_name,
                "tool invocation blocked by policy"
            );
            return InvocationResult::denied(format!(
                "Tool invocation blocked by policy: {}",
                policy.reason
            ));
        }
    }

    if context_is_trusted {
        return InvocationResult::allowed();
    }

    // Untrusted context: the tool-level override wins unconditionally.
    if tool.allow_usage_when_untrusted_data_is_present {
        return InvocationResult::allowed();
    }

    for policy in policies {
        if policy.action != InvocationAction::AllowWhenContextIsUntrusted {
            continue;
        }
        let Some(value) = path::resolve(arguments, &policy.argument_name) else {
            return InvocationResult::denied(format!(
                "Missing required argument: {}",
                policy.argument_name
            ));
        };
        if condition_matches(value, policy.operator, &policy.value) {
            return InvocationResult::allowed();
        }
    }

    InvocationResult::denied(format!(
        "Tool {} cannot be invoked: the conversation context contains untrusted data",
        tool.name
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::policy::Operator;

    fn block(
        tool: &ToolConfig,
        argument: &str,
        operator: Operator,
        value: &str,
        reason: &str,
    ) -> ToolInvocationPolicy {
        ToolInvocationPolicy::new(
            tool.id,
            argument,
            operator,
            value,
            InvocationAction::BlockAlways,
            reason,
        )
    }

    fn allow(
        tool: &ToolConfig,
        argument: &str,
        operator: Operator,
        value: &str,
    ) -> ToolInvocationPolicy {
        ToolInvocationPolicy::new(
            tool.id,
            argument,
            operator,
            value,
            InvocationAction::AllowWhenContextIsUntrusted,
            "explicitly allowed",
        )
    }

    #[test]
    fn trusted_context_with_no_policies_allows() {
        let tool = ToolConfig::new("send_email");
        let result = authorize(&json!({"to": "x@y.com"}), &tool, true, &[]);
        assert_eq!(result, InvocationResult::allowed());
    }

    #[test]
    fn untrusted_context_with_no_policies_denies() {
        let tool = ToolConfig::new("send_email");
        let result = authorize(&json!({"to": "x@y.com"}), &tool, false, &[]);

        assert!(!result.is_allowed);
        assert!(result.reason.contains("context contains untrusted data"));
    }

    #[test]
    fn block_policy_denies_even_in_trusted_context() {
        let tool = ToolConfig::new("read_file");
        let policies = vec![block(
            &tool,
            "file_path",
            Operator::Contains,
            "/etc/",
            "system paths are off limits",
        )];

        let denied = authorize(&json!({"file_path": "/etc/passwd"}), &tool, true, &policies);
        assert!(!denied.is_allowed);
        assert!(denied.reason.contains("system paths are off limits"));

        let allowed = authorize(&json!({"file_path": "/tmp/x"}), &tool, true, &policies);
        assert_eq!(allowed, InvocationResult::allowed());
    }

    #[test]
    fn block_policy_with_missing_argument_does_not_deny() {
        let tool = ToolConfig::new("read_file");
        let policies = vec![block(
            &tool,
            "optional",
            Operator::Equal,
            "bad",
            "bad value",
        )];

        let result = authorize(&json!({"other": "value"}), &tool, true, &policies);
        assert_eq!(result, InvocationResult::allowed());
    }

    #[test]
    fn allow_policy_with_missing_argument_denies() {
        let tool = ToolConfig::new("read_file");
        let policies = vec![allow(&tool, "required", Operator::Equal, "yes")];

        let result = authorize(&json!({"other": "value"}), &tool, false, &policies);
        assert!(!result.is_allowed);
        assert_eq!(result.reason, "Missing required argument: required");
    }

    #[test]
    fn matching_allow_policy_permits_untrusted_context() {
        let tool = ToolConfig::new("read_file");
        let policies = vec![allow(&tool, "path", Operator::StartsWith, "/safe/")];

        let allowed = authorize(&json!({"path": "/safe/file.txt"}), &tool, false, &policies);
        assert_eq!(allowed, InvocationResult::allowed());

        let denied = authorize(&json!({"path": "/unsafe/file.txt"}), &tool, false, &policies);
        assert!(!denied.is_allowed);
        assert!(denied.reason.contains("context contains untrusted data"));
    }

    #[test]
    fn tool_override_permits_untrusted_context_unconditionally() {
        let tool = ToolConfig::new("log_event").allow_when_untrusted();

        // No policies at all.
        let result = authorize(&json!({"event": "x"}), &tool, false, &[]);
        assert_eq!(result, InvocationResult::allowed());

        // A non-matching allow policy does not defeat the override.
        let policies = vec![allow(&tool, "special", Operator::Equal, "magic")];
        let result = authorize(&json!({"event": "x"}), &tool, false, &policies);
        assert_eq!(result, InvocationResult::allowed());
    }

    #[test]
    fn tool_override_does_not_bypass_block_policies() {
        let tool = ToolConfig::new("log_event").allow_when_untrusted();
        let policies = vec![block(
            &tool,
            "target",
            Operator::EndsWith,
            "@evil.com",
            "blocked domain",
        )];

        let result = authorize(&json!({"target": "c2@evil.com"}), &tool, false, &policies);
        assert!(!result.is_allowed);
        assert!(result.reason.contains("blocked domain"));
    }

    #[test]
    fn nested_argument_paths_resolve() {
        let tool = ToolConfig::new("send_email");
        let policies = vec![block(
            &tool,
            "user.email",
            Operator::EndsWith,
            "@blocked.com",
            "blocked domain",
        )];

        let denied = authorize(
            &json!({"user": {"email": "mallory@blocked.com", "name": "Mallory"}}),
            &tool,
            true,
            &policies,
        );
        assert!(!denied.is_allowed);

        let allowed = authorize(
            &json!({"user": {"email": "alice@allowed.com", "name": "Alice"}}),
            &tool,
            true,
            &policies,
        );
        assert_eq!(allowed, InvocationResult::allowed());
    }

    #[test]
    fn block_pass_runs_before_allow_pass() {
        let tool = ToolConfig::new("send_email");
        let policies = vec![
            block(
                &tool,
                "email",
                Operator::EndsWith,
                "@blocked.com",
                "blocked domain",
            ),
            allow(&tool, "override", Operator::Equal, "true"),
        ];

        // Block wins even when the allow policy would match.
        let denied = authorize(
            &json!({"email": "x@blocked.com", "override": "true"}),
            &tool,
            false,
            &policies,
        );
        assert!(!denied.is_allowed);
        assert!(denied.reason.contains("blocked domain"));

        // With no block match the allow policy carries the untrusted context.
        let allowed = authorize(
            &json!({"email": "x@allowed.com", "override": "true"}),
            &tool,
            false,
            &policies,
        );
        assert_eq!(allowed, InvocationResult::allowed());
    }

    #[test]
    fn non_string_argument_fails_string_operators_closed() {
        let tool = ToolConfig::new("transfer");
        let policies = vec![allow(&tool, "amount", Operator::StartsWith, "0")];

        // amount is a number: startsWith cannot match, so the untrusted
        // context denies.
        let result = authorize(&json!({"amount": 100}), &tool, false, &policies);
        assert!(!result.is_allowed);
    }
}
