//! Condition evaluation for policy rules.

use serde_json::Value;

use crate::policy::Operator;

/// Evaluate a single `(value, operator, comparand)` triple.
///
/// Equality is strict and type-sensitive: a non-string value never equals
/// a string comparand. The substring and regex operators are string-only
/// and fail closed on any other type. An invalid regex pattern is logged
/// and evaluates to `false`, so a broken policy can never take down a
/// request.
pub fn condition_matches(value: &Value, operator: Operator, comparand: &str) -> bool {
    match operator {
        Operator::Equal => value.as_str() == Some(comparand),
        Operator::NotEqual => value.as_str() != Some(comparand),
        Operator::Contains => value.as_str().is_some_and(|s| s.contains(comparand)),
        Operator::NotContains => value.as_str().is_some_and(|s| !s.contains(comparand)),
        Operator::StartsWith => value.as_str().is_some_and(|s| s.starts_with(comparand)),
        Operator::EndsWith => value.as_str().is_some_and(|s| s.ends_with(comparand)),
        Operator::Regex => match regex::Regex::new(comparand) {
            Ok(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
            Err(error) => {
                tracing::warn!(
                    pattern = comparand,
                    %error,
                    "invalid regex in policy value, condition evaluates to false"
                );
                false
            }
        },
    }
}
