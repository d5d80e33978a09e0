//! Attribute path parsing and value extraction.
//!
//! Policies address locations inside semi-structured tool payloads with
//! dotted paths (`user.email`), optionally containing a single wildcard
//! array segment (`emails[*].from`). A path is parsed once into an AST and
//! then evaluated against [`serde_json::Value`], so behavior at every type
//! boundary is explicit. Missing intermediate fields resolve to an empty
//! extraction, never an error.

use serde_json::Value;

use crate::error::PathError;

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    kind: PathKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathKind {
    /// Plain dotted lookup, e.g. `user.email`.
    Simple(Vec<String>),
    /// Array wildcard: resolve `array`, then map `item` over each element,
    /// e.g. `emails[*].from`.
    Wildcard { array: Vec<String>, item: Vec<String> },
}

impl AttributePath {
    /// Parse a path expression. At most one `[*]` segment is supported and
    /// it must be followed by an item sub-path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let Some(idx) = raw.find("[*]") else {
            return Ok(Self {
                kind: PathKind::Simple(split_segments(raw)?),
            });
        };

        let array_part = &raw[..idx];
        let rest = &raw[idx + 3..];
        if rest.contains("[*]") {
            return Err(PathError::MultipleWildcards(raw.to_string()));
        }
        let Some(item_part) = rest.strip_prefix('.').filter(|p| !p.is_empty()) else {
            return Err(PathError::TrailingWildcard(raw.to_string()));
        };
        if array_part.is_empty() {
            return Err(PathError::EmptySegment(raw.to_string()));
        }

        Ok(Self {
            kind: PathKind::Wildcard {
                array: split_segments(array_part)
                    .map_err(|_| PathError::EmptySegment(raw.to_string()))?,
                item: split_segments(item_part)
                    .map_err(|_| PathError::EmptySegment(raw.to_string()))?,
            },
        })
    }

    /// Extract every value the path addresses within `payload`.
    ///
    /// A simple path yields zero or one value. A wildcard path yields one
    /// value per array element that carries the item sub-path; elements
    /// missing it are dropped. A wildcard over anything but an array
    /// yields nothing. An existing field holding JSON `null` is a value
    /// and is kept.
    pub fn extract<'a>(&self, payload: &'a Value) -> Vec<&'a Value> {
        match &self.kind {
            PathKind::Simple(segments) => lookup(payload, segments).into_iter().collect(),
            PathKind::Wildcard { array, item } => {
                let Some(Value::Array(elements)) = lookup(payload, array) else {
                    return Vec::new();
                };
                elements
                    .iter()
                    .filter_map(|element| lookup(element, item))
                    .collect()
            }
        }
    }
}

/// Resolve a dotted path (no wildcard) against `payload`. Used for
/// invocation-policy argument lookup, where a missing argument is
/// meaningful to the caller.
pub(crate) fn resolve<'a>(payload: &'a Value, dotted: &str) -> Option<&'a Value> {
    if dotted.is_empty() {
        return None;
    }
    let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return None;
    }
    lookup(payload, &segments)
}

/// Walk `segments` down from `current`. Object segments are field lookups;
/// a numeric segment indexes into an array. Any other combination is
/// treated as absent.
fn lookup<'a>(mut current: &'a Value, segments: &[String]) -> Option<&'a Value> {
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(elements) => {
                let index: usize = segment.parse().ok()?;
                elements.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

fn split_segments(path: &str) -> Result<Vec<String>, PathError> {
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}
