//! The matcher abstraction: a pure predicate filtering candidate versions
//! uniformly, independent of where in the traversal a version is being
//! considered.

use std::collections::HashMap;

use crate::meta::{ComponentRef, MatchMeta};

/// A pure predicate over `(reference, match metadata)`. The resolver uses a
/// single matcher instance for an entire `resolve` call: its verdict on a
/// given pair must never depend on traversal context.
///
/// Absent match metadata (`None`) always counts as a match — a component
/// that opts out of projecting match metadata is never filtered out by a
/// matcher.
pub trait Matcher: Send + Sync {
    fn matches(&self, ref_: &ComponentRef, match_meta: Option<&MatchMeta>) -> bool;
}

/// The default matcher: every version matches. Used when the caller supplies
/// no matcher in [`crate::resolver::ResolveOptions`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysMatch;

impl Matcher for AlwaysMatch {
    fn matches(&self, _ref: &ComponentRef, _match_meta: Option<&MatchMeta>) -> bool {
        true
    }
}

/// Reference matcher implementation driven by annotation key/value rules:
///
/// - `match`: every key must match one of its allowed values (AND across
///   keys, OR across values per key);
/// - `exclude`: if any key matches any of its values, the component is
///   rejected (OR across both keys and values).
///
/// Returns true unconditionally when the candidate's match metadata is not
/// an [`crate::meta::AnnotationMeta`] (including when it is absent).
#[derive(Debug, Default, Clone)]
pub struct AnnotationMatcher {
    pub match_: HashMap<String, Vec<String>>,
    pub exclude: HashMap<String, Vec<String>>,
}

impl AnnotationMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.match_.insert(key.into(), values);
        self
    }

    pub fn with_exclude(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.exclude.insert(key.into(), values);
        self
    }
}

impl Matcher for AnnotationMatcher {
    fn matches(&self, _ref: &ComponentRef, match_meta: Option<&MatchMeta>) -> bool {
        let annotations = match match_meta {
            Some(MatchMeta::Annotation(ann)) => &ann.annotations,
            _ => return true,
        };

        for (key, allowed) in &self.match_ {
            let matched = annotations
                .get(key)
                .is_some_and(|value| allowed.iter().any(|v| v == value));
            if !matched {
                return false;
            }
        }

        for (key, rejected) in &self.exclude {
            if let Some(value) = annotations.get(key) {
                if rejected.iter().any(|v| v == value) {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::AnnotationMeta;

    fn ref_() -> ComponentRef {
        ComponentRef::new("pkg", "1.0.0")
    }

    fn annotated(pairs: &[(&str, &str)]) -> Option<MatchMeta> {
        let mut annotations = HashMap::new();
        for (k, v) in pairs {
            annotations.insert(k.to_string(), v.to_string());
        }
        Some(MatchMeta::Annotation(AnnotationMeta { annotations }))
    }

    #[test]
    fn always_match_matches_everything() {
        assert!(AlwaysMatch.matches(&ref_(), None));
        assert!(AlwaysMatch.matches(&ref_(), annotated(&[]).as_ref()));
    }

    #[test]
    fn none_metadata_always_matches() {
        let matcher = AnnotationMatcher::new().with_match("qualified", vec!["true".to_string()]);
        assert!(matcher.matches(&ref_(), None));
    }

    #[test]
    fn match_requires_all_keys() {
        let matcher = AnnotationMatcher::new()
            .with_match("qualified", vec!["true".to_string()])
            .with_match("channel", vec!["stable".to_string(), "beta".to_string()]);

        assert!(matcher.matches(&ref_(), annotated(&[("qualified", "true"), ("channel", "beta")]).as_ref()));
        assert!(!matcher.matches(&ref_(), annotated(&[("qualified", "true")]).as_ref()));
        assert!(!matcher.matches(
            &ref_(),
            annotated(&[("qualified", "true"), ("channel", "alpha")]).as_ref()
        ));
    }

    #[test]
    fn exclude_rejects_on_any_hit() {
        let matcher = AnnotationMatcher::new().with_exclude("bad", vec!["true".to_string()]);
        assert!(!matcher.matches(&ref_(), annotated(&[("bad", "true")]).as_ref()));
        assert!(matcher.matches(&ref_(), annotated(&[("bad", "false")]).as_ref()));
        assert!(matcher.matches(&ref_(), annotated(&[]).as_ref()));
    }
}
