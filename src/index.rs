//! The sorted, immutable index the resolver traverses: a per-name ascending
//! list of versions, plus a global lookup by `(name, version)`. Built once
//! from a slice of raw components and never mutated afterward.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::meta::{ComponentRef, DepMeta, MatchProcessor, RawComponent};
use crate::version::Version;

/// Every known version of one component name, sorted ascending (index 0 is
/// the lowest version).
#[derive(Debug, Clone, Default)]
pub struct SortedVersions(Vec<DepMeta>);

impl SortedVersions {
    /// The highest version for which `matcher` holds.
    pub fn latest(&self, matcher: &dyn Matcher) -> Option<&DepMeta> {
        self.0
            .iter()
            .rev()
            .find(|meta| matcher.matches(&meta.ref_(), meta.match_meta.as_ref()))
    }

    /// The highest version strictly below `version` for which `matcher`
    /// holds.
    pub fn previous(&self, version: &Version, matcher: &dyn Matcher) -> Option<&DepMeta> {
        self.0
            .iter()
            .rev()
            .find(|meta| meta.version < *version && matcher.matches(&meta.ref_(), meta.match_meta.as_ref()))
    }

    /// All known refs for this name, ascending.
    pub fn refs(&self) -> Vec<ComponentRef> {
        self.0.iter().map(DepMeta::ref_).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The two indexes a `Resolver` consumes, computed once at construction.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub(crate) by_name: HashMap<String, SortedVersions>,
    pub(crate) by_ref: HashMap<ComponentRef, DepMeta>,
}

impl Universe {
    pub fn build(components: &[RawComponent], processor: &dyn MatchProcessor) -> Result<Self> {
        let mut by_name: HashMap<String, Vec<DepMeta>> = HashMap::new();
        let mut by_ref: HashMap<ComponentRef, DepMeta> = HashMap::new();

        for raw in components {
            let meta = processor.project(raw)?;
            let ref_ = meta.ref_();
            if by_ref.contains_key(&ref_) {
                return Err(Error::DuplicateComponent(ref_));
            }
            by_ref.insert(ref_, meta.clone());
            by_name.entry(meta.name.clone()).or_default().push(meta);
        }

        let by_name = by_name
            .into_iter()
            .map(|(name, mut versions)| {
                versions.sort_by(|a, b| a.version.cmp(&b.version));
                (name, SortedVersions(versions))
            })
            .collect();

        Ok(Universe { by_name, by_ref })
    }

    pub fn component(&self, ref_: &ComponentRef) -> Option<DepMeta> {
        self.by_ref.get(ref_).cloned()
    }

    pub fn has_component(&self, ref_: &ComponentRef) -> bool {
        self.by_ref.contains_key(ref_)
    }

    pub fn all_components(&self) -> Vec<DepMeta> {
        let mut all: Vec<DepMeta> = self.by_ref.values().cloned().collect();
        all.sort_by(|a, b| (a.name.as_str(), &a.version).cmp(&(b.name.as_str(), &b.version)));
        all
    }

    pub fn component_versions(&self, name: &str) -> Vec<ComponentRef> {
        self.by_name
            .get(name)
            .map(SortedVersions::refs)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::AlwaysMatch;
    use crate::meta::NoopProcessor;

    fn component(name: &str, version: &str) -> RawComponent {
        RawComponent {
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn build_sorts_ascending() {
        let components = vec![component("foo", "1.2.0"), component("foo", "0.9.0"), component("foo", "1.0.0")];
        let universe = Universe::build(&components, &NoopProcessor).unwrap();
        let versions: Vec<String> = universe
            .component_versions("foo")
            .into_iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(versions, vec!["0.9.0", "1.0.0", "1.2.0"]);
    }

    #[test]
    fn build_rejects_duplicate_component() {
        let components = vec![component("foo", "1.0.0"), component("foo", "1.0.0")];
        assert!(matches!(
            Universe::build(&components, &NoopProcessor),
            Err(Error::DuplicateComponent(_))
        ));
    }

    #[test]
    fn latest_scans_high_to_low() {
        let components = vec![component("foo", "1.0.0"), component("foo", "2.0.0")];
        let universe = Universe::build(&components, &NoopProcessor).unwrap();
        let sorted = &universe.by_name["foo"];
        let latest = sorted.latest(&AlwaysMatch).unwrap();
        assert_eq!(latest.version.to_string(), "2.0.0");
    }

    #[test]
    fn previous_skips_to_strictly_lower() {
        let components = vec![
            component("foo", "1.0.0"),
            component("foo", "1.5.0"),
            component("foo", "2.0.0"),
        ];
        let universe = Universe::build(&components, &NoopProcessor).unwrap();
        let sorted = &universe.by_name["foo"];
        let prev = sorted
            .previous(&Version::parse("2.0.0").unwrap(), &AlwaysMatch)
            .unwrap();
        assert_eq!(prev.version.to_string(), "1.5.0");
    }

    #[test]
    fn unknown_name_has_no_versions() {
        let universe = Universe::build(&[], &NoopProcessor).unwrap();
        assert!(universe.component_versions("missing").is_empty());
    }
}
