//! The minimal projection of a raw, external "component" the resolver
//! actually needs, and the `MatchProcessor` contract that produces it.
//!
//! Everything in this module sits at the boundary described in ch. 6 of the
//! design: a host hands the resolver `RawComponent` values shaped however its
//! own schema likes (YAML-derived, hand-built, whatever), and a
//! `MatchProcessor` projects each one into a `DepMeta` the resolver's index
//! and traversal code can work with uniformly.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::Version;

/// Requirements objects embedded in the external schema are recognized by
/// an empty api-family token, or one that names this domain.
const REQUIREMENTS_DOMAIN_TAG: &str = "bundle.gke.io";

const VISIBILITY_PUBLIC: &str = "@public";
const VISIBILITY_PRIVATE: &str = "@private";

/// `(name, version)` pair identifying one component at one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentRef {
    pub name: String,
    pub version: String,
}

impl ComponentRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ComponentRef {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A single `{name, min_version}` entry from a component's `require` list,
/// in declaration order.
#[derive(Debug, Clone)]
pub struct RequestedDep {
    pub name: String,
    pub min_version: Version,
}

/// The visibility policy attached to a component: who may depend on it.
///
/// An empty set, or one containing `@private`, means nobody may; a set
/// containing `@public` means everybody may; otherwise the set is read as an
/// allow-list of component names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility(HashSet<String>);

impl Visibility {
    pub fn visible_to(&self, dependent_name: &str) -> bool {
        if self.0.is_empty() || self.0.contains(VISIBILITY_PRIVATE) {
            return false;
        }
        if self.0.contains(VISIBILITY_PUBLIC) {
            return true;
        }
        self.0.contains(dependent_name)
    }
}

impl FromIterator<String> for Visibility {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Visibility(iter.into_iter().collect())
    }
}

/// Opaque match metadata produced by a `MatchProcessor`, consumed only by a
/// `Matcher`. New variants may be added; a `Matcher` that does not recognize
/// one must treat it as a non-match opt-out (return true).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MatchMeta {
    Annotation(AnnotationMeta),
}

/// The annotation map copied verbatim off a component, for use by
/// [`crate::matcher::AnnotationMatcher`].
#[derive(Debug, Clone, Default)]
pub struct AnnotationMeta {
    pub annotations: HashMap<String, String>,
}

/// The resolver's projection of one component at one version: everything the
/// selection algorithm needs, nothing more.
#[derive(Debug, Clone)]
pub struct DepMeta {
    pub name: String,
    pub version: Version,
    pub required: Vec<RequestedDep>,
    pub visibility: Visibility,
    pub match_meta: Option<MatchMeta>,
}

impl DepMeta {
    pub fn ref_(&self) -> ComponentRef {
        ComponentRef::new(self.name.clone(), self.version.to_string())
    }
}

/// A host-supplied dependency, as read from a `Requirements` object's
/// `require` list: `{ componentName: string (required), version?: string }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRequire {
    #[serde(rename = "componentName")]
    pub component_name: String,
    #[serde(default)]
    pub version: String,
}

/// One object embedded in a raw component. Only objects whose `kind` is
/// `"Requirements"` (and whose `api_version`, if present, names the
/// recognized domain) are consulted; `visibility`/`require` on any other
/// object are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    pub kind: String,
    #[serde(default, rename = "apiVersion")]
    pub api_version: String,
    #[serde(default)]
    pub visibility: Vec<String>,
    #[serde(default)]
    pub require: Vec<RawRequire>,
}

impl RawObject {
    fn is_recognized_requirements(&self) -> bool {
        self.kind == "Requirements"
            && (self.api_version.is_empty() || self.api_version.contains(REQUIREMENTS_DOMAIN_TAG))
    }
}

/// The raw, host-shaped component the resolver is handed: a name, a version
/// string, an annotation map, and the embedded objects that may carry a
/// `Requirements` block. This is the minimum surface described in ch. 6 —
/// schema validation, inlining, and templating all happen upstream of this
/// type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComponent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub objects: Vec<RawObject>,
}

/// Projects the fields every `MatchProcessor` implementation shares: name,
/// version, required deps, and visibility. A processor layers its own
/// `match_meta` on top of this.
fn project_common(raw: &RawComponent) -> Result<(String, Version, Vec<RequestedDep>, Visibility)> {
    if raw.name.is_empty() {
        return Err(Error::MissingField("name".to_string()));
    }
    if raw.version.is_empty() {
        return Err(Error::MissingField(format!("{}: version", raw.name)));
    }

    let version = Version::parse(&raw.version).map_err(|e| Error::BadVersion {
        ref_: raw.name.clone(),
        version: raw.version.clone(),
        reason: e.to_string(),
    })?;

    let requirements: Vec<&RawObject> = raw
        .objects
        .iter()
        .filter(|o| o.is_recognized_requirements())
        .collect();

    if requirements.len() > 1 {
        return Err(Error::DuplicateRequirements(ComponentRef::new(
            raw.name.clone(),
            version.to_string(),
        )));
    }

    let Some(obj) = requirements.first() else {
        return Ok((raw.name.clone(), version, Vec::new(), Visibility::default()));
    };

    let mut required = Vec::with_capacity(obj.require.len());
    for req in &obj.require {
        if req.component_name.is_empty() {
            return Err(Error::MissingField(format!(
                "{}: require[].componentName",
                raw.name
            )));
        }
        let min_version = Version::parse(&req.version).map_err(|e| Error::BadVersion {
            ref_: req.component_name.clone(),
            version: req.version.clone(),
            reason: e.to_string(),
        })?;
        required.push(RequestedDep {
            name: req.component_name.clone(),
            min_version,
        });
    }

    let visibility: Visibility = obj.visibility.iter().cloned().collect();
    Ok((raw.name.clone(), version, required, visibility))
}

/// Projects a raw component into a `DepMeta`, filling in whatever
/// `match_meta` this processor is responsible for.
pub trait MatchProcessor {
    fn project(&self, raw: &RawComponent) -> Result<DepMeta>;
}

/// A processor that attaches no match metadata; every component matches
/// every [`crate::matcher::Matcher`] unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProcessor;

impl MatchProcessor for NoopProcessor {
    fn project(&self, raw: &RawComponent) -> Result<DepMeta> {
        let (name, version, required, visibility) = project_common(raw)?;
        Ok(DepMeta {
            name,
            version,
            required,
            visibility,
            match_meta: None,
        })
    }
}

/// A processor that copies a component's annotation map verbatim into
/// [`AnnotationMeta`], for use with [`crate::matcher::AnnotationMatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AnnotationProcessor;

impl MatchProcessor for AnnotationProcessor {
    fn project(&self, raw: &RawComponent) -> Result<DepMeta> {
        let (name, version, required, visibility) = project_common(raw)?;
        // A component with no annotations opts out of matcher filtering just
        // like one that never went through this processor at all; a present
        // but empty AnnotationMeta would instead fail every `match` key.
        let match_meta = if raw.annotations.is_empty() {
            None
        } else {
            Some(MatchMeta::Annotation(AnnotationMeta {
                annotations: raw.annotations.clone(),
            }))
        };
        Ok(DepMeta {
            name,
            version,
            required,
            visibility,
            match_meta,
        })
    }
}
