//! Version algebra: parsing and total ordering of component versions.
//!
//! Versions follow SemVer 2.0.0 precedence rules, with two forgiving
//! extensions this codebase's other version-handling code already relies on:
//! a bare `X.Y` is accepted and normalized to `X.Y.0`, and an empty string
//! normalizes to `0.0.0` (used when a dependency requirement omits a minimum
//! version).

use std::cmp::Ordering;
use std::fmt;

use semver::Version as SemVer;

/// A parsed, totally-ordered component version.
///
/// Wraps [`semver::Version`], which already implements SemVer 2.0.0
/// precedence (pre-release identifiers order below the corresponding release,
/// numeric pre-release segments compare numerically, and `build` metadata is
/// ignored for ordering and equality).
#[derive(Debug, Clone, Ord, PartialOrd)]
pub struct Version(SemVer);

// `semver::Version`'s `Ord` already ignores `build` metadata, but its
// `PartialEq`/`Hash` do not, which would leave this newtype's equality
// inconsistent with its ordering (two versions differing only in `build`
// would compare `Equal` yet `!=`). Compare/hash through `cmp` instead so
// `Eq` and `Hash` agree with `Ord`.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.0.cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Version {}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.major.hash(state);
        self.0.minor.hash(state);
        self.0.patch.hash(state);
        self.0.pre.hash(state);
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(String);

impl Version {
    /// The zero version, used when a dependency omits a minimum version.
    pub fn zero() -> Self {
        Version(SemVer::new(0, 0, 0))
    }

    /// Parse a version string, normalizing `X.Y` to `X.Y.0` and an empty
    /// string to `0.0.0`.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let normalized = normalize(raw);
        SemVer::parse(&normalized)
            .map(Version)
            .map_err(|e| ParseError(format!("{:?}: {}", raw, e)))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

/// Normalizes the forgiving input forms this crate accepts before handing
/// the string to a strict SemVer parser: `""` -> `"0.0.0"`, `"X.Y"` ->
/// `"X.Y.0"`. A string already in `X.Y.Z[-pre][+build]` form passes through
/// unchanged.
fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return "0.0.0".to_string();
    }
    // Only the bare dotted-numeric prefix counts toward the X.Y.Z arity; a
    // pre-release or build suffix after the second segment means the input
    // was already X.Y.Z-shaped (e.g. "1.2-alpha" is not something we rewrite,
    // since it is not a form this resolver is specified to accept).
    let core = raw.split(['-', '+']).next().unwrap_or(raw);
    if core.matches('.').count() == 1 && core == raw {
        format!("{}.0", raw)
    } else {
        raw.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0.major, self.0.minor, self.0.patch)?;
        if !self.0.pre.is_empty() {
            write!(f, "-{}", self.0.pre)?;
        }
        Ok(())
    }
}

/// Total-order comparison exposed as a free function for readability at call
/// sites that would otherwise read as `a.cmp(&b)` out of context.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}
