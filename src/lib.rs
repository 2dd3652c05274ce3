//! depresolve - Dependency resolution for versioned, visibility-scoped
//! Kubernetes components
//!
//! Given a universe of component versions — each possibly declaring required
//! dependencies with minimum-version constraints and a visibility policy —
//! and a user request of "roots" (some pinned, some open), this crate
//! produces a single consistent selection: at most one version per
//! component, satisfying every requirement, preferring the newest eligible
//! version, and respecting an orthogonal matcher predicate (e.g.
//! annotation-based channel selection).
//!
//! # Examples
//!
//! ```no_run
//! use depresolve::{ComponentRef, NoopProcessor, ResolveOptions, Resolver, RawComponent};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let components: Vec<RawComponent> = serde_json::from_str(r#"[
//!     {"name": "foo", "version": "0.2.0"}
//! ]"#)?;
//!
//! let resolver = Resolver::new(&components, &NoopProcessor)?;
//! let selection = resolver.resolve(&[ComponentRef::new("foo", "")], &ResolveOptions::default())?;
//! println!("Resolved {} components", selection.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`version`] - SemVer 2.0 version algebra (parse, compare, canonical form)
//! - [`meta`] - the `DepMeta` projection and the `MatchProcessor` contract
//! - [`index`] - the immutable sorted/by-ref universe index
//! - [`matcher`] - the `Matcher` predicate and the annotation-based reference implementation
//! - [`resolver`] - the selection algorithm itself
//! - [`config`] - ambient resolver configuration for the demonstration CLI
//! - [`error`] - error types and result handling

pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod meta;
pub mod resolver;
pub mod version;

pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use index::Universe;
pub use matcher::{AlwaysMatch, AnnotationMatcher, Matcher};
pub use meta::{
    AnnotationMeta, AnnotationProcessor, ComponentRef, DepMeta, MatchMeta, MatchProcessor,
    NoopProcessor, RawComponent, RawObject, RawRequire, RequestedDep, Visibility,
};
pub use resolver::{CancellationToken, ResolveOptions, Resolver};
pub use version::{ParseError, Version};
