//! The component dependency resolver.
//!
//! Builds a single, consistent selection — at most one version per
//! component — out of a universe of versioned components and a user request
//! of root references, preferring the newest eligible version of everything
//! and falling back to the parent when a child's requirement can't be met at
//! the latest pick. See the module-level design notes in the repository's
//! `SPEC_FULL.md` for the full algorithm and its termination argument.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::index::Universe;
use crate::matcher::{AlwaysMatch, Matcher};
use crate::meta::{ComponentRef, DepMeta, MatchProcessor, RawComponent};
use crate::version::Version;

/// Cooperative cancellation, checked once per worklist iteration. See
/// `ResolverConfig::timeout` (`config.rs`) for the convenience adapter that
/// turns a duration into one of these.
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Options recognized by [`Resolver::resolve`]. Future fields may be added;
/// unrecognized tags in a serialized form are ignored rather than rejected.
#[derive(Default, Clone)]
pub struct ResolveOptions {
    /// Filters candidate versions uniformly across the whole call. Defaults
    /// to "always matches" when absent.
    pub matcher: Option<Arc<dyn Matcher>>,
    /// Checked once per worklist iteration; absent means never cancelled.
    pub cancellation: Option<Arc<dyn CancellationToken>>,
}

impl ResolveOptions {
    pub fn with_matcher(mut self, matcher: Arc<dyn Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_cancellation(mut self, token: Arc<dyn CancellationToken>) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn matcher(&self) -> &dyn Matcher {
        self.matcher
            .as_deref()
            .map(|m| m as &dyn Matcher)
            .unwrap_or(&AlwaysMatch)
    }
}

/// Transient, per-resolution state for one chosen component. Lives only for
/// the duration of a single `resolve` call.
#[derive(Debug, Clone)]
struct Node {
    meta: DepMeta,
    min_required: Version,
    fixed: bool,
    children: Vec<ComponentRef>,
}

/// A component dependency resolver built over an immutable universe of
/// versioned components.
///
/// `Resolver` holds no interior mutability and its indexes never change
/// after construction, so it is `Send + Sync`: a shared `Resolver` may be
/// used to service concurrent `resolve` calls from multiple threads, each
/// building its own private selection, as long as any shared `Matcher`
/// passed in via [`ResolveOptions`] is itself safe to share.
pub struct Resolver {
    universe: Universe,
}

impl Resolver {
    /// Builds the sorted index over `components` using `processor` to
    /// project each raw component into a `DepMeta`.
    pub fn new(components: &[RawComponent], processor: &dyn MatchProcessor) -> Result<Self> {
        let universe = Universe::build(components, processor)?;
        Ok(Resolver { universe })
    }

    /// Returns a defensive copy of the component at `ref_`, if known.
    pub fn component(&self, ref_: &ComponentRef) -> Option<DepMeta> {
        self.universe.component(ref_)
    }

    pub fn has_component(&self, ref_: &ComponentRef) -> bool {
        self.universe.has_component(ref_)
    }

    /// Returns defensive copies of every known component.
    pub fn all_components(&self) -> Vec<DepMeta> {
        self.universe.all_components()
    }

    /// All known versions of `name`, ascending.
    pub fn component_versions(&self, name: &str) -> Vec<ComponentRef> {
        self.universe.component_versions(name)
    }

    /// Resolves `roots` into a single consistent selection: at most one
    /// version per component, satisfying every transitive requirement and
    /// visibility rule, preferring the newest eligible version throughout.
    ///
    /// Returns the selection's refs — i.e. the set of every component (root
    /// or transitive) the request pulled in. The order of the returned refs
    /// is not significant; sort it if a deterministic ordering is required.
    pub fn resolve(&self, roots: &[ComponentRef], options: &ResolveOptions) -> Result<Vec<ComponentRef>> {
        let matcher = options.matcher();

        let mut queue: VecDeque<Node> = VecDeque::new();
        let mut in_queue: HashSet<String> = HashSet::new();
        let mut seen_root_names: HashSet<String> = HashSet::new();

        for root in roots {
            if !seen_root_names.insert(root.name.clone()) {
                return Err(Error::DuplicateRoot(root.name.clone()));
            }
            let node = self.seed_root(root, matcher)?;
            in_queue.insert(node.meta.name.clone());
            queue.push_back(node);
        }

        let mut selection: HashMap<String, Node> = HashMap::new();

        while let Some(mut cur) = queue.pop_front() {
            if let Some(token) = &options.cancellation {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            let (children, discovered) = self.visit(&mut cur, matcher, &mut selection)?;
            cur.children = children;
            let name = cur.meta.name.clone();
            in_queue.remove(&name);
            selection.insert(name, cur);

            for node in discovered {
                if !selection.contains_key(&node.meta.name) && !in_queue.contains(&node.meta.name) {
                    in_queue.insert(node.meta.name.clone());
                    queue.push_back(node);
                }
            }
        }

        let mut refs: Vec<ComponentRef> = selection.into_values().map(|n| n.meta.ref_()).collect();
        refs.sort();
        Ok(refs)
    }

    /// Normalizes one requested root into its initial node: *exact* when a
    /// version is given (must be a known ref, pinned and never downgraded),
    /// *latest* when it's empty (resolved against `matcher`).
    ///
    /// Root requests bypass the visibility check that governs ordinary
    /// dependency edges — visibility restricts who may *depend on* a
    /// component, not what the caller may directly ask for.
    fn seed_root(&self, root: &ComponentRef, matcher: &dyn Matcher) -> Result<Node> {
        if root.version.is_empty() {
            let latest = self
                .universe
                .by_name
                .get(&root.name)
                .and_then(|s| s.latest(matcher));
            let meta = latest.ok_or_else(|| Error::NoMatchingLatest(root.name.clone()))?;
            Ok(Node {
                meta: meta.clone(),
                min_required: Version::zero(),
                fixed: false,
                children: Vec::new(),
            })
        } else {
            let meta = self
                .lookup_exact(root)
                .ok_or_else(|| Error::UnknownComponent(root.clone()))?;
            Ok(Node {
                min_required: meta.version.clone(),
                meta,
                fixed: true,
                children: Vec::new(),
            })
        }
    }

    fn lookup_exact(&self, ref_: &ComponentRef) -> Option<DepMeta> {
        let version = Version::parse(&ref_.version).ok()?;
        self.universe
            .component(&ComponentRef::new(ref_.name.clone(), version.to_string()))
    }

    /// Runs the visit/downgrade loop for `cur` until it either succeeds
    /// (returning its picked children and any newly-discovered nodes to
    /// enqueue) or exhausts its downgrade options (returning an error).
    fn visit(
        &self,
        cur: &mut Node,
        matcher: &dyn Matcher,
        selection: &mut HashMap<String, Node>,
    ) -> Result<(Vec<ComponentRef>, Vec<Node>)> {
        loop {
            if cur.meta.version < cur.min_required {
                return Err(Error::UnsatisfiableMinRequirement(cur.meta.ref_()));
            }

            match self.try_visit_once(cur, matcher, selection)? {
                Some(result) => return Ok(result),
                None => self.downgrade(cur, matcher)?,
            }
        }
    }

    /// A single attempt at visiting `cur` at its current version. Returns
    /// `Ok(Some(..))` on success, `Ok(None)` if the version needs to be
    /// downgraded and retried, and `Err` for any hard failure.
    fn try_visit_once(
        &self,
        cur: &Node,
        matcher: &dyn Matcher,
        selection: &mut HashMap<String, Node>,
    ) -> Result<Option<(Vec<ComponentRef>, Vec<Node>)>> {
        let mut candidate_children = Vec::with_capacity(cur.meta.required.len());
        let mut discovered = Vec::new();

        for dep in &cur.meta.required {
            if let Some(picked) = selection.get_mut(&dep.name) {
                if picked.meta.version < dep.min_version {
                    return Ok(None);
                }
                if !picked.meta.visibility.visible_to(&cur.meta.name) {
                    return Err(Error::NotVisible {
                        parent: cur.meta.ref_(),
                        child: picked.meta.ref_(),
                    });
                }
                if dep.min_version > picked.min_required {
                    picked.min_required = dep.min_version.clone();
                }
                candidate_children.push(picked.meta.ref_());
                continue;
            }

            let sorted = self
                .universe
                .by_name
                .get(&dep.name)
                .ok_or_else(|| Error::UnknownDependency {
                    requiring: cur.meta.ref_(),
                    target: dep.name.clone(),
                })?;

            let Some(latest) = sorted.latest(matcher) else {
                return Ok(None);
            };
            if latest.version < dep.min_version {
                return Ok(None);
            }
            if !latest.visibility.visible_to(&cur.meta.name) {
                return Err(Error::NotVisible {
                    parent: cur.meta.ref_(),
                    child: latest.ref_(),
                });
            }

            candidate_children.push(latest.ref_());
            discovered.push(Node {
                meta: latest.clone(),
                min_required: dep.min_version.clone(),
                fixed: false,
                children: Vec::new(),
            });
        }

        Ok(Some((candidate_children, discovered)))
    }

    /// Replaces `cur`'s meta with the previous matching version, or fails if
    /// no such downgrade is available.
    fn downgrade(&self, cur: &mut Node, matcher: &dyn Matcher) -> Result<()> {
        if cur.fixed {
            return Err(Error::CannotDowngradeFixed(cur.meta.ref_()));
        }
        let sorted = self
            .universe
            .by_name
            .get(&cur.meta.name)
            .expect("a node's own name is always present in the universe it was picked from");
        let prev = sorted
            .previous(&cur.meta.version, matcher)
            .ok_or_else(|| Error::NoPreviousVersion(cur.meta.ref_()))?;
        if prev.version < cur.min_required {
            return Err(Error::DowngradeBelowMinRequired(cur.meta.ref_()));
        }
        cur.meta = prev.clone();
        Ok(())
    }
}
