use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use depresolve::{
    AnnotationMatcher, AnnotationProcessor, ComponentRef, MatchProcessor, NoopProcessor,
    RawComponent, ResolveOptions, Resolver, ResolverConfig,
};
use serde::Deserialize;

/// The JSON document the demonstration CLI reads: a universe of raw
/// components, the roots to resolve, and an optional annotation matcher
/// configuration. This is the only place in the crate that talks to the
/// filesystem.
#[derive(Debug, Deserialize)]
struct UniverseFile {
    components: Vec<RawComponent>,
    roots: Vec<RootSpec>,
    #[serde(default)]
    matcher: Option<MatcherSpec>,
}

#[derive(Debug, Deserialize)]
struct RootSpec {
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize, Default)]
struct MatcherSpec {
    #[serde(default)]
    #[serde(rename = "match")]
    match_: HashMap<String, Vec<String>>,
    #[serde(default)]
    exclude: HashMap<String, Vec<String>>,
}

pub fn run(universe_file: &Path, verbose_conflicts: bool, resolve_timeout: Option<u64>) -> Result<()> {
    let content = fs::read_to_string(universe_file)
        .with_context(|| format!("reading universe file {}", universe_file.display()))?;
    let universe: UniverseFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing universe file {}", universe_file.display()))?;

    let processor: Box<dyn MatchProcessor> = if universe.matcher.is_some() {
        Box::new(AnnotationProcessor)
    } else {
        Box::new(NoopProcessor)
    };

    let resolver = Resolver::new(&universe.components, processor.as_ref())
        .context("building component universe")?;

    let roots: Vec<ComponentRef> = universe
        .roots
        .iter()
        .map(|r| ComponentRef::new(r.name.clone(), r.version.clone()))
        .collect();

    let mut config = ResolverConfig::load().unwrap_or_default();
    if let Some(timeout) = resolve_timeout {
        config.resolution_timeout_seconds = timeout;
    }

    let mut options = ResolveOptions::default();
    if let Some(spec) = &universe.matcher {
        let mut matcher = AnnotationMatcher::new();
        for (key, values) in &spec.match_ {
            matcher = matcher.with_match(key.clone(), values.clone());
        }
        for (key, values) in &spec.exclude {
            matcher = matcher.with_exclude(key.clone(), values.clone());
        }
        options = options.with_matcher(std::sync::Arc::new(matcher));
    }
    if let Some(token) = config.cancellation_token() {
        options = options.with_cancellation(std::sync::Arc::new(token));
    }

    let mut selection = resolver
        .resolve(&roots, &options)
        .map_err(|e| if verbose_conflicts { anyhow::anyhow!("{e:#?}") } else { e.into() })?;
    selection.sort();
    for ref_ in &selection {
        println!("{}", serde_json::to_string(&RefOut::from(ref_))?);
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct RefOut {
    name: String,
    version: String,
}

impl From<&ComponentRef> for RefOut {
    fn from(r: &ComponentRef) -> Self {
        RefOut {
            name: r.name.clone(),
            version: r.version.clone(),
        }
    }
}
