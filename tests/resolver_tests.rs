//! End-to-end resolver scenarios, against the literal universes from the
//! design notes (S1-S6) plus a stress variant for the in-queue open
//! question.


use depresolve::{
    AnnotationMatcher, AnnotationProcessor, ComponentRef, Error, NoopProcessor, ResolveOptions,
    Resolver,
};
use test_utils::{universe, ComponentBuilder};

fn refs(pairs: &[(&str, &str)]) -> Vec<ComponentRef> {
    let mut refs: Vec<ComponentRef> = pairs
        .iter()
        .map(|(n, v)| ComponentRef::new(*n, *v))
        .collect();
    refs.sort();
    refs
}

#[test]
fn s1_single_latest_pick() {
    let components = universe(vec![ComponentBuilder::new("foo", "0.2.0").public()]);
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let result = resolver
        .resolve(&[ComponentRef::new("foo", "")], &ResolveOptions::default())
        .unwrap();
    assert_eq!(result, refs(&[("foo", "0.2.0")]));
}

#[test]
fn s2_two_layer_latest() {
    let components = universe(vec![
        ComponentBuilder::new("foo", "0.2.0").public(),
        ComponentBuilder::new("foo", "0.2.1").public(),
        ComponentBuilder::new("kubernetes", "1.2.0")
            .public()
            .requires("foo", ""),
    ]);
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let result = resolver
        .resolve(&[ComponentRef::new("kubernetes", "")], &ResolveOptions::default())
        .unwrap();
    assert_eq!(result, refs(&[("foo", "0.2.1"), ("kubernetes", "1.2.0")]));
}

fn s3_universe() -> Vec<depresolve::RawComponent> {
    universe(vec![
        ComponentBuilder::new("foo", "0.3.0")
            .public()
            .requires("kubernetes", "1.1.0"),
        ComponentBuilder::new("foo", "0.4.0")
            .public()
            .requires("kubernetes", "1.3.0"),
        ComponentBuilder::new("kubernetes", "1.2.0")
            .public()
            .requires("foo", ""),
    ])
}

#[test]
fn s3_cyclic_forces_parent_downgrade() {
    let components = s3_universe();
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let result = resolver
        .resolve(&[ComponentRef::new("kubernetes", "")], &ResolveOptions::default())
        .unwrap();
    assert_eq!(result, refs(&[("foo", "0.3.0"), ("kubernetes", "1.2.0")]));
}

#[test]
fn s3_stress_requesting_both_roots_directly_matches() {
    // Same universe, but both ends of the cycle are named as roots up front
    // instead of being discovered transitively. Exercises the in_queue
    // membership check: kubernetes is already queued when foo (discovered
    // from kubernetes) would otherwise re-enqueue it.
    let components = s3_universe();
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let result = resolver
        .resolve(
            &[ComponentRef::new("kubernetes", ""), ComponentRef::new("foo", "")],
            &ResolveOptions::default(),
        )
        .unwrap();
    assert_eq!(result, refs(&[("foo", "0.3.0"), ("kubernetes", "1.2.0")]));
}

#[test]
fn s4_default_private_blocks_depending() {
    let components = universe(vec![
        ComponentBuilder::new("foo", "1.2.3"),
        ComponentBuilder::new("bar", "2.0.0").public().requires("foo", ""),
    ]);
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let err = resolver
        .resolve(&[ComponentRef::new("bar", "")], &ResolveOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotVisible { .. }));
}

#[test]
fn s5_fixed_cannot_downgrade() {
    let components = s3_universe();
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let err = resolver
        .resolve(&[ComponentRef::new("foo", "0.4.0")], &ResolveOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::CannotDowngradeFixed(_)));
}

#[test]
fn s6_annotation_matcher_excludes() {
    let components = universe(vec![
        ComponentBuilder::new("ann", "1.0.0")
            .public()
            .annotation("qualified", "true")
            .annotation("channel", "stable"),
        ComponentBuilder::new("ann", "1.1.0")
            .public()
            .annotation("qualified", "true")
            .annotation("bad", "true"),
        ComponentBuilder::new("ann", "1.2.0")
            .public()
            .annotation("channel", "alpha"),
        ComponentBuilder::new("kubernetes", "1.11.0")
            .public()
            .requires("ann", ""),
    ]);
    let resolver = Resolver::new(&components, &AnnotationProcessor).unwrap();

    let matcher = AnnotationMatcher::new()
        .with_match("qualified", vec!["true".to_string()])
        .with_exclude("bad", vec!["true".to_string()]);
    let options = ResolveOptions::default().with_matcher(std::sync::Arc::new(matcher));

    let result = resolver
        .resolve(&[ComponentRef::new("kubernetes", "")], &options)
        .unwrap();
    assert_eq!(result, refs(&[("ann", "1.0.0"), ("kubernetes", "1.11.0")]));
}

#[test]
fn unknown_dependency_name_fails_with_offending_ref() {
    let components = universe(vec![ComponentBuilder::new("bar", "1.0.0")
        .public()
        .requires("missing", "")]);
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let err = resolver
        .resolve(&[ComponentRef::new("bar", "")], &ResolveOptions::default())
        .unwrap_err();
    match err {
        Error::UnknownDependency { requiring, target } => {
            assert_eq!(requiring, ComponentRef::new("bar", "1.0.0"));
            assert_eq!(target, "missing");
        }
        other => panic!("expected UnknownDependency, got {other:?}"),
    }
}

#[test]
fn resolve_is_deterministic_across_repeated_calls() {
    let components = s3_universe();
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let roots = [ComponentRef::new("kubernetes", "")];
    let first = resolver.resolve(&roots, &ResolveOptions::default()).unwrap();
    let second = resolver.resolve(&roots, &ResolveOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn feeding_the_result_back_as_roots_is_idempotent() {
    let components = s3_universe();
    let resolver = Resolver::new(&components, &NoopProcessor).unwrap();
    let first = resolver
        .resolve(&[ComponentRef::new("kubernetes", "")], &ResolveOptions::default())
        .unwrap();
    let second = resolver.resolve(&first, &ResolveOptions::default()).unwrap();
    assert_eq!(first, second);
}
