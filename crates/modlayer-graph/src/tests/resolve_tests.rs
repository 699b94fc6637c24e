use std::sync::Arc;

use super::fixtures::{finder, none, reads, resolve, selected, set};
use crate::{
    Configuration, FindError, ModuleDescriptor, ModuleReference, ResolveError, Resolver,
    ResolverOptions, TraceLog,
};

#[test]
fn test_requires_closure_is_selected() {
    let configuration = resolve(
        [
            ModuleDescriptor::builder("app").requires("lib").build(),
            ModuleDescriptor::builder("lib").requires("core").build(),
            ModuleDescriptor::builder("core").build(),
            ModuleDescriptor::builder("unrelated").build(),
        ],
        &["app"],
    )
    .unwrap();

    assert_eq!(selected(&configuration), set(&["app", "lib", "core"]));
    assert_eq!(reads(&configuration, "app"), set(&["lib"]));
    assert_eq!(reads(&configuration, "lib"), set(&["core"]));
}

#[test]
fn test_static_requires_are_not_resolved() {
    let configuration = resolve(
        [ModuleDescriptor::builder("app")
            .requires_static("annotations")
            .build()],
        &["app"],
    )
    .unwrap();

    assert_eq!(selected(&configuration), set(&["app"]));
    assert!(reads(&configuration, "app").is_empty());
}

#[test]
fn test_static_requires_not_read_even_when_selected() {
    let configuration = resolve(
        [
            ModuleDescriptor::builder("app")
                .requires_static("annotations")
                .build(),
            ModuleDescriptor::builder("annotations").build(),
        ],
        &["app", "annotations"],
    )
    .unwrap();

    assert!(reads(&configuration, "app").is_empty());
}

#[test]
fn test_root_not_found() {
    let err = resolve([ModuleDescriptor::builder("app").build()], &["missing"]).unwrap_err();
    assert_eq!(
        err.as_find(),
        Some(&FindError::NotFound {
            name: "missing".to_string(),
            required_by: None,
        })
    );
}

#[test]
fn test_required_module_not_found() {
    let err = resolve(
        [ModuleDescriptor::builder("app").requires("lib").build()],
        &["app"],
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "module lib not found, required by app");
}

#[test]
fn test_before_finder_takes_precedence() {
    let before = finder([ModuleReference::new(ModuleDescriptor::builder("lib").build())
        .with_location("before")]);
    let after = finder([
        ModuleReference::new(ModuleDescriptor::builder("lib").build()).with_location("after"),
        ModuleReference::new(ModuleDescriptor::builder("app").requires("lib").build())
            .with_location("after"),
    ]);

    let mut resolver = Resolver::new(before, vec![], after, ResolverOptions::default()).unwrap();
    resolver.resolve(["app"]).unwrap();
    let configuration = resolver.finish().unwrap();

    let lib = configuration.find_module("lib").unwrap();
    assert_eq!(lib.reference().location(), Some("before"));
    let app = configuration.find_module("app").unwrap();
    assert_eq!(app.reference().location(), Some("after"));
}

#[test]
fn test_root_found_in_parent_is_not_selected_again() {
    let parent = Configuration::resolve(
        finder([ModuleDescriptor::builder("lib").build()]),
        vec![],
        none(),
        ["lib"],
        ResolverOptions::default(),
    )
    .unwrap();

    let after = finder([ModuleDescriptor::builder("lib").build()]);
    let mut resolver =
        Resolver::new(none(), vec![parent.clone()], after, ResolverOptions::default()).unwrap();
    let bound = resolver.resolve(["lib"]).unwrap();
    assert!(bound.is_empty());

    let child = resolver.finish().unwrap();
    assert!(child.is_empty());
    assert_eq!(
        child.find_module("lib").unwrap().configuration(),
        parent.id()
    );
}

#[test]
fn test_before_finder_overrides_parent() {
    let parent = Configuration::resolve(
        finder([ModuleDescriptor::builder("lib").build()]),
        vec![],
        none(),
        ["lib"],
        ResolverOptions::default(),
    )
    .unwrap();

    let mut resolver = Resolver::new(
        finder([ModuleDescriptor::builder("lib").build()]),
        vec![parent.clone()],
        none(),
        ResolverOptions::default(),
    )
    .unwrap();
    resolver.resolve(["lib"]).unwrap();
    let child = resolver.finish().unwrap();

    assert_eq!(selected(&child), set(&["lib"]));
    assert_ne!(child.find_module("lib").unwrap().configuration(), parent.id());
}

#[test]
fn test_target_platform_adopted() {
    let configuration = resolve(
        [
            ModuleDescriptor::builder("app")
                .requires("native")
                .build(),
            ModuleDescriptor::builder("native")
                .target_platform("linux-amd64")
                .build(),
        ],
        &["app"],
    )
    .unwrap();

    assert_eq!(configuration.target_platform(), Some("linux-amd64"));
}

#[test]
fn test_target_platform_conflict() {
    let err = resolve(
        [
            ModuleDescriptor::builder("app")
                .requires("a")
                .requires("b")
                .build(),
            ModuleDescriptor::builder("a")
                .target_platform("linux-amd64")
                .build(),
            ModuleDescriptor::builder("b")
                .target_platform("windows-amd64")
                .build(),
        ],
        &["app"],
    )
    .unwrap_err();

    assert_eq!(
        err.as_find(),
        Some(&FindError::ConflictingPlatform {
            module: "b".to_string(),
            platform: "windows-amd64".to_string(),
            established: "linux-amd64".to_string(),
        })
    );
}

#[test]
fn test_parent_platform_conflict_fails_construction() {
    let linux = Configuration::resolve(
        finder([ModuleDescriptor::builder("a")
            .target_platform("linux-amd64")
            .build()]),
        vec![],
        none(),
        ["a"],
        ResolverOptions::default(),
    )
    .unwrap();
    let windows = Configuration::resolve(
        finder([ModuleDescriptor::builder("b")
            .target_platform("windows-amd64")
            .build()]),
        vec![],
        none(),
        ["b"],
        ResolverOptions::default(),
    )
    .unwrap();

    let err = Resolver::new(none(), vec![linux, windows], none(), ResolverOptions::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ResolveError::Find(FindError::ConflictingParentPlatforms { .. })
    ));
}

#[test]
fn test_parent_platform_constrains_children() {
    let parent = Configuration::resolve(
        finder([ModuleDescriptor::builder("base")
            .target_platform("linux-amd64")
            .build()]),
        vec![],
        none(),
        ["base"],
        ResolverOptions::default(),
    )
    .unwrap();

    let err = Configuration::resolve(
        finder([ModuleDescriptor::builder("app")
            .target_platform("macos-aarch64")
            .build()]),
        vec![parent],
        none(),
        ["app"],
        ResolverOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::Find(FindError::ConflictingPlatform { .. })
    ));
}

#[test]
fn test_automatic_module_activates_all_automatic_modules() {
    let configuration = resolve(
        [
            ModuleDescriptor::builder("app").requires("auto1").build(),
            ModuleDescriptor::automatic("auto1").package("auto1").build(),
            ModuleDescriptor::automatic("auto2").package("auto2").build(),
            ModuleDescriptor::builder("explicit").build(),
        ],
        &["app"],
    )
    .unwrap();

    assert_eq!(selected(&configuration), set(&["app", "auto1", "auto2"]));
}

#[test]
fn test_no_automatic_activation_without_automatic_module() {
    let configuration = resolve(
        [
            ModuleDescriptor::builder("app").build(),
            ModuleDescriptor::automatic("auto").package("auto").build(),
        ],
        &["app"],
    )
    .unwrap();

    assert_eq!(selected(&configuration), set(&["app"]));
}

#[test]
fn test_automatic_activation_skips_modules_hidden_by_parent() {
    let parent = Configuration::resolve(
        finder([ModuleDescriptor::automatic("a2").package("a2").build()]),
        vec![],
        none(),
        ["a2"],
        ResolverOptions::default(),
    )
    .unwrap();

    let mut resolver = Resolver::new(
        finder([
            ModuleDescriptor::builder("app").requires("a1").build(),
            ModuleDescriptor::automatic("a1").package("a1").build(),
        ]),
        vec![Arc::clone(&parent)],
        finder([
            ModuleDescriptor::automatic("a2").package("a2.shadowed").build(),
            ModuleDescriptor::automatic("a3").package("a3").build(),
        ]),
        ResolverOptions::default(),
    )
    .unwrap();
    resolver.resolve(["app"]).unwrap();
    let configuration = resolver.finish().unwrap();

    assert_eq!(selected(&configuration), set(&["app", "a1", "a3"]));
    let a2 = configuration.find_module("a2").unwrap();
    assert_eq!(a2.configuration(), parent.id());
    assert!(reads(&configuration, "a1").contains("a2"));
}

#[test]
fn test_resolver_poisoned_after_failure() {
    let mut resolver = Resolver::new(
        finder([ModuleDescriptor::builder("app").build()]),
        vec![],
        none(),
        ResolverOptions::default(),
    )
    .unwrap();

    assert!(resolver.resolve(["missing"]).is_err());
    assert!(matches!(
        resolver.resolve(["app"]),
        Err(ResolveError::Poisoned)
    ));
    assert!(matches!(resolver.finish(), Err(ResolveError::Poisoned)));
}

#[test]
fn test_resolve_returns_newly_selected() {
    let mut resolver = Resolver::new(
        finder([
            ModuleDescriptor::builder("a").requires("c").build(),
            ModuleDescriptor::builder("b").requires("c").build(),
            ModuleDescriptor::builder("c").build(),
        ]),
        vec![],
        none(),
        ResolverOptions::default(),
    )
    .unwrap();

    let first: Vec<String> = resolver
        .resolve(["a"])
        .unwrap()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    let second: Vec<String> = resolver
        .resolve(["b"])
        .unwrap()
        .iter()
        .map(|r| r.name().to_string())
        .collect();

    assert_eq!(first, vec!["a", "c"]);
    assert_eq!(second, vec!["b"]);
}

#[test]
fn test_trace_lines() {
    let log = TraceLog::new();
    let mut resolver = Resolver::new(
        finder([
            ModuleReference::new(ModuleDescriptor::builder("app").requires("lib").build())
                .with_location("mem:app"),
            ModuleDescriptor::builder("lib").build().into(),
        ]),
        vec![],
        none(),
        ResolverOptions::default().trace(log.clone()),
    )
    .unwrap();
    resolver.resolve(["app"]).unwrap();

    assert_eq!(
        log.lines(),
        vec![
            "root module app located (mem:app)".to_string(),
            "module lib located, required by app".to_string(),
        ]
    );
}

#[test]
fn test_fresh_resolvers_agree() {
    let modules = || {
        vec![
            ModuleDescriptor::builder("app")
                .requires("lib")
                .requires("auto")
                .build(),
            ModuleDescriptor::builder("lib")
                .requires_transitive("core")
                .build(),
            ModuleDescriptor::builder("core").build(),
            ModuleDescriptor::automatic("auto").package("auto").build(),
            ModuleDescriptor::automatic("other").package("other").build(),
        ]
    };

    let first = resolve(modules(), &["app"]).unwrap();
    let second = resolve(modules(), &["app"]).unwrap();
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_no_dangling_requires() {
    let parent = Configuration::resolve(
        finder([ModuleDescriptor::builder("base").build()]),
        vec![],
        none(),
        ["base"],
        ResolverOptions::default(),
    )
    .unwrap();

    let configuration = Configuration::resolve(
        finder([
            ModuleDescriptor::builder("app")
                .requires("lib")
                .requires("base")
                .build(),
            ModuleDescriptor::builder("lib")
                .requires("base")
                .requires_static("tools")
                .build(),
        ]),
        vec![Arc::clone(&parent)],
        none(),
        ["app"],
        ResolverOptions::default(),
    )
    .unwrap();

    for module in configuration.modules() {
        for requires in module.descriptor().requires.iter().filter(|r| !r.is_static) {
            assert!(
                configuration.find_module(&requires.name).is_some(),
                "{} requires {} which is neither selected nor inherited",
                module.name(),
                requires.name
            );
        }
    }
}
