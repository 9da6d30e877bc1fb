use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use wire_ir::{
    BinderDef, BinderSuper, CanonicalCtor, ConvenienceCtor, FieldKind, LookupDef, ResourceKey,
    SourceDerivation, SourceParam, TargetRole, TypeName, UnbindDef,
};

use super::*;
use crate::fixtures::{text_view, Screen, Widgets};
use crate::{BinderRegistry, NoopUnbinder, UnbindError};

/// Resolver stub that counts binder queries.
#[derive(Default)]
struct CountingResolver {
    binders: FxHashMap<TypeName, BinderFactory>,
    supertypes: FxHashMap<TypeName, TypeName>,
    queries: Cell<usize>,
    built: Rc<Cell<usize>>,
}

impl CountingResolver {
    fn with_binder(mut self, ty: &str) -> Self {
        let built = Rc::clone(&self.built);
        let factory: BinderFactory =
            Rc::new(move |_target: &Target, _source: Rc<dyn ResourceSource>| {
                built.set(built.get() + 1);
                Ok(Box::new(NoopUnbinder) as Box<dyn Unbinder>)
            });
        self.binders.insert(TypeName::parse(ty), factory);
        self
    }

    fn with_failing_binder(mut self, ty: &str) -> Self {
        let factory: BinderFactory = Rc::new(|_target: &Target, _source: Rc<dyn ResourceSource>| {
            Err(BindError::MissingRequired {
                field: "title".into(),
                key: ResourceKey::Id(1),
            })
        });
        self.binders.insert(TypeName::parse(ty), factory);
        self
    }

    fn with_super(mut self, ty: &str, supertype: &str) -> Self {
        self.supertypes
            .insert(TypeName::parse(ty), TypeName::parse(supertype));
        self
    }
}

impl TypeResolver for CountingResolver {
    fn find_binder(&self, ty: &TypeName) -> Option<BinderFactory> {
        self.queries.set(self.queries.get() + 1);
        self.binders.get(ty).cloned()
    }

    fn supertype(&self, ty: &TypeName) -> Option<TypeName> {
        self.supertypes.get(ty).cloned()
    }
}

fn window() -> Rc<dyn ResourceSource> {
    Rc::new(Widgets::default())
}

#[test]
fn repeated_binds_resolve_once() {
    let resolver = CountingResolver::default().with_binder("com.example.Main");
    let locator = Locator::new(resolver);
    let (_screen, target) = Screen::new("com.example.Main", &[]).into_target();

    for _ in 0..5 {
        locator.bind(&target, window()).unwrap();
    }

    assert_eq!(locator.resolver().queries.get(), 1);
    assert_eq!(locator.resolver().built.get(), 5);
    assert_eq!(locator.stats(), LocatorStats { hits: 4, misses: 1 });
}

#[test]
fn no_binder_yields_noop_unbinder() {
    let resolver = CountingResolver::default()
        .with_super("com.example.Plain", "android.app.Activity")
        .with_super("android.app.Activity", "java.lang.Object");
    let locator = Locator::new(resolver);
    let (_screen, target) = Screen::new("com.example.Plain", &[]).into_target();

    let mut unbinder = locator.bind(&target, window()).unwrap();
    unbinder.unbind().unwrap();
    unbinder.unbind().unwrap();

    // The walk stops at the boundary type without asking for java.lang.Object.
    assert_eq!(locator.resolver().queries.get(), 2);
    assert_eq!(locator.cached_len(), 2);

    locator.bind(&target, window()).unwrap();
    assert_eq!(locator.resolver().queries.get(), 2);
    assert_eq!(locator.stats().hits, 1);
}

#[test]
fn walk_ends_at_root_without_supertype() {
    let locator = Locator::new(CountingResolver::default());
    assert!(locator.find_factory(&TypeName::parse("com.example.Orphan")).is_none());
    assert_eq!(locator.stats(), LocatorStats { hits: 0, misses: 1 });
}

#[test]
fn subclass_uses_ancestor_binder_and_caches_every_step() {
    let resolver = CountingResolver::default()
        .with_binder("com.example.Base")
        .with_super("com.example.Leaf", "com.example.Middle")
        .with_super("com.example.Middle", "com.example.Base");
    let locator = Locator::new(resolver);
    let (_screen, leaf) = Screen::new("com.example.Leaf", &[]).into_target();
    let (_screen, middle) = Screen::new("com.example.Middle", &[]).into_target();

    locator.bind(&leaf, window()).unwrap();
    assert_eq!(locator.resolver().queries.get(), 3);
    assert_eq!(locator.cached_len(), 3);

    locator.bind(&middle, window()).unwrap();
    assert_eq!(locator.resolver().queries.get(), 3);
    assert_eq!(locator.resolver().built.get(), 2);
}

#[test]
fn partial_walk_reuses_cached_ancestor() {
    let resolver = CountingResolver::default()
        .with_binder("com.example.Base")
        .with_super("com.example.Left", "com.example.Base")
        .with_super("com.example.Right", "com.example.Base");
    let locator = Locator::new(resolver);

    assert!(locator.find_factory(&TypeName::parse("com.example.Left")).is_some());
    assert!(locator.find_factory(&TypeName::parse("com.example.Right")).is_some());

    assert_eq!(locator.resolver().queries.get(), 3);
    assert_eq!(locator.stats(), LocatorStats { hits: 1, misses: 3 });
}

#[test]
fn custom_boundary_prefixes() {
    let resolver = CountingResolver::default()
        .with_binder("org.base.Root")
        .with_super("org.app.Main", "org.base.Root");
    let config = LocatorConfig::default().with_boundary_prefixes(["org.app."]);
    let locator = Locator::with_config(resolver, config);

    assert!(locator.find_factory(&TypeName::parse("org.app.Main")).is_none());
    assert_eq!(locator.resolver().queries.get(), 1);
}

#[test]
fn factory_errors_propagate() {
    let resolver = CountingResolver::default().with_failing_binder("com.example.Main");
    let locator = Locator::new(resolver);
    let (_screen, target) = Screen::new("com.example.Main", &[]).into_target();

    let result = locator.bind(&target, window());
    assert!(matches!(result, Err(BindError::MissingRequired { .. })));
}

#[test]
fn set_debug_toggles_tracing() {
    let locator = Locator::with_config(
        CountingResolver::default(),
        LocatorConfig::default().with_debug(true),
    );
    assert!(locator.debug.get());
    locator.set_debug(false);
    assert!(!locator.debug.get());
    assert!(locator.find_factory(&TypeName::parse("java.lang.Object")).is_none());
}

fn title_binder(target: &str) -> BinderDef {
    let target = TypeName::parse(target);
    BinderDef {
        name: target.binder_name(),
        is_final: true,
        supertype: BinderSuper::Unbinder,
        call_super_on_unbind: false,
        convenience: vec![ConvenienceCtor {
            role: TargetRole::Container,
            derivation: SourceDerivation::TargetRootSource,
        }],
        canonical: CanonicalCtor {
            param: SourceParam::Source,
            super_call: None,
            lookups: vec![LookupDef {
                field: "title".into(),
                key: ResourceKey::Id(1),
                kind: FieldKind::Handle,
                cast: None,
                required: true,
            }],
        },
        unbind: UnbindDef {
            clears: vec!["title".into()],
            chain_to_base: false,
        },
        target,
    }
}

#[test]
fn bind_self_runs_registered_definition() {
    let mut registry = BinderRegistry::new();
    assert!(registry.register_def(title_binder("com.example.Main")));
    assert!(registry.contains(&TypeName::parse("com.example.Main_ViewBinding")));
    let locator = Locator::new(registry);

    let window = Widgets::default().with(1, text_view("title"));
    let (screen, target) = Screen::new("com.example.Main", &["title"])
        .in_window(window)
        .into_target();

    let mut unbinder = locator.bind_self(&target).unwrap();
    assert!(screen.borrow().field("title").is_some());

    unbinder.unbind().unwrap();
    assert!(screen.borrow().field("title").is_none());
    assert!(matches!(unbinder.unbind(), Err(UnbindError::AlreadyCleared)));
}

#[test]
fn bind_self_without_source_fails() {
    let locator = Locator::new(BinderRegistry::new());
    let (_screen, target) = Screen::new("com.example.Main", &[]).into_target();

    assert!(matches!(
        locator.bind_self(&target),
        Err(BindError::NoSource { .. })
    ));
}

#[test]
fn registry_walks_declared_supertypes() {
    let mut registry = BinderRegistry::new();
    registry.register_def(title_binder("com.example.Base"));
    registry.declare_supertype(
        TypeName::parse("com.example.Detail"),
        TypeName::parse("com.example.Base"),
    );
    let locator = Locator::new(registry);

    let window: Rc<dyn ResourceSource> = Rc::new(Widgets::default().with(1, text_view("t")));
    let (screen, target) = Screen::new("com.example.Detail", &["title"]).into_target();

    locator.bind(&target, window).unwrap();
    assert!(screen.borrow().field("title").is_some());
}

#[test]
fn bind_from_uses_the_container_root_source() {
    let mut registry = BinderRegistry::new();
    registry.register_def(title_binder("com.example.Panel"));
    let locator = Locator::new(registry);

    let host = Widgets::default().with(1, text_view("host title"));
    let (_host, container) = Screen::new("com.example.Host", &[])
        .in_window(host)
        .into_target();
    let (panel, target) = Screen::new("com.example.Panel", &["title"]).into_target();

    let mut unbinder = locator.bind_from(&target, &container).unwrap();
    assert!(panel.borrow().field("title").is_some());
    unbinder.unbind().unwrap();
    assert!(panel.borrow().field("title").is_none());
}

#[test]
fn bind_from_container_without_root_source_fails() {
    let locator = Locator::new(BinderRegistry::new());
    let (_host, container) = Screen::new("com.example.Host", &[]).into_target();
    let (_panel, target) = Screen::new("com.example.Panel", &["title"]).into_target();

    let Err(err) = locator.bind_from(&target, &container) else {
        panic!("binding should fail without a root source");
    };
    assert!(matches!(
        err,
        BindError::NoSource {
            ref target,
            derivation: SourceDerivation::TargetRootSource,
        } if target == &TypeName::parse("com.example.Host")
    ));
}
