//! Annotated types in, bound fields out: one round into a registry, then
//! the runtime locator binds live targets against it.

#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use wire_rt::{
    BindError, Bindable, BinderRegistry, Handle, Locator, LookupError, ResourceContext,
    ResourceKey, ResourceSource, Target, TypeName, UnbindError,
};
use wire_synth::{
    Annotation, MemberDecl, Processor, RegistrySink, TypeDecl, TypeRef, TypeUniverse,
};

#[derive(Default)]
struct Strings(FxHashMap<ResourceKey, Handle>);

impl ResourceContext for Strings {
    fn resolve(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError> {
        Ok(self.0.get(key).cloned())
    }
}

#[derive(Default)]
struct Window {
    views: FxHashMap<ResourceKey, Handle>,
    strings: Rc<Strings>,
}

impl ResourceSource for Window {
    fn lookup(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError> {
        Ok(self.views.get(key).cloned())
    }

    fn context(&self) -> Rc<dyn ResourceContext> {
        Rc::clone(&self.strings) as Rc<dyn ResourceContext>
    }
}

struct Activity {
    ty: TypeName,
    fields: FxHashMap<String, Option<Handle>>,
    window: Rc<Window>,
}

impl Activity {
    fn launch(ty: &str, window: Rc<Window>) -> (Rc<RefCell<Activity>>, Target) {
        let activity = Rc::new(RefCell::new(Activity {
            ty: TypeName::parse(ty),
            fields: ["header", "label", "title"]
                .into_iter()
                .map(|name| (name.to_owned(), None))
                .collect(),
            window,
        }));
        let target: Target = activity.clone();
        (activity, target)
    }

    fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)?
            .as_ref()?
            .downcast_ref::<String>()
            .cloned()
    }
}

impl Bindable for Activity {
    fn type_name(&self) -> TypeName {
        self.ty.clone()
    }

    fn assign(&mut self, field: &str, value: Option<Handle>) -> Result<(), BindError> {
        let Some(slot) = self.fields.get_mut(field) else {
            return Err(BindError::UnknownField {
                target: self.ty.clone(),
                field: field.to_owned(),
            });
        };
        *slot = value;
        Ok(())
    }

    fn root_source(&self) -> Option<Rc<dyn ResourceSource>> {
        Some(Rc::clone(&self.window) as Rc<dyn ResourceSource>)
    }

    fn context(&self) -> Option<Rc<dyn ResourceContext>> {
        Some(self.window.context())
    }
}

fn view_handle(ty: &str, text: &str) -> Handle {
    Handle::new(TypeName::parse(ty), text.to_owned())
        .conforming_to([TypeName::parse("android.view.View")])
}

fn universe() -> TypeUniverse {
    TypeUniverse::platform()
        .with(
            TypeDecl::class("com.example.Main")
                .extends("com.example.BaseActivity")
                .member(
                    MemberDecl::field("title", TypeRef::declared("android.widget.Button"))
                        .annotated(Annotation::keyed("BindView", 2))
                        .annotated(Annotation::marker("Nullable")),
                ),
        )
        .with(
            TypeDecl::class("com.example.BaseActivity")
                .extends("android.app.Activity")
                .member(
                    MemberDecl::field("header", TypeRef::declared("android.widget.TextView"))
                        .annotated(Annotation::keyed("BindView", 1)),
                )
                .member(
                    MemberDecl::field("label", TypeRef::declared("java.lang.String"))
                        .annotated(Annotation::keyed("BindResource", 10)),
                ),
        )
        .with(TypeDecl::class("com.example.Launcher").extends("com.example.Main"))
}

fn window(with_title: bool) -> Rc<Window> {
    let mut window = Window::default();
    window
        .views
        .insert(ResourceKey::Id(1), view_handle("android.widget.TextView", "Header"));
    if with_title {
        window.views.insert(
            ResourceKey::Id(2),
            view_handle("android.widget.Button", "Title").conforming_to([
                TypeName::parse("android.widget.TextView"),
                TypeName::parse("android.view.View"),
            ]),
        );
    }
    let mut strings = Strings::default();
    strings.0.insert(
        ResourceKey::Id(10),
        Handle::new(TypeName::parse("java.lang.String"), "Wire".to_owned()),
    );
    window.strings = Rc::new(strings);
    Rc::new(window)
}

fn build_registry(universe: &TypeUniverse) -> BinderRegistry {
    let mut registry = BinderRegistry::new();
    let output =
        Processor::new(universe).process_universe(universe, &mut RegistrySink::new(&mut registry));
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert_eq!(
        output.emitted,
        vec![
            TypeName::parse("com.example.BaseActivity"),
            TypeName::parse("com.example.Main"),
        ]
    );
    registry
}

#[test]
fn subclass_without_binder_uses_nearest_ancestor_binder() {
    let universe = universe();
    let locator = Locator::new(build_registry(&universe));
    let (activity, target) = Activity::launch("com.example.Launcher", window(true));

    let mut unbinder = locator.bind_self(&target).unwrap();
    {
        let activity = activity.borrow();
        assert_eq!(activity.text("header").as_deref(), Some("Header"));
        assert_eq!(activity.text("title").as_deref(), Some("Title"));
        assert_eq!(activity.text("label").as_deref(), Some("Wire"));
    }

    unbinder.unbind().unwrap();
    assert!(activity.borrow().fields.values().all(Option::is_none));
    assert!(matches!(unbinder.unbind(), Err(UnbindError::AlreadyCleared)));
}

#[test]
fn nullable_field_may_be_missing() {
    let universe = universe();
    let locator = Locator::new(build_registry(&universe));
    let (activity, target) = Activity::launch("com.example.Main", window(false));

    locator.bind_self(&target).unwrap();
    assert_eq!(activity.borrow().text("title"), None);
    assert_eq!(activity.borrow().text("header").as_deref(), Some("Header"));
}

#[test]
fn required_field_missing_fails_the_bind() {
    let universe = universe();
    let locator = Locator::new(build_registry(&universe));
    let (_activity, target) =
        Activity::launch("com.example.BaseActivity", Rc::new(Window::default()));

    let Err(err) = locator.bind_self(&target) else {
        panic!("binding should fail");
    };
    assert!(matches!(&err, BindError::MissingRequired { field, .. } if field == "header"));
}

#[test]
fn repeated_binds_resolve_each_type_once() {
    let universe = universe();
    let locator = Locator::new(build_registry(&universe));

    for _ in 0..3 {
        let (_activity, target) = Activity::launch("com.example.Launcher", window(true));
        locator.bind_self(&target).unwrap();
    }
    let stats = locator.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}

#[test]
fn unrelated_type_gets_noop_unbinder() {
    let universe = universe();
    let locator = Locator::new(build_registry(&universe));
    let (activity, target) = Activity::launch("com.example.Settings", window(true));

    let mut unbinder = locator.bind_self(&target).unwrap();
    unbinder.unbind().unwrap();
    unbinder.unbind().unwrap();
    assert!(activity.borrow().fields.values().all(Option::is_none));
}
