use pretty_assertions::assert_eq;
use wire_diagnostic::{ElementRef, ErrorCode};
use wire_ir::BinderDef;
use wire_rt::{BinderRegistry, TypeResolver};

use super::*;
use crate::introspect::{Annotation, MemberDecl, Modifiers, TypeDecl, TypeRef};
use crate::render::CratePaths;
use crate::sink::{EmitError, MemorySink, RegistrySink};

fn view(name: &str, id: i32) -> MemberDecl {
    MemberDecl::field(name, TypeRef::declared("android.widget.TextView"))
        .annotated(Annotation::keyed("BindView", id))
}

fn ty(name: &str) -> TypeName {
    TypeName::parse(name)
}

/// Fails for one binder, keeps the rest in memory.
struct FailingSink {
    fail_for: TypeName,
    inner: MemorySink,
}

impl EmissionSink for FailingSink {
    fn write_binder(&mut self, origin: &TypeName, def: &BinderDef) -> Result<(), EmitError> {
        if origin == &self.fail_for {
            return Err(EmitError::RegistryBusy);
        }
        self.inner.write_binder(origin, def)
    }
}

#[test]
fn emits_one_binder_per_type_parents_first() {
    let universe = TypeUniverse::platform()
        .with(
            TypeDecl::class("com.example.Child")
                .extends("com.example.Base")
                .member(view("body", 2)),
        )
        .with(
            TypeDecl::class("com.example.Base")
                .extends("android.app.Activity")
                .member(view("title", 1)),
        );
    let mut sink = MemorySink::new();

    let output = Processor::new(&universe).process_universe(&universe, &mut sink);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.emitted, vec![ty("com.example.Base"), ty("com.example.Child")]);

    let child = sink.get(&ty("com.example.Child_ViewBinding")).unwrap();
    assert!(child.contains("base: crate::com::example::Base_ViewBinding,"));
}

#[test]
fn duplicate_key_reports_once_and_emits_nothing() {
    let universe = TypeUniverse::platform().with(
        TypeDecl::class("com.example.Main")
            .member(view("title", 1))
            .member(view("subtitle", 1)),
    );
    let mut sink = MemorySink::new();

    let output = Processor::new(&universe).process_universe(&universe, &mut sink);
    assert_eq!(output.diagnostics.len(), 1);
    let diag = &output.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E1006);
    assert!(diag.message.contains("'title'"));
    assert!(diag.message.contains("com.example.Main.subtitle"));
    assert!(output.emitted.is_empty());
    assert!(sink.is_empty());
}

#[test]
fn failed_type_takes_its_local_subtypes_with_it() {
    let universe = TypeUniverse::platform()
        .with(
            TypeDecl::class("com.example.Base")
                .member(view("title", 1))
                .member(view("hidden", 2).with_modifiers(Modifiers::PRIVATE)),
        )
        .with(
            TypeDecl::class("com.example.Child")
                .extends("com.example.Base")
                .member(view("body", 3)),
        )
        .with(TypeDecl::class("com.example.Other").member(view("icon", 4)));
    let mut sink = MemorySink::new();

    let output = Processor::new(&universe).process_universe(&universe, &mut sink);
    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1001]);
    assert_eq!(output.emitted, vec![ty("com.example.Other")]);
    assert!(output.has_errors());
}

#[test]
fn subtype_of_type_with_no_valid_binding_is_not_emitted() {
    let universe = TypeUniverse::platform()
        .with(
            TypeDecl::class("com.example.Base")
                .member(view("hidden", 1).with_modifiers(Modifiers::PRIVATE)),
        )
        .with(
            TypeDecl::class("com.example.Child")
                .extends("com.example.Base")
                .member(view("body", 2)),
        );
    let mut sink = MemorySink::new();

    let output = Processor::new(&universe).process_universe(&universe, &mut sink);
    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1001]);
    assert!(output.emitted.is_empty());
    assert!(sink.is_empty());
}

#[test]
fn emission_failure_is_reported_against_its_type_only() {
    let universe = TypeUniverse::platform()
        .with(TypeDecl::class("com.example.Main").member(view("title", 1)))
        .with(TypeDecl::class("com.example.Other").member(view("icon", 2)));
    let mut sink = FailingSink {
        fail_for: ty("com.example.Main"),
        inner: MemorySink::new(),
    };

    let output = Processor::new(&universe).process_universe(&universe, &mut sink);
    assert_eq!(output.emitted, vec![ty("com.example.Other")]);
    assert_eq!(output.diagnostics.len(), 1);
    let diag = &output.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E2002);
    assert_eq!(diag.element, Some(ElementRef::Type(ty("com.example.Main"))));
    assert!(diag.message.contains("binder registry is in use"));
    assert_eq!(sink.inner.len(), 1);
}

#[test]
fn round_sees_only_the_elements_it_is_given() {
    let universe = TypeUniverse::platform()
        .with(TypeDecl::class("lib.ui.Screen").member(view("toolbar", 1)))
        .with(
            TypeDecl::class("com.example.Main")
                .extends("lib.ui.Screen")
                .member(view("title", 2)),
        );
    let elements = vec![AnnotatedElement::new(ty("com.example.Main"), "title", "BindView")];
    let mut sink =
        MemorySink::new().with_crate_paths(CratePaths::new().with_extern("lib.ui", "ui_lib"));

    let output = Processor::new(&universe).process_round(&elements, &mut sink);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.emitted, vec![ty("com.example.Main")]);
    let main = sink.get(&ty("com.example.Main_ViewBinding")).unwrap();
    assert!(main.contains(
        "let base = ::ui_lib::Screen_ViewBinding::new(Rc::clone(&target), Rc::clone(&source))?;"
    ));
}

#[test]
fn custom_annotation_names_are_honoured() {
    let universe = TypeUniverse::platform().with(
        TypeDecl::class("com.example.Main").member(
            MemberDecl::field("title", TypeRef::declared("android.widget.TextView"))
                .annotated(Annotation::keyed("Wire", 1)),
        ),
    );
    let config = ProcessorConfig::default().with_annotation(crate::config::BindingAnnotation::new(
        "Wire",
        wire_ir::FieldKind::Handle,
    ));
    let mut sink = MemorySink::new();

    let output = Processor::with_config(&universe, config).process_universe(&universe, &mut sink);
    assert_eq!(output.emitted, vec![ty("com.example.Main")]);
}

#[test]
fn report_writes_diagnostics_and_summary() {
    let universe = TypeUniverse::platform().with(
        TypeDecl::class("com.example.Main")
            .member(view("title", 1))
            .member(view("subtitle", 1)),
    );
    let output = Processor::new(&universe).process_universe(&universe, &mut MemorySink::new());

    let mut emitter = wire_diagnostic::emitter::TerminalEmitter::new(Vec::new(), false);
    output.report(&mut emitter);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.starts_with("error[E1006]: Attempt to use @BindView"));
    assert!(text.contains("  --> com.example.Main.subtitle\n"));
    assert!(text.ends_with("error: 1 error emitted\n"));
}

#[test]
fn error_limit_drops_reports_but_still_fails_types() {
    let universe = TypeUniverse::platform()
        .with(TypeDecl::class("com.example.A").member(view("a", 1)).member(view("b", 1)))
        .with(TypeDecl::class("com.example.B").member(view("c", 2)).member(view("d", 2)));
    let config = wire_diagnostic::queue::DiagnosticConfig {
        error_limit: 1,
        deduplicate: true,
    };

    let output = Processor::new(&universe)
        .with_diagnostics(config)
        .process_universe(&universe, &mut MemorySink::new());
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.emitted.is_empty());
}

fn launcher_universe() -> TypeUniverse {
    TypeUniverse::platform()
        .with(
            TypeDecl::class("com.example.Main")
                .extends("android.app.Activity")
                .member(view("title", 1)),
        )
        .with(TypeDecl::class("com.example.Launcher").extends("com.example.Main"))
}

#[test]
fn universe_round_declares_supertypes_of_every_known_type() {
    let universe = launcher_universe();
    let mut registry = BinderRegistry::new();

    let output = Processor::new(&universe)
        .process_universe(&universe, &mut RegistrySink::new(&mut registry));
    assert!(output.diagnostics.is_empty());
    assert_eq!(
        registry.supertype(&ty("com.example.Launcher")),
        Some(ty("com.example.Main"))
    );
    assert_eq!(
        registry.supertype(&ty("com.example.Main")),
        Some(ty("android.app.Activity"))
    );
    assert_eq!(
        registry.supertype(&ty("android.app.Activity")),
        Some(ty("android.content.Context"))
    );
}

#[test]
fn element_round_declares_chains_of_emitted_types_only() {
    let universe = launcher_universe();
    let elements = universe.annotated_elements(&["BindView"]);
    let mut registry = BinderRegistry::new();

    let output =
        Processor::new(&universe).process_round(&elements, &mut RegistrySink::new(&mut registry));
    assert_eq!(output.emitted, vec![ty("com.example.Main")]);
    assert_eq!(
        registry.supertype(&ty("com.example.Main")),
        Some(ty("android.app.Activity"))
    );
    assert_eq!(registry.supertype(&ty("com.example.Launcher")), None);
}
