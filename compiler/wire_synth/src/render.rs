//! Rust source renderer.
//!
//! Emits one self-contained module per `BinderDef`, written against the
//! `wire_rt` API. Binders become top-level structs named after the binder
//! name (with the nesting separator mangled), and a base binder is held by
//! value so `unbind` can chain to it. Package indexes re-export each binder
//! at `crate::<package path>::<binder>`, so a rendered tree forms the
//! source of one crate. Bases from other crates are reached through
//! [`CratePaths`].
//!
//! ```text
//! pub struct Main_ViewBinding { target: Option<Target>, base: Base_ViewBinding }
//!   for_target(target)             convenience constructor (primary role)
//!   new(target, source | context)  canonical constructor
//!   impl Unbinder                  clear own fields, then base.unbind()
//! pub fn register(&mut BinderRegistry)
//! ```
//!
//! A package index also declares the supertype of every type in that
//! package, so the runtime walk reaches ancestors of types without binders.

use wire_ir::{
    BinderDef, FieldKind, LookupDef, ResourceKey, SourceDerivation, SourceParam, SuperArg,
    TypeName, NESTED_SEPARATOR,
};

/// First line of every rendered file.
pub const HEADER: &str = "// Generated code from wire. Do not modify!";

/// Source writer with indentation tracking.
struct SourceWriter {
    indent: usize,
    output: String,
}

impl SourceWriter {
    fn new() -> Self {
        SourceWriter {
            indent: 0,
            output: String::with_capacity(2048),
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line with indentation and newline.
    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn open(&mut self, line: &str) {
        self.writeln(line);
        self.indent();
    }

    fn close(&mut self, line: &str) {
        self.dedent();
        self.writeln(line);
    }

    fn finish(self) -> String {
        self.output
    }
}

/// Rust identifier for a binder struct (`Outer$Inner_ViewBinding` -> `Outer__Inner_ViewBinding`).
pub fn struct_ident(binder: &TypeName) -> String {
    binder
        .names()
        .join("__")
        .replace(NESTED_SEPARATOR, "__")
}

/// File module holding one rendered binder.
///
/// `Outer$Inner_ViewBinding` -> `outer_inner_viewbinding`
pub fn module_ident(binder: &TypeName) -> String {
    binder
        .names()
        .join("_")
        .replace(NESTED_SEPARATOR, "_")
        .to_ascii_lowercase()
}

/// Module path a rendered binder is re-exported at, relative to the crate root.
pub fn module_path(binder: &TypeName) -> String {
    CratePaths::default().module_path(binder)
}

/// Crates holding binders that rendered code refers to but does not define.
///
/// Packages are mapped by prefix; the longest matching prefix wins. Any
/// package not mapped is expected in the crate being rendered.
#[derive(Clone, Debug, Default)]
pub struct CratePaths {
    externs: Vec<(String, String)>,
}

impl CratePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binders under `package` live in crate `krate`, laid out by the
    /// remaining package segments.
    #[must_use]
    pub fn with_extern(mut self, package: impl Into<String>, krate: impl Into<String>) -> Self {
        let krate = krate.into();
        self.externs
            .push((package.into(), krate.trim_start_matches("::").to_owned()));
        self
    }

    /// Module path `binder` is reachable at from rendered code.
    pub fn module_path(&self, binder: &TypeName) -> String {
        let package = binder.package();
        let mapped = self
            .externs
            .iter()
            .filter_map(|(prefix, krate)| {
                let rest = package.strip_prefix(prefix.as_str())?;
                (rest.is_empty() || rest.starts_with('.')).then_some((prefix.len(), krate, rest))
            })
            .max_by_key(|&(len, _, _)| len);
        let (mut path, rest) = match mapped {
            Some((_, krate, rest)) => (format!("::{krate}"), rest),
            None => (String::from("crate"), package),
        };
        for segment in rest.split('.').filter(|s| !s.is_empty()) {
            path.push_str("::");
            path.push_str(segment);
        }
        path
    }
}

/// Expression constructing `ty` at runtime.
fn type_expr(ty: &TypeName) -> String {
    if !ty.is_nested() {
        return format!("TypeName::new({:?}, {:?})", ty.package(), ty.simple_name());
    }
    let mut names = ty.names().iter();
    let Some(outer) = names.next() else {
        return format!("TypeName::parse({:?})", ty.qualified());
    };
    let mut expr = format!("TypeName::new({:?}, {outer:?})", ty.package());
    for name in names {
        expr.push_str(&format!(".nested({name:?})"));
    }
    expr
}

fn key_expr(key: &ResourceKey) -> String {
    match key {
        ResourceKey::Id(id) => format!("ResourceKey::Id({id})"),
        ResourceKey::Name(name) => format!("ResourceKey::Name({name:?}.to_owned())"),
    }
}

fn param_decl(param: SourceParam) -> &'static str {
    match param {
        SourceParam::Source => "source: Rc<dyn ResourceSource>",
        SourceParam::Context => "context: Rc<dyn ResourceContext>",
    }
}

/// Render the Rust source for one binder, with every base in this crate.
pub fn render(def: &BinderDef) -> String {
    render_with(def, &CratePaths::default())
}

/// Render the Rust source for one binder, resolving bases through `paths`.
pub fn render_with(def: &BinderDef, paths: &CratePaths) -> String {
    let ident = struct_ident(&def.name);
    let base = def
        .base()
        .map(|base| format!("{}::{}", paths.module_path(base), struct_ident(base)));
    let mut out = SourceWriter::new();

    out.writeln(HEADER);
    out.newline();
    out.writeln("use std::rc::Rc;");
    out.newline();
    out.writeln("#[allow(unused_imports)]");
    out.open("use wire_rt::{");
    out.writeln(
        "BindError, BinderRegistry, ResourceContext, ResourceKey, ResourceSource, Target, TypeName,",
    );
    out.writeln("UnbindError, Unbinder,");
    out.close("};");
    out.newline();

    out.writeln(&format!("/// Binds the annotated fields of `{}`.", def.target));
    if def.call_super_on_unbind {
        out.writeln("///");
        out.writeln("/// Binders of subtypes must chain to this binder's `unbind`.");
    }
    out.writeln("#[allow(non_camel_case_types)]");
    out.open(&format!("pub struct {ident} {{"));
    out.writeln("target: Option<Target>,");
    if let Some(base) = &base {
        out.writeln(&format!("base: {base},"));
    }
    out.close("}");
    out.newline();

    out.open(&format!("impl {ident} {{"));
    if let Some(ctor) = def.convenience.first() {
        render_convenience(&mut out, ctor.derivation);
        out.newline();
    }
    render_canonical(&mut out, def, base.as_deref());
    out.close("}");
    out.newline();

    render_unbind(&mut out, def, &ident, base.is_some());
    out.newline();

    render_register(&mut out, def, &ident);
    out.finish()
}

fn render_convenience(out: &mut SourceWriter, derivation: SourceDerivation) {
    let (helper, arg) = match derivation {
        SourceDerivation::TargetAsSource => ("target_as_source", "source"),
        SourceDerivation::TargetRootSource => ("target_root_source", "source"),
        SourceDerivation::TargetAsContext => ("target_as_context", "context"),
        SourceDerivation::TargetContext => ("target_context", "context"),
    };
    out.open("pub fn for_target(target: Target) -> Result<Self, BindError> {");
    out.writeln(&format!("let {arg} = wire_rt::{helper}(&target)?;"));
    out.writeln(&format!("Self::new(target, {arg})"));
    out.close("}");
}

fn render_canonical(out: &mut SourceWriter, def: &BinderDef, base: Option<&str>) {
    let canonical = &def.canonical;
    out.open(&format!(
        "pub fn new(target: Target, {}) -> Result<Self, BindError> {{",
        param_decl(canonical.param)
    ));

    if let (Some(base), Some(super_arg)) = (base, canonical.super_call) {
        let arg = match super_arg {
            SuperArg::Source => "Rc::clone(&source)",
            SuperArg::ContextFromSource => "source.context()",
            SuperArg::Context => "Rc::clone(&context)",
        };
        out.writeln(&format!("let base = {base}::new(Rc::clone(&target), {arg})?;"));
    }

    let needs_context = canonical.param == SourceParam::Source
        && canonical
            .lookups
            .iter()
            .any(|lookup| lookup.kind == FieldKind::Resource);
    if needs_context {
        out.writeln("let context = source.context();");
    }

    for lookup in &canonical.lookups {
        render_lookup(out, lookup);
    }

    if base.is_some() {
        out.writeln("Ok(Self { target: Some(target), base })");
    } else {
        out.writeln("Ok(Self { target: Some(target) })");
    }
    out.close("}");
}

fn render_lookup(out: &mut SourceWriter, lookup: &LookupDef) {
    let key = key_expr(&lookup.key);
    let field = format!("{:?}", lookup.field);
    match lookup.kind {
        FieldKind::Handle => out.writeln(&format!(
            "let value = wire_rt::find_handle(&*source, &{key}, {field}, {})?;",
            lookup.required
        )),
        FieldKind::Resource => out.writeln(&format!(
            "let value = wire_rt::find_resource(&*context, &{key}, {field}, {})?;",
            lookup.required
        )),
    }
    if let Some(cast) = &lookup.cast {
        out.writeln(&format!(
            "let value = wire_rt::cast_handle(value, &{}, {field})?;",
            type_expr(cast)
        ));
    }
    out.writeln(&format!("target.try_borrow_mut()?.assign({field}, value)?;"));
}

fn render_unbind(out: &mut SourceWriter, def: &BinderDef, ident: &str, has_base: bool) {
    out.open(&format!("impl Unbinder for {ident} {{"));
    out.open("fn unbind(&mut self) -> Result<(), UnbindError> {");
    out.writeln("let target = self.target.take().ok_or(UnbindError::AlreadyCleared)?;");
    if def.unbind.clears.is_empty() {
        out.writeln("drop(target);");
    } else {
        out.open("{");
        out.writeln("let mut target = target.try_borrow_mut().map_err(BindError::from)?;");
        for field in &def.unbind.clears {
            out.writeln(&format!("target.assign({field:?}, None)?;"));
        }
        out.close("}");
    }
    if has_base && def.unbind.chain_to_base {
        out.writeln("self.base.unbind()");
    } else {
        out.writeln("Ok(())");
    }
    out.close("}");
    out.close("}");
}

fn render_register(out: &mut SourceWriter, def: &BinderDef, ident: &str) {
    let arg = match def.canonical.param {
        SourceParam::Source => "source",
        SourceParam::Context => "source.context()",
    };
    out.writeln(&format!("/// File `{ident}` in `registry`."));
    out.open("pub fn register(registry: &mut BinderRegistry) {");
    out.open("registry.register_factory(");
    out.writeln(&format!("{},", type_expr(&def.name)));
    out.open("Rc::new(|target: &Target, source: Rc<dyn ResourceSource>| {");
    out.writeln(&format!("let binder = {ident}::new(Rc::clone(target), {arg})?;"));
    out.writeln("Ok(Box::new(binder) as Box<dyn Unbinder>)");
    out.close("}),");
    out.close(");");
    out.close("}");
}

/// Render a package index: sub-package modules, binder modules, and a
/// `register` function filing everything below it.
///
/// `supertypes` holds `(type, supertype)` edges for types in this package.
pub fn render_index(
    packages: &[String],
    binders: &[TypeName],
    supertypes: &[(TypeName, TypeName)],
) -> String {
    let mut out = SourceWriter::new();
    out.writeln(HEADER);

    if !supertypes.is_empty() {
        out.newline();
        out.writeln("use wire_rt::TypeName;");
    }
    if !packages.is_empty() {
        out.newline();
        for package in packages {
            out.writeln(&format!("pub mod {package};"));
        }
    }
    for binder in binders {
        out.newline();
        out.writeln(&format!("mod {};", module_ident(binder)));
        out.writeln(&format!(
            "pub use self::{}::{};",
            module_ident(binder),
            struct_ident(binder)
        ));
    }

    out.newline();
    out.writeln("/// File every binder in this package and below in `registry`.");
    out.open("pub fn register(registry: &mut wire_rt::BinderRegistry) {");
    for package in packages {
        out.writeln(&format!("{package}::register(registry);"));
    }
    for binder in binders {
        out.writeln(&format!("{}::register(registry);", module_ident(binder)));
    }
    for (ty, supertype) in supertypes {
        out.writeln(&format!(
            "registry.declare_supertype({}, {});",
            type_expr(ty),
            type_expr(supertype)
        ));
    }
    out.close("}");
    out.finish()
}
