//! Type introspection.
//!
//! The processor never inspects source code itself. Everything it knows
//! about declared types (kinds, modifiers, supertypes, members and their
//! annotations) comes through `TypeIntrospector`. `TypeUniverse` is the
//! in-memory implementation used by embedders and tests.
//!
//! # Design
//!
//! - Declarations indexed by name (`FxHashMap`), plus insertion order for
//!   deterministic element discovery
//! - Subtype checks follow both supertype and interface edges and tolerate
//!   malformed (cyclic) graphs

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use wire_ir::{ResourceKey, TypeName};

bitflags! {
    /// Declaration modifiers the processor cares about.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        const PRIVATE = 1 << 0;
        const STATIC = 1 << 1;
        const FINAL = 1 << 2;
        const ABSTRACT = 1 << 3;
    }
}

/// The kind of a declared type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// A member's declared type as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    /// A declared (class or interface) type.
    Declared(TypeName),
    /// A type variable, checked through its upper bound.
    TypeVar { name: String, bound: Box<TypeRef> },
    /// A primitive such as `int`.
    Primitive(String),
    /// A type the compiler could not resolve yet (generated elsewhere).
    Unresolved(String),
}

impl TypeRef {
    pub fn declared(qualified: &str) -> Self {
        TypeRef::Declared(TypeName::parse(qualified))
    }

    pub fn type_var(name: impl Into<String>, bound: TypeRef) -> Self {
        TypeRef::TypeVar {
            name: name.into(),
            bound: Box::new(bound),
        }
    }

    /// Strip type variables down to their bound.
    pub fn erased(&self) -> &TypeRef {
        match self {
            TypeRef::TypeVar { bound, .. } => bound.erased(),
            other => other,
        }
    }

    /// The type name a generated field assignment refers to.
    ///
    /// Primitives and unresolved types get a package-less name.
    pub fn type_name(&self) -> TypeName {
        match self.erased() {
            TypeRef::Declared(name) => name.clone(),
            TypeRef::Primitive(name) | TypeRef::Unresolved(name) => TypeName::parse(name),
            TypeRef::TypeVar { name, .. } => TypeName::new("", name.clone()),
        }
    }
}

/// An annotation on a member.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Annotation {
    /// Simple name without the `@`.
    pub name: String,
    /// The annotation's key argument, if it has a usable one.
    pub key: Option<ResourceKey>,
}

impl Annotation {
    /// A marker annotation with no arguments.
    pub fn marker(name: impl Into<String>) -> Self {
        Annotation {
            name: name.into(),
            key: None,
        }
    }

    pub fn keyed(name: impl Into<String>, key: impl Into<ResourceKey>) -> Self {
        Annotation {
            name: name.into(),
            key: Some(key.into()),
        }
    }
}

/// A declared field.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
}

impl MemberDecl {
    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        MemberDecl {
            name: name.into(),
            ty,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

/// A declared type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDecl {
    pub name: TypeName,
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub supertype: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub members: Vec<MemberDecl>,
}

impl TypeDecl {
    pub fn class(qualified: &str) -> Self {
        Self::of_kind(qualified, DeclKind::Class)
    }

    pub fn interface(qualified: &str) -> Self {
        Self::of_kind(qualified, DeclKind::Interface)
    }

    pub fn of_kind(qualified: &str, kind: DeclKind) -> Self {
        TypeDecl {
            name: TypeName::parse(qualified),
            kind,
            modifiers: Modifiers::empty(),
            supertype: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, supertype: &str) -> Self {
        self.supertype = Some(TypeName::parse(supertype));
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(TypeName::parse(interface));
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// An annotated member found in the round, identified by owner and name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AnnotatedElement {
    pub owner: TypeName,
    pub member: String,
    /// The binding annotation this element was discovered through.
    pub annotation: String,
}

impl AnnotatedElement {
    pub fn new(owner: TypeName, member: impl Into<String>, annotation: impl Into<String>) -> Self {
        AnnotatedElement {
            owner,
            member: member.into(),
            annotation: annotation.into(),
        }
    }
}

/// Read access to declared types.
pub trait TypeIntrospector {
    fn type_decl(&self, ty: &TypeName) -> Option<&TypeDecl>;

    /// The direct supertype of `ty`, if known.
    fn supertype(&self, ty: &TypeName) -> Option<TypeName> {
        self.type_decl(ty)?.supertype.clone()
    }

    fn is_interface(&self, ty: &TypeName) -> bool {
        self.type_decl(ty)
            .is_some_and(|decl| decl.kind == DeclKind::Interface)
    }

    /// Whether `ty` is `ancestor` or inherits from it.
    fn is_subtype_of(&self, ty: &TypeName, ancestor: &TypeName) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![ty.clone()];
        while let Some(current) = stack.pop() {
            if &current == ancestor {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(decl) = self.type_decl(&current) {
                stack.extend(decl.supertype.iter().cloned());
                stack.extend(decl.interfaces.iter().cloned());
            }
        }
        false
    }
}

/// In-memory type universe.
#[derive(Clone, Debug, Default)]
pub struct TypeUniverse {
    decls: FxHashMap<TypeName, TypeDecl>,
    /// Insertion order, for deterministic element discovery.
    order: Vec<TypeName>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A universe preloaded with the platform types the default
    /// `ProcessorConfig` refers to.
    pub fn platform() -> Self {
        let mut universe = Self::new();
        for decl in [
            TypeDecl::class("java.lang.Object"),
            TypeDecl::class("java.lang.String").extends("java.lang.Object"),
            TypeDecl::class("java.lang.Integer").extends("java.lang.Object"),
            TypeDecl::class("android.content.Context").extends("java.lang.Object"),
            TypeDecl::class("android.view.View").extends("java.lang.Object"),
            TypeDecl::class("android.widget.TextView").extends("android.view.View"),
            TypeDecl::class("android.widget.Button").extends("android.widget.TextView"),
            TypeDecl::class("android.widget.ImageView").extends("android.view.View"),
            TypeDecl::class("android.view.ViewGroup").extends("android.view.View"),
            TypeDecl::class("android.widget.FrameLayout").extends("android.view.ViewGroup"),
            TypeDecl::class("android.app.Activity").extends("android.content.Context"),
            TypeDecl::class("android.app.Dialog").extends("java.lang.Object"),
        ] {
            universe.insert(decl);
        }
        universe
    }

    /// Add or replace a declaration.
    pub fn insert(&mut self, decl: TypeDecl) {
        if !self.decls.contains_key(&decl.name) {
            self.order.push(decl.name.clone());
        }
        self.decls.insert(decl.name.clone(), decl);
    }

    #[must_use]
    pub fn with(mut self, decl: TypeDecl) -> Self {
        self.insert(decl);
        self
    }

    /// Every declared type, in insertion order.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Every member carrying one of `annotations`, in declaration order.
    ///
    /// A member with several binding annotations is reported once per
    /// annotation.
    pub fn annotated_elements(&self, annotations: &[&str]) -> Vec<AnnotatedElement> {
        let mut elements = Vec::new();
        for name in &self.order {
            let Some(decl) = self.decls.get(name) else {
                continue;
            };
            for member in &decl.members {
                elements.extend(
                    annotations
                        .iter()
                        .filter(|&&annotation| member.has_annotation(annotation))
                        .map(|&annotation| {
                            AnnotatedElement::new(name.clone(), member.name.clone(), annotation)
                        }),
                );
            }
        }
        elements
    }
}

impl TypeIntrospector for TypeUniverse {
    fn type_decl(&self, ty: &TypeName) -> Option<&TypeDecl> {
        self.decls.get(ty)
    }
}
