//! Description of one generated binder.
//!
//! A `BinderDef` is what the synthesizer hands to an emission sink. Its
//! only state is the (clearable) target reference; everything else is the
//! shape of its constructors and of `unbind`.
//!
//! ```text
//! DemoActivity_ViewBinding                 implements Unbinder
//!   new_container(target)                  -> canonical(target, target.root_source())
//!   canonical(target, source: Source)      -> target = target; lookups...
//!   unbind()                               -> take target; clear fields
//! ```

use crate::{FieldKind, ResourceKey, TargetRole, TypeName};

/// Type of the canonical constructor's second parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SourceParam {
    /// A concrete resource source.
    Source,
    /// A generic context.
    Context,
}

/// How a convenience constructor derives the canonical argument from the target.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SourceDerivation {
    /// The target is itself the source (`this(target, target)` on a view).
    TargetAsSource,
    /// The target's root source (window content of a container).
    TargetRootSource,
    /// The target is itself the context (a container needing no source).
    TargetAsContext,
    /// The context the target lives in.
    TargetContext,
}

impl SourceDerivation {
    /// The derivation a role uses for a given canonical parameter.
    pub fn for_role(role: TargetRole, param: SourceParam) -> Self {
        match (role, param) {
            (TargetRole::View, SourceParam::Source) => SourceDerivation::TargetAsSource,
            (TargetRole::View | TargetRole::Modal, SourceParam::Context) => {
                SourceDerivation::TargetContext
            }
            (TargetRole::Container | TargetRole::Modal, SourceParam::Source) => {
                SourceDerivation::TargetRootSource
            }
            (TargetRole::Container, SourceParam::Context) => SourceDerivation::TargetAsContext,
        }
    }
}

/// Argument forwarded to the base binder's canonical constructor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SuperArg {
    /// Pass the source through unchanged.
    Source,
    /// Derive a context from the source.
    ContextFromSource,
    /// Pass the context through unchanged.
    Context,
}

/// What a binder extends.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinderSuper {
    /// No parent binder: implements the unbind contract directly.
    Unbinder,
    /// Extends the named parent binder and inherits the contract.
    Base(TypeName),
}

/// Role-specific constructor taking only the target.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConvenienceCtor {
    pub role: TargetRole,
    pub derivation: SourceDerivation,
}

/// One lookup-and-assign statement of the canonical constructor.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LookupDef {
    pub field: String,
    pub key: ResourceKey,
    pub kind: FieldKind,
    /// Declared type to check the handle against; `None` when the field's
    /// type is the source's native handle type.
    pub cast: Option<TypeName>,
    pub required: bool,
}

/// The `(target, source-or-context)` constructor every binder has.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CanonicalCtor {
    pub param: SourceParam,
    /// `None` when there is no base binder.
    pub super_call: Option<SuperArg>,
    /// In declaration order.
    pub lookups: Vec<LookupDef>,
}

/// Body of `unbind()`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UnbindDef {
    /// Fields cleared after the target reference, in declaration order.
    pub clears: Vec<String>,
    /// Call the base binder's `unbind()` last.
    pub chain_to_base: bool,
}

/// A generated binder.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BinderDef {
    pub name: TypeName,
    pub target: TypeName,
    pub is_final: bool,
    pub supertype: BinderSuper,
    /// Subclass binders must call `unbind()` of this binder.
    pub call_super_on_unbind: bool,
    pub convenience: Vec<ConvenienceCtor>,
    pub canonical: CanonicalCtor,
    pub unbind: UnbindDef,
}

impl BinderDef {
    /// The parent binder, if any.
    pub fn base(&self) -> Option<&TypeName> {
        match &self.supertype {
            BinderSuper::Unbinder => None,
            BinderSuper::Base(name) => Some(name),
        }
    }

    /// Whether the canonical constructor takes a concrete source.
    pub fn needs_source(&self) -> bool {
        self.canonical.param == SourceParam::Source
    }
}
