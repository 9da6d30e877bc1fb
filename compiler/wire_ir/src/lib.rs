//! Wire IR - shared binding model
//!
//! This crate holds the types both halves of wire agree on:
//! - `TypeName` and the binder naming convention (`TypeName::binder_name`)
//! - `ResourceKey`, the integer-or-string key carried by a binding annotation
//! - `FieldBinding` and `BindingSet`, the per-type model built at compile time
//! - `BinderDef`, the description of one generated binder
//!
//! # Naming Contract
//!
//! The synthesizer names every generated binder with `binder_name()`, and the
//! runtime registry files factories under the same name. Changing the
//! convention on one side without the other makes correctly annotated types
//! silently fall back to the no-op unbinder, so it lives here and nowhere else.
//!
//! ```text
//! com.example.DemoActivity       -> com.example.DemoActivity_ViewBinding
//! com.example.Outer.Inner        -> com.example.Outer$Inner_ViewBinding
//! ```

mod binder;
mod binding;
mod binding_set;
mod key;
mod type_name;

pub use binder::{
    BinderDef, BinderSuper, CanonicalCtor, ConvenienceCtor, LookupDef, SourceDerivation,
    SourceParam, SuperArg, UnbindDef,
};
pub use binding::{FieldBinding, FieldKind, TargetRole, TargetRoles};
pub use binding_set::{
    BindingInfo, BindingSet, BindingSetBuilder, DuplicateKey, ExternalBindingInfo, ParentBinding,
};
pub use key::ResourceKey;
pub use type_name::{TypeName, BINDER_SUFFIX, NESTED_SEPARATOR};
