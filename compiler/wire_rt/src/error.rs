//! Runtime binding errors.
//!
//! "No binder for this type" is not an error; it yields a `NoopUnbinder`.
//! Everything here is a defect in generated code, a broken resource
//! provider, or a caller violating a precondition, and propagates unchanged.

use std::cell::{BorrowError, BorrowMutError};

use thiserror::Error;
use wire_ir::{ResourceKey, SourceDerivation, TypeName};

use crate::LookupError;

#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(
        "Required handle with ID {key} for field '{field}' was not found. \
         If this handle is optional add '@Nullable' to the field."
    )]
    MissingRequired { field: String, key: ResourceKey },

    #[error("handle of type {found} bound to field '{field}' is not a {expected}")]
    IncompatibleHandle {
        field: String,
        expected: TypeName,
        found: TypeName,
    },

    #[error("target {target} has no bindable field '{field}'")]
    UnknownField { target: TypeName, field: String },

    #[error("'{member}' needs a resource source but the binder was given a context")]
    SourceRequired { member: String },

    #[error("target {target} cannot provide {derivation:?}")]
    NoSource {
        target: TypeName,
        derivation: SourceDerivation,
    },

    #[error("binder {binder} extends {base}, which is not registered")]
    MissingBase { binder: TypeName, base: TypeName },

    #[error("binder {binder} has no constructor taking only the target")]
    NoConvenienceCtor { binder: TypeName },

    #[error("target is mutably borrowed elsewhere")]
    TargetBorrowed(#[from] BorrowError),

    #[error("target is borrowed elsewhere")]
    TargetBorrowedMut(#[from] BorrowMutError),
}

#[derive(Debug, Error)]
pub enum UnbindError {
    #[error("Bindings already cleared.")]
    AlreadyCleared,

    #[error(transparent)]
    Clear(#[from] BindError),
}
