//! Resource providers and the lookup helpers generated code calls.

use std::rc::Rc;

use thiserror::Error;
use wire_ir::{ResourceKey, TypeName};

use crate::{BindError, Handle};

/// A lookup provider failed (as opposed to finding nothing).
#[derive(Debug, Error)]
#[error("lookup of {key} failed: {message}")]
pub struct LookupError {
    pub key: ResourceKey,
    pub message: String,
}

/// A generic context able to resolve plain resource values.
pub trait ResourceContext {
    fn resolve(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError>;
}

/// A concrete resource source (a view tree root) handing out handles.
pub trait ResourceSource {
    fn lookup(&self, key: &ResourceKey) -> Result<Option<Handle>, LookupError>;

    /// The context this source lives in.
    fn context(&self) -> Rc<dyn ResourceContext>;
}

fn require(
    found: Option<Handle>,
    key: &ResourceKey,
    field: &str,
    required: bool,
) -> Result<Option<Handle>, BindError> {
    match found {
        None if required => Err(BindError::MissingRequired {
            field: field.to_owned(),
            key: key.clone(),
        }),
        found => Ok(found),
    }
}

/// Look up the handle for `field` in `source`.
pub fn find_handle(
    source: &dyn ResourceSource,
    key: &ResourceKey,
    field: &str,
    required: bool,
) -> Result<Option<Handle>, BindError> {
    let found = source.lookup(key)?;
    tracing::trace!(%key, field, found = found.is_some(), "handle lookup");
    require(found, key, field, required)
}

/// Resolve the resource value for `field` in `context`.
pub fn find_resource(
    context: &dyn ResourceContext,
    key: &ResourceKey,
    field: &str,
    required: bool,
) -> Result<Option<Handle>, BindError> {
    let found = context.resolve(key)?;
    tracing::trace!(%key, field, found = found.is_some(), "resource lookup");
    require(found, key, field, required)
}

/// Check a looked-up handle against the field's declared type.
pub fn cast_handle(
    handle: Option<Handle>,
    expected: &TypeName,
    field: &str,
) -> Result<Option<Handle>, BindError> {
    match handle {
        Some(handle) if !handle.is_a(expected) => Err(BindError::IncompatibleHandle {
            field: field.to_owned(),
            expected: expected.clone(),
            found: handle.type_name().clone(),
        }),
        handle => Ok(handle),
    }
}
