//! Binding targets.

use std::cell::RefCell;
use std::rc::Rc;

use wire_ir::{SourceDerivation, TypeName};

use crate::{BindError, ResourceContext, ResourceSource};

/// An object whose annotated fields a binder assigns.
///
/// Fields are addressed by their declared name, so a binder generated for
/// an ancestor type can assign fields on any descendant instance.
pub trait Bindable {
    /// The instance's most-derived declared type.
    fn type_name(&self) -> TypeName;

    /// Assign (or clear, with `None`) a bound field.
    fn assign(&mut self, field: &str, value: Option<crate::Handle>) -> Result<(), BindError>;

    /// The target itself as a resource source (view targets).
    fn as_source(&self) -> Option<Rc<dyn ResourceSource>> {
        None
    }

    /// The root source of the target's window (container targets).
    fn root_source(&self) -> Option<Rc<dyn ResourceSource>> {
        None
    }

    /// The target itself as a context (container targets).
    fn as_context(&self) -> Option<Rc<dyn ResourceContext>> {
        None
    }

    /// The context the target lives in.
    fn context(&self) -> Option<Rc<dyn ResourceContext>> {
        None
    }
}

/// Shared handle to a binding target.
pub type Target = Rc<RefCell<dyn Bindable>>;

fn no_source(target: &dyn Bindable, derivation: SourceDerivation) -> BindError {
    BindError::NoSource {
        target: target.type_name(),
        derivation,
    }
}

pub fn target_as_source(target: &Target) -> Result<Rc<dyn ResourceSource>, BindError> {
    let target = target.try_borrow()?;
    target
        .as_source()
        .ok_or_else(|| no_source(&*target, SourceDerivation::TargetAsSource))
}

pub fn target_root_source(target: &Target) -> Result<Rc<dyn ResourceSource>, BindError> {
    let target = target.try_borrow()?;
    target
        .root_source()
        .ok_or_else(|| no_source(&*target, SourceDerivation::TargetRootSource))
}

pub fn target_as_context(target: &Target) -> Result<Rc<dyn ResourceContext>, BindError> {
    let target = target.try_borrow()?;
    target
        .as_context()
        .ok_or_else(|| no_source(&*target, SourceDerivation::TargetAsContext))
}

pub fn target_context(target: &Target) -> Result<Rc<dyn ResourceContext>, BindError> {
    let target = target.try_borrow()?;
    target
        .context()
        .ok_or_else(|| no_source(&*target, SourceDerivation::TargetContext))
}
