//! Per-type binding sets and their parent linkage.
//!
//! A `BindingSetBuilder` is created by the collector for every declaring type
//! with at least one valid annotated field. The hierarchy resolver attaches a
//! parent and calls `build()`; the finished `BindingSet` is consumed once by
//! the synthesizer.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{FieldBinding, ResourceKey, TargetRoles, TypeName};

/// What a child binder needs to know about its parent binder.
pub trait BindingInfo {
    /// Name of the parent's generated binder.
    fn binder_name(&self) -> &TypeName;

    /// Whether the parent's canonical constructor takes a concrete source.
    fn needs_source(&self) -> bool;
}

/// Summary of a binder generated by an earlier compilation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExternalBindingInfo {
    binder_name: TypeName,
    needs_source: bool,
}

impl ExternalBindingInfo {
    /// Summarize the binder of `declaring_type`.
    pub fn for_type(declaring_type: &TypeName, needs_source: bool) -> Self {
        ExternalBindingInfo {
            binder_name: declaring_type.binder_name(),
            needs_source,
        }
    }
}

impl BindingInfo for ExternalBindingInfo {
    fn binder_name(&self) -> &TypeName {
        &self.binder_name
    }

    fn needs_source(&self) -> bool {
        self.needs_source
    }
}

/// The nearest ancestor binder a binding set extends.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParentBinding {
    /// Generated in this round.
    Local(Rc<BindingSet>),
    /// Generated by an earlier compilation.
    External(ExternalBindingInfo),
}

impl BindingInfo for ParentBinding {
    fn binder_name(&self) -> &TypeName {
        match self {
            ParentBinding::Local(set) => set.binder_name(),
            ParentBinding::External(info) => info.binder_name(),
        }
    }

    fn needs_source(&self) -> bool {
        match self {
            ParentBinding::Local(set) => set.needs_source(),
            ParentBinding::External(info) => info.needs_source(),
        }
    }
}

/// All bindings declared by one type, linked to its parent binder.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BindingSet {
    target_type: TypeName,
    binder_name: TypeName,
    is_final: bool,
    roles: TargetRoles,
    declarations: Vec<FieldBinding>,
    parent: Option<ParentBinding>,
}

impl BindingSet {
    /// Start building the set for `target_type`.
    pub fn builder(target_type: TypeName, is_final: bool, roles: TargetRoles) -> BindingSetBuilder {
        BindingSetBuilder::new(target_type, is_final, roles)
    }

    pub fn target_type(&self) -> &TypeName {
        &self.target_type
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn roles(&self) -> TargetRoles {
        self.roles
    }

    /// Declarations in source order.
    pub fn declarations(&self) -> &[FieldBinding] {
        &self.declarations
    }

    pub fn parent(&self) -> Option<&ParentBinding> {
        self.parent.as_ref()
    }

    /// Whether any own declaration needs the concrete source.
    pub fn has_source_bindings(&self) -> bool {
        self.declarations.iter().any(|d| d.kind().needs_source())
    }
}

impl BindingInfo for BindingSet {
    fn binder_name(&self) -> &TypeName {
        &self.binder_name
    }

    /// True if this set or any ancestor binder needs the concrete source.
    fn needs_source(&self) -> bool {
        self.has_source_bindings() || self.parent.as_ref().is_some_and(BindingInfo::needs_source)
    }
}

/// A field was rejected because its key is already bound in the same type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DuplicateKey {
    /// Name of the field that already owns the key.
    pub existing: String,
    /// The field that was not added.
    pub rejected: FieldBinding,
}

/// Mutable accumulator for one declaring type's bindings.
#[derive(Clone, Debug)]
pub struct BindingSetBuilder {
    target_type: TypeName,
    is_final: bool,
    roles: TargetRoles,
    declarations: Vec<FieldBinding>,
    /// Key -> index into `declarations`.
    by_key: FxHashMap<ResourceKey, usize>,
    parent: Option<ParentBinding>,
}

impl BindingSetBuilder {
    pub fn new(target_type: TypeName, is_final: bool, roles: TargetRoles) -> Self {
        BindingSetBuilder {
            target_type,
            is_final,
            roles,
            declarations: Vec::new(),
            by_key: FxHashMap::default(),
            parent: None,
        }
    }

    pub fn target_type(&self) -> &TypeName {
        &self.target_type
    }

    /// Name of the field already bound to `key`, if any.
    pub fn find_existing_binding_name(&self, key: &ResourceKey) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|&idx| self.declarations[idx].name())
    }

    /// Register a field, keeping the first registration on a key collision.
    pub fn add_field(&mut self, binding: FieldBinding) -> Result<(), DuplicateKey> {
        if let Some(existing) = self.find_existing_binding_name(binding.key()) {
            return Err(DuplicateKey {
                existing: existing.to_owned(),
                rejected: binding,
            });
        }
        self.by_key
            .insert(binding.key().clone(), self.declarations.len());
        self.declarations.push(binding);
        Ok(())
    }

    pub fn set_parent(&mut self, parent: ParentBinding) {
        self.parent = Some(parent);
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn build(self) -> BindingSet {
        BindingSet {
            binder_name: self.target_type.binder_name(),
            target_type: self.target_type,
            is_final: self.is_final,
            roles: self.roles,
            declarations: self.declarations,
            parent: self.parent,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
