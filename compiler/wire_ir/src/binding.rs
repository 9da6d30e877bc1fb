//! Per-field binding declarations.

use bitflags::bitflags;

use crate::{ResourceKey, TypeName};

/// What a field binding resolves against.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FieldKind {
    /// A handle looked up from a concrete resource source.
    ///
    /// Any `Handle` binding forces the binder's canonical constructor to
    /// take the source object rather than a bare context.
    Handle,
    /// A plain resource value resolved from a context.
    Resource,
}

impl FieldKind {
    /// Whether binding this field needs the concrete resource source.
    #[inline]
    pub fn needs_source(self) -> bool {
        matches!(self, FieldKind::Handle)
    }
}

/// One annotated field of a declaring type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldBinding {
    key: ResourceKey,
    name: String,
    declared_type: TypeName,
    required: bool,
    kind: FieldKind,
}

impl FieldBinding {
    pub fn new(
        key: ResourceKey,
        name: impl Into<String>,
        declared_type: TypeName,
        required: bool,
        kind: FieldKind,
    ) -> Self {
        FieldBinding {
            key,
            name: name.into(),
            declared_type,
            required,
            kind,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &TypeName {
        &self.declared_type
    }

    /// False when the field carries a nullable marker.
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

bitflags! {
    /// Framework roles a target type plays.
    ///
    /// Each role adds one convenience constructor to the generated binder.
    /// A type may satisfy several (a modal container is rare but legal).
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TargetRoles: u8 {
        /// The target is itself a resource holder (a view).
        const VIEW = 1 << 0;
        /// The target is a top-level container (an activity).
        const CONTAINER = 1 << 1;
        /// The target is a modal container (a dialog).
        const MODAL = 1 << 2;
    }
}

/// A single role, used to label convenience constructors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TargetRole {
    View,
    Container,
    Modal,
}

impl TargetRoles {
    /// The single role that picks the convenience constructor.
    ///
    /// Roles are checked view first, then container, then modal; only the
    /// first match gets a constructor.
    pub fn primary(self) -> Option<TargetRole> {
        if self.contains(TargetRoles::VIEW) {
            Some(TargetRole::View)
        } else if self.contains(TargetRoles::CONTAINER) {
            Some(TargetRole::Container)
        } else if self.contains(TargetRoles::MODAL) {
            Some(TargetRole::Modal)
        } else {
            None
        }
    }
}
