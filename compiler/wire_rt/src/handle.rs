use std::any::Any;
use std::fmt;
use std::rc::Rc;

use wire_ir::TypeName;

/// A typed reference to a resource handed out by a resource provider.
///
/// The handle carries its concrete type name and every type it conforms
/// to, so generated code can check a field's declared type without a
/// runtime class hierarchy.
#[derive(Clone)]
pub struct Handle {
    type_name: TypeName,
    conforms_to: Rc<[TypeName]>,
    value: Rc<dyn Any>,
}

impl Handle {
    pub fn new<T: Any>(type_name: TypeName, value: T) -> Self {
        Handle {
            type_name,
            conforms_to: Rc::from(Vec::new()),
            value: Rc::new(value),
        }
    }

    /// Declare the supertypes and interfaces this handle satisfies.
    #[must_use]
    pub fn conforming_to(mut self, types: impl IntoIterator<Item = TypeName>) -> Self {
        self.conforms_to = types.into_iter().collect::<Vec<_>>().into();
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Whether the handle is a `ty` (exactly, or through a conformance).
    pub fn is_a(&self, ty: &TypeName) -> bool {
        &self.type_name == ty || self.conforms_to.contains(ty)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Whether both handles point at the same resource.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type_name", &self.type_name)
            .field("conforms_to", &self.conforms_to)
            .finish_non_exhaustive()
    }
}
