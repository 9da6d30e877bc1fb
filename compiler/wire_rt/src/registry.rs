//! Binder registry.
//!
//! Binders are filed under their binder name (see
//! [`TypeName::binder_name`]), so a runtime lookup for a target type only
//! needs the naming contract. Supertype edges are declared separately; the
//! locator walks them when a type has no binder of its own.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wire_ir::{BinderDef, TypeName};

use crate::interpret::{DefTable, InterpretedBinder, SourceArg};
use crate::{BindError, ResourceSource, Target, Unbinder};

/// Constructs a binder for a target from a resource source.
pub type BinderFactory =
    Rc<dyn Fn(&Target, Rc<dyn ResourceSource>) -> Result<Box<dyn Unbinder>, BindError>>;

/// What the locator needs to know about types at runtime.
pub trait TypeResolver {
    /// The binder generated for exactly `ty`, if one exists.
    fn find_binder(&self, ty: &TypeName) -> Option<BinderFactory>;

    /// The declared supertype of `ty`.
    fn supertype(&self, ty: &TypeName) -> Option<TypeName>;
}

#[derive(Default)]
pub struct BinderRegistry {
    factories: FxHashMap<TypeName, BinderFactory>,
    defs: Rc<RefCell<DefTable>>,
    supertypes: FxHashMap<TypeName, TypeName>,
}

impl BinderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a compiled binder under its binder name.
    pub fn register_factory(&mut self, binder_name: TypeName, factory: BinderFactory) {
        tracing::trace!(binder = %binder_name, "registered factory");
        self.factories.insert(binder_name, factory);
    }

    /// File a binder definition to be executed by the interpreter.
    ///
    /// Returns `false` if the table is currently borrowed by a binder under
    /// construction and the definition was not registered.
    pub fn register_def(&mut self, def: BinderDef) -> bool {
        let Ok(mut defs) = self.defs.try_borrow_mut() else {
            return false;
        };
        tracing::trace!(binder = %def.name, "registered definition");
        defs.insert(def.name.clone(), Rc::new(def));
        true
    }

    /// Record that `ty` directly extends `supertype`.
    pub fn declare_supertype(&mut self, ty: TypeName, supertype: TypeName) {
        self.supertypes.insert(ty, supertype);
    }

    /// Whether any binder is filed under `binder_name`.
    pub fn contains(&self, binder_name: &TypeName) -> bool {
        self.factories.contains_key(binder_name)
            || self
                .defs
                .try_borrow()
                .is_ok_and(|defs| defs.contains_key(binder_name))
    }

    pub fn len(&self) -> usize {
        self.factories.len() + self.defs.try_borrow().map_or(0, |defs| defs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn interpreted_factory(&self, def: Rc<BinderDef>) -> BinderFactory {
        let defs = Rc::clone(&self.defs);
        Rc::new(move |target: &Target, source: Rc<dyn ResourceSource>| {
            let defs = defs.try_borrow()?;
            let arg = if def.needs_source() {
                SourceArg::Source(source)
            } else {
                SourceArg::Context(source.context())
            };
            let binder = InterpretedBinder::new(&defs, Rc::clone(&def), Rc::clone(target), arg)?;
            Ok(Box::new(binder) as Box<dyn Unbinder>)
        })
    }
}

impl TypeResolver for BinderRegistry {
    fn find_binder(&self, ty: &TypeName) -> Option<BinderFactory> {
        let binder_name = ty.binder_name();
        if let Some(factory) = self.factories.get(&binder_name) {
            return Some(Rc::clone(factory));
        }
        let def = self.defs.try_borrow().ok()?.get(&binder_name).cloned()?;
        Some(self.interpreted_factory(def))
    }

    fn supertype(&self, ty: &TypeName) -> Option<TypeName> {
        self.supertypes.get(ty).cloned()
    }
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderRegistry")
            .field("factories", &self.factories.len())
            .field("defs", &self.defs.try_borrow().map_or(0, |defs| defs.len()))
            .field("supertypes", &self.supertypes.len())
            .finish()
    }
}
