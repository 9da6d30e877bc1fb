//! Direct execution of binder definitions.
//!
//! An `InterpretedBinder` behaves exactly like the code the renderer emits
//! for the same `BinderDef`: the base binder is constructed first, then the
//! target's fields are looked up and assigned in declaration order, and
//! `unbind` clears them again before chaining to the base.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use wire_ir::{BinderDef, FieldKind, LookupDef, SourceDerivation, SuperArg, TypeName};

use crate::{
    cast_handle, find_handle, find_resource, target_as_context, target_as_source, target_context,
    target_root_source, BindError, ResourceContext, ResourceSource, Target, UnbindError, Unbinder,
};

/// Binder definitions keyed by binder name.
pub type DefTable = FxHashMap<TypeName, Rc<BinderDef>>;

/// The canonical constructor's second argument.
#[derive(Clone)]
pub enum SourceArg {
    Source(Rc<dyn ResourceSource>),
    Context(Rc<dyn ResourceContext>),
}

impl SourceArg {
    fn context(&self) -> Rc<dyn ResourceContext> {
        match self {
            SourceArg::Source(source) => source.context(),
            SourceArg::Context(context) => Rc::clone(context),
        }
    }
}

pub struct InterpretedBinder {
    def: Rc<BinderDef>,
    target: Option<Target>,
    base: Option<Box<InterpretedBinder>>,
}

impl InterpretedBinder {
    /// The canonical constructor.
    pub fn new(
        defs: &DefTable,
        def: Rc<BinderDef>,
        target: Target,
        arg: SourceArg,
    ) -> Result<Self, BindError> {
        let base = match (def.base(), def.canonical.super_call) {
            (Some(base_name), Some(super_arg)) => {
                let base_def =
                    defs.get(base_name)
                        .cloned()
                        .ok_or_else(|| BindError::MissingBase {
                            binder: def.name.clone(),
                            base: base_name.clone(),
                        })?;
                let base_arg = match (super_arg, &arg) {
                    (SuperArg::Source, SourceArg::Source(source)) => {
                        SourceArg::Source(Rc::clone(source))
                    }
                    (SuperArg::Source, SourceArg::Context(_)) => {
                        return Err(BindError::SourceRequired {
                            member: base_name.to_string(),
                        })
                    }
                    (SuperArg::ContextFromSource | SuperArg::Context, arg) => {
                        SourceArg::Context(arg.context())
                    }
                };
                let base = InterpretedBinder::new(defs, base_def, Rc::clone(&target), base_arg)?;
                Some(Box::new(base))
            }
            _ => None,
        };

        for lookup in &def.canonical.lookups {
            let value = Self::look_up(lookup, &arg)?;
            target.try_borrow_mut()?.assign(&lookup.field, value)?;
        }

        Ok(InterpretedBinder {
            def,
            target: Some(target),
            base,
        })
    }

    /// The role convenience constructor: derives the canonical argument
    /// from the target itself.
    pub fn for_target(
        defs: &DefTable,
        def: Rc<BinderDef>,
        target: Target,
    ) -> Result<Self, BindError> {
        let Some(ctor) = def.convenience.first() else {
            return Err(BindError::NoConvenienceCtor {
                binder: def.name.clone(),
            });
        };
        let arg = match ctor.derivation {
            SourceDerivation::TargetAsSource => SourceArg::Source(target_as_source(&target)?),
            SourceDerivation::TargetRootSource => SourceArg::Source(target_root_source(&target)?),
            SourceDerivation::TargetAsContext => SourceArg::Context(target_as_context(&target)?),
            SourceDerivation::TargetContext => SourceArg::Context(target_context(&target)?),
        };
        Self::new(defs, def, target, arg)
    }

    pub fn def(&self) -> &BinderDef {
        &self.def
    }

    /// Whether `unbind` has not run yet.
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    fn look_up(
        lookup: &LookupDef,
        arg: &SourceArg,
    ) -> Result<Option<crate::Handle>, BindError> {
        let found = match lookup.kind {
            FieldKind::Handle => {
                let SourceArg::Source(source) = arg else {
                    return Err(BindError::SourceRequired {
                        member: lookup.field.clone(),
                    });
                };
                find_handle(&**source, &lookup.key, &lookup.field, lookup.required)?
            }
            FieldKind::Resource => {
                find_resource(&*arg.context(), &lookup.key, &lookup.field, lookup.required)?
            }
        };
        match &lookup.cast {
            Some(expected) => cast_handle(found, expected, &lookup.field),
            None => Ok(found),
        }
    }
}

impl Unbinder for InterpretedBinder {
    fn unbind(&mut self) -> Result<(), UnbindError> {
        let target = self.target.take().ok_or(UnbindError::AlreadyCleared)?;
        {
            let mut target = target.try_borrow_mut().map_err(BindError::from)?;
            for field in &self.def.unbind.clears {
                target.assign(field, None)?;
            }
        }
        if self.def.unbind.chain_to_base {
            if let Some(base) = self.base.as_mut() {
                base.unbind()?;
            }
        }
        Ok(())
    }
}
