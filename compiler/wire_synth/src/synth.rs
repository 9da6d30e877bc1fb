//! Binder synthesizer.
//!
//! Turns one linked `BindingSet` into the `BinderDef` describing its
//! generated binder. The only non-local input is the parent's
//! `needs_source`, which decides what the canonical constructor forwards to
//! the base binder.

use wire_ir::{
    BinderDef, BinderSuper, BindingInfo, BindingSet, CanonicalCtor, ConvenienceCtor, FieldKind,
    LookupDef, SourceDerivation, SourceParam, SuperArg, UnbindDef,
};

use crate::config::ProcessorConfig;

#[tracing::instrument(level = "trace", skip_all, fields(ty = %set.target_type()))]
pub fn synthesize(set: &BindingSet, config: &ProcessorConfig) -> BinderDef {
    let needs_source = set.needs_source();
    let param = if needs_source {
        SourceParam::Source
    } else {
        SourceParam::Context
    };
    let parent = set.parent();

    let super_call = parent.map(|parent| {
        if parent.needs_source() {
            SuperArg::Source
        } else if needs_source {
            SuperArg::ContextFromSource
        } else {
            SuperArg::Context
        }
    });

    let lookups = set
        .declarations()
        .iter()
        .map(|binding| {
            let cast = (binding.kind() == FieldKind::Handle
                && binding.declared_type() != &config.handle_type)
                .then(|| binding.declared_type().clone());
            LookupDef {
                field: binding.name().to_owned(),
                key: binding.key().clone(),
                kind: binding.kind(),
                cast,
                required: binding.is_required(),
            }
        })
        .collect();

    let convenience = set
        .roles()
        .primary()
        .map(|role| ConvenienceCtor {
            role,
            derivation: SourceDerivation::for_role(role, param),
        })
        .into_iter()
        .collect();

    BinderDef {
        name: set.binder_name().clone(),
        target: set.target_type().clone(),
        is_final: set.is_final(),
        supertype: parent.map_or(BinderSuper::Unbinder, |parent| {
            BinderSuper::Base(parent.binder_name().clone())
        }),
        call_super_on_unbind: !set.is_final() && parent.is_none(),
        convenience,
        canonical: CanonicalCtor {
            param,
            super_call,
            lookups,
        },
        unbind: UnbindDef {
            clears: set
                .declarations()
                .iter()
                .map(|binding| binding.name().to_owned())
                .collect(),
            chain_to_base: parent.is_some(),
        },
    }
}
