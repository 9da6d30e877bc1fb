//! Hierarchy resolver.
//!
//! Links every collected binding set to its nearest ancestor with bindings.
//! Two passes:
//!
//! 1. External summarization: ancestors outside this round are summarized
//!    farthest first, so a "needs a source" requirement flows down the
//!    chain before a nearer ancestor is decided.
//! 2. Local linking: types are finalized in first-seen order when their
//!    parent is already known; the rest wait on their local parent and are
//!    finalized in topological order. Whatever never becomes ready either
//!    descends from a type whose every binding was rejected, and is dropped
//!    with it, or sits on a cycle and is reported.

use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use wire_diagnostic::{cyclic_hierarchy, DiagnosticQueue};
use wire_ir::{
    BindingInfo, BindingSet, BindingSetBuilder, ExternalBindingInfo, FieldKind, ParentBinding,
    TypeName,
};

use crate::collect::Collected;
use crate::config::ProcessorConfig;
use crate::introspect::TypeIntrospector;

/// Linked binding sets for one round.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Finalized sets; every local parent precedes its children.
    pub sets: Vec<Rc<BindingSet>>,
    /// Types that had to wait for a local parent to be finalized.
    pub deferred: Vec<TypeName>,
    /// Types dropped because a local ancestor has no valid binding.
    pub blocked: Vec<TypeName>,
    /// Summaries of ancestors outside this round.
    pub external: FxHashMap<TypeName, ExternalBindingInfo>,
}

impl Resolution {
    pub fn find(&self, ty: &TypeName) -> Option<&Rc<BindingSet>> {
        self.sets.iter().find(|set| set.target_type() == ty)
    }
}

/// Where a local type's nearest binding ancestor lives.
enum Link {
    Root,
    External(TypeName),
    Local(TypeName),
}

pub struct HierarchyResolver<'a> {
    types: &'a dyn TypeIntrospector,
    config: &'a ProcessorConfig,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(types: &'a dyn TypeIntrospector, config: &'a ProcessorConfig) -> Self {
        HierarchyResolver { types, config }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(types = collected.len()))]
    pub fn resolve(&self, collected: Collected, queue: &mut DiagnosticQueue) -> Resolution {
        let order: Vec<TypeName> = collected.touched().cloned().collect();
        let rejected: FxHashSet<TypeName> = collected.rejected_owners().cloned().collect();
        let local: FxHashSet<TypeName> = order.iter().chain(&rejected).cloned().collect();
        let external = self.summarize_external(&order, &local);
        let builders = collected.into_builders();

        let links: Vec<Link> = builders
            .iter()
            .map(|builder| self.link_for(builder.target_type(), &local, &external))
            .collect();

        let mut linker = Linker {
            names: builders.iter().map(|b| b.target_type().clone()).collect(),
            builders: builders.into_iter().map(Some).collect(),
            finalized: FxHashMap::default(),
            resolution: Resolution::default(),
        };

        // First pass, in first-seen order.
        let mut waiting: FxHashMap<TypeName, Vec<usize>> = FxHashMap::default();
        for (i, link) in links.iter().enumerate() {
            match link {
                Link::Root => linker.finalize(i, None),
                Link::External(parent) => {
                    let info = external.get(parent).cloned().map(ParentBinding::External);
                    linker.finalize(i, info);
                }
                Link::Local(parent) => {
                    if let Some(set) = linker.finalized.get(parent).cloned() {
                        linker.finalize(i, Some(ParentBinding::Local(set)));
                    } else {
                        let ty = linker.names[i].clone();
                        tracing::trace!(%ty, %parent, "waiting on local parent");
                        linker.resolution.deferred.push(ty);
                        waiting.entry(parent.clone()).or_default().push(i);
                    }
                }
            }
        }

        // Deferred types, in topological order over local parent edges.
        let mut ready = Vec::new();
        waiting.retain(|parent, children| {
            let parent_done = linker.finalized.contains_key(parent);
            if parent_done {
                ready.extend(children.iter().copied());
            }
            !parent_done
        });
        ready.sort_unstable();
        let mut ready = VecDeque::from(ready);

        while let Some(i) = ready.pop_front() {
            let Link::Local(parent) = &links[i] else {
                continue;
            };
            let Some(set) = linker.finalized.get(parent).cloned() else {
                continue;
            };
            linker.finalize(i, Some(ParentBinding::Local(set)));
            if let Some(children) = waiting.remove(&linker.names[i]) {
                ready.extend(children);
            }
        }

        // Anything still waiting descends from a rejected type or hangs off
        // a cycle.
        let mut stuck: Vec<usize> = waiting.into_values().flatten().collect();
        stuck.sort_unstable();
        for i in stuck {
            let ty = &linker.names[i];
            let path = cycle_from(ty, &links, &linker.names);
            if path.last().is_some_and(|last| rejected.contains(last)) {
                tracing::debug!(%ty, "not linked: a local ancestor has no valid binding");
                linker.resolution.blocked.push(ty.clone());
                continue;
            }
            tracing::debug!(%ty, "cyclic binding hierarchy");
            queue.emit_error(cyclic_hierarchy(ty, &path));
        }

        let mut resolution = linker.resolution;
        resolution.external = external;
        tracing::debug!(
            finalized = resolution.sets.len(),
            deferred = resolution.deferred.len(),
            blocked = resolution.blocked.len(),
            external = resolution.external.len(),
            "hierarchy resolved"
        );
        resolution
    }

    /// Summarize every ancestor outside this round that declares bindings.
    fn summarize_external(
        &self,
        order: &[TypeName],
        local: &FxHashSet<TypeName>,
    ) -> FxHashMap<TypeName, ExternalBindingInfo> {
        let mut external: FxHashMap<TypeName, ExternalBindingInfo> = FxHashMap::default();

        for ty in order {
            let mut chain = Vec::new();
            let mut seen = FxHashSet::default();
            let mut current = self.types.supertype(ty);
            let mut needs_source = false;
            while let Some(ancestor) = current {
                if local.contains(&ancestor) {
                    break;
                }
                if let Some(info) = external.get(&ancestor) {
                    needs_source = info.needs_source();
                    break;
                }
                if !seen.insert(ancestor.clone()) {
                    break;
                }
                current = self.types.supertype(&ancestor);
                chain.push(ancestor);
            }

            // Farthest ancestor first.
            for ancestor in chain.into_iter().rev() {
                if let Some(info) = self.summarize(&ancestor, needs_source) {
                    needs_source |= info.needs_source();
                    tracing::trace!(
                        %ancestor,
                        needs_source = info.needs_source(),
                        "external binder"
                    );
                    external.insert(ancestor, info);
                }
            }
        }
        external
    }

    /// Summary of one external type, or `None` if it declares no bindings.
    fn summarize(&self, ty: &TypeName, inherited: bool) -> Option<ExternalBindingInfo> {
        let decl = self.types.type_decl(ty)?;
        let mut found = false;
        for member in &decl.members {
            for annotation in &self.config.annotations {
                if !member.has_annotation(&annotation.name) {
                    continue;
                }
                if annotation.kind == FieldKind::Handle {
                    return Some(ExternalBindingInfo::for_type(ty, true));
                }
                found = true;
            }
        }
        found.then(|| ExternalBindingInfo::for_type(ty, inherited))
    }

    /// The nearest ancestor of `ty` that is local or summarized.
    fn link_for(
        &self,
        ty: &TypeName,
        local: &FxHashSet<TypeName>,
        external: &FxHashMap<TypeName, ExternalBindingInfo>,
    ) -> Link {
        let mut seen = FxHashSet::default();
        let mut current = self.types.supertype(ty);
        while let Some(ancestor) = current {
            if local.contains(&ancestor) {
                return Link::Local(ancestor);
            }
            if external.contains_key(&ancestor) {
                return Link::External(ancestor);
            }
            if !seen.insert(ancestor.clone()) {
                break;
            }
            current = self.types.supertype(&ancestor);
        }
        Link::Root
    }
}

struct Linker {
    /// Target type of each builder, by index.
    names: Vec<TypeName>,
    builders: Vec<Option<BindingSetBuilder>>,
    finalized: FxHashMap<TypeName, Rc<BindingSet>>,
    resolution: Resolution,
}

impl Linker {
    fn finalize(&mut self, i: usize, parent: Option<ParentBinding>) {
        let Some(mut builder) = self.builders[i].take() else {
            return;
        };
        if let Some(parent) = parent {
            builder.set_parent(parent);
        }
        let set = Rc::new(builder.build());
        tracing::trace!(ty = %set.target_type(), "binding set finalized");
        self.finalized
            .insert(set.target_type().clone(), Rc::clone(&set));
        self.resolution.sets.push(set);
    }
}

/// The parent path from `ty` until a type repeats.
fn cycle_from(ty: &TypeName, links: &[Link], names: &[TypeName]) -> Vec<TypeName> {
    let parent_of: FxHashMap<&TypeName, &TypeName> = links
        .iter()
        .zip(names)
        .filter_map(|(link, name)| match link {
            Link::Local(parent) => Some((name, parent)),
            Link::Root | Link::External(_) => None,
        })
        .collect();

    let mut path = vec![ty.clone()];
    let mut seen = FxHashSet::default();
    seen.insert(ty.clone());
    let mut current = ty;
    while let Some(&parent) = parent_of.get(current) {
        path.push(parent.clone());
        if !seen.insert(parent.clone()) {
            break;
        }
        current = parent;
    }
    path
}
