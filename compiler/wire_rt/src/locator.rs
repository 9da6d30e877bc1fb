//! Runtime binder lookup.
//!
//! The locator answers "which binder handles this target?" by walking the
//! target's declared type chain until a binder is found or a boundary
//! namespace is reached. Every answer, including "none", is memoized for
//! each type visited on the walk, so a type is resolved at most once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wire_ir::TypeName;

use crate::{
    BindError, BinderFactory, NoopUnbinder, ResourceSource, Target, TypeResolver, Unbinder,
};

/// Configuration for the locator.
#[derive(Clone, Debug)]
pub struct LocatorConfig {
    /// Namespaces whose types never carry binders; the walk stops there.
    pub boundary_prefixes: Vec<String>,
    /// Trace each step of the type walk at debug level.
    pub debug: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            boundary_prefixes: vec!["android.".into(), "androidx.".into(), "java.".into()],
            debug: false,
        }
    }
}

impl LocatorConfig {
    #[must_use]
    pub fn with_boundary_prefixes<S: Into<String>>(
        mut self,
        prefixes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.boundary_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Cache counters.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct LocatorStats {
    /// Walks answered from the cache.
    pub hits: usize,
    /// Resolver queries made for uncached types.
    pub misses: usize,
}

pub struct Locator<R: TypeResolver> {
    resolver: R,
    boundary_prefixes: Vec<String>,
    debug: Cell<bool>,
    cache: RefCell<FxHashMap<TypeName, Option<BinderFactory>>>,
    stats: Cell<LocatorStats>,
}

impl<R: TypeResolver> Locator<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, LocatorConfig::default())
    }

    pub fn with_config(resolver: R, config: LocatorConfig) -> Self {
        Locator {
            resolver,
            boundary_prefixes: config.boundary_prefixes,
            debug: Cell::new(config.debug),
            cache: RefCell::new(FxHashMap::default()),
            stats: Cell::new(LocatorStats::default()),
        }
    }

    /// Bind `target`'s annotated fields using `source`.
    ///
    /// Returns a no-op unbinder when no binder exists for the target's
    /// type or any ancestor up to the boundary. Errors raised while the
    /// binder runs are returned unchanged.
    pub fn bind(
        &self,
        target: &Target,
        source: Rc<dyn ResourceSource>,
    ) -> Result<Box<dyn Unbinder>, BindError> {
        let ty = target.try_borrow()?.type_name();
        match self.find_factory(&ty) {
            Some(factory) => factory(target, source),
            None => {
                if self.debug.get() {
                    tracing::debug!(target_type = %ty, "no binder found, returning no-op unbinder");
                }
                Ok(Box::new(NoopUnbinder))
            }
        }
    }

    /// Bind a target that is its own source: a container's root source,
    /// or else the target itself.
    pub fn bind_self(&self, target: &Target) -> Result<Box<dyn Unbinder>, BindError> {
        let source = {
            let borrowed = target.try_borrow()?;
            borrowed
                .root_source()
                .or_else(|| borrowed.as_source())
                .ok_or_else(|| BindError::NoSource {
                    target: borrowed.type_name(),
                    derivation: wire_ir::SourceDerivation::TargetAsSource,
                })?
        };
        self.bind(target, source)
    }

    /// Bind `target` against the root source of another container, such as
    /// a fragment bound against the window of its host.
    pub fn bind_from(
        &self,
        target: &Target,
        container: &Target,
    ) -> Result<Box<dyn Unbinder>, BindError> {
        let source = {
            let container = container.try_borrow()?;
            container.root_source().ok_or_else(|| BindError::NoSource {
                target: container.type_name(),
                derivation: wire_ir::SourceDerivation::TargetRootSource,
            })?
        };
        self.bind(target, source)
    }

    /// Find the binder factory for `ty`, walking supertypes.
    pub fn find_factory(&self, ty: &TypeName) -> Option<BinderFactory> {
        let debug = self.debug.get();
        let mut walked = Vec::new();
        let mut current = ty.clone();

        let found = loop {
            let cached = self.cache.borrow().get(&current).cloned();
            if let Some(cached) = cached {
                self.count(|stats| stats.hits += 1);
                if debug {
                    tracing::debug!(ty = %current, found = cached.is_some(), "HIT: cached binder");
                }
                break cached;
            }

            self.count(|stats| stats.misses += 1);
            if let Some(factory) = self.resolver.find_binder(&current) {
                if debug {
                    tracing::debug!(ty = %current, "HIT: loaded binder");
                }
                walked.push(current);
                break Some(factory);
            }

            if self.is_boundary(&current) {
                if debug {
                    tracing::debug!(ty = %current, "MISS: reached boundary namespace");
                }
                walked.push(current);
                break None;
            }

            let parent = self.resolver.supertype(&current);
            if debug {
                tracing::debug!(ty = %current, "not found, trying supertype");
            }
            walked.push(current);
            match parent {
                Some(parent) => current = parent,
                None => break None,
            }
        };

        let mut cache = self.cache.borrow_mut();
        for ty in walked {
            cache.insert(ty, found.clone());
        }
        found
    }

    /// Enable or disable tracing of the type walk.
    pub fn set_debug(&self, debug: bool) {
        self.debug.set(debug);
    }

    pub fn stats(&self) -> LocatorStats {
        self.stats.get()
    }

    /// Number of types with a memoized answer.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn is_boundary(&self, ty: &TypeName) -> bool {
        self.boundary_prefixes
            .iter()
            .any(|prefix| ty.in_namespace(prefix))
    }

    fn count(&self, f: impl FnOnce(&mut LocatorStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
