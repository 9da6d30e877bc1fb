//! Round driver.
//!
//! One round runs every stage over the annotated elements handed in:
//!
//! ```text
//! elements -> collect -> resolve -> synthesize -> sink
//!               |          |                       |
//!               +----------+---- DiagnosticQueue --+
//! ```
//!
//! A type with any error is not emitted, and neither is a type whose local
//! parent was not emitted. Emission failures are reported per type and do
//! not stop the round.
//!
//! After the binders, the sink receives the supertype chain of every emitted
//! type. `process_universe` declares the chain of every known type as well,
//! so subtypes without binders of their own reach their ancestors' binders.

use rustc_hash::FxHashSet;
use wire_diagnostic::emitter::DiagnosticEmitter;
use wire_diagnostic::queue::DiagnosticConfig;
use wire_diagnostic::{emission_failed, Diagnostic, DiagnosticQueue, Severity};
use wire_ir::{BindingInfo, ParentBinding, TypeName};

use crate::collect::Collector;
use crate::config::ProcessorConfig;
use crate::hierarchy::HierarchyResolver;
use crate::introspect::{AnnotatedElement, TypeIntrospector, TypeUniverse};
use crate::sink::EmissionSink;
use crate::synth::synthesize;

/// Result of one processing round.
#[derive(Debug, Default)]
pub struct RoundOutput {
    /// Everything reported this round, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Declaring types whose binder reached the sink.
    pub emitted: Vec<TypeName>,
}

impl RoundOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Write every diagnostic and a summary line to `emitter`.
    pub fn report(&self, emitter: &mut dyn DiagnosticEmitter) {
        emitter.emit_all(&self.diagnostics);
        let count = |severity: Severity| {
            self.diagnostics
                .iter()
                .filter(|d| d.severity == severity)
                .count()
        };
        emitter.emit_summary(count(Severity::Error), count(Severity::Warning));
        emitter.flush();
    }
}

pub struct Processor<'a> {
    types: &'a dyn TypeIntrospector,
    config: ProcessorConfig,
    diagnostics: DiagnosticConfig,
}

impl<'a> Processor<'a> {
    pub fn new(types: &'a dyn TypeIntrospector) -> Self {
        Self::with_config(types, ProcessorConfig::default())
    }

    pub fn with_config(types: &'a dyn TypeIntrospector, config: ProcessorConfig) -> Self {
        Processor {
            types,
            config,
            diagnostics: DiagnosticConfig::default(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process the given elements and hand every surviving binder to `sink`.
    pub fn process_round(
        &self,
        elements: &[AnnotatedElement],
        sink: &mut dyn EmissionSink,
    ) -> RoundOutput {
        self.run(elements, &[], sink)
    }

    /// Process every element of `universe` carrying a configured annotation.
    pub fn process_universe(
        &self,
        universe: &TypeUniverse,
        sink: &mut dyn EmissionSink,
    ) -> RoundOutput {
        let names: Vec<&str> = self
            .config
            .annotations
            .iter()
            .map(|annotation| annotation.name.as_str())
            .collect();
        let elements = universe.annotated_elements(&names);
        let known: Vec<TypeName> = universe.type_names().cloned().collect();
        self.run(&elements, &known, sink)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(elements = elements.len()))]
    fn run(
        &self,
        elements: &[AnnotatedElement],
        known: &[TypeName],
        sink: &mut dyn EmissionSink,
    ) -> RoundOutput {
        let mut queue = DiagnosticQueue::with_config(self.diagnostics.clone());

        let collected = Collector::new(self.types, &self.config).collect(elements, &mut queue);
        let resolution =
            HierarchyResolver::new(self.types, &self.config).resolve(collected, &mut queue);

        let mut skipped: FxHashSet<TypeName> = FxHashSet::default();
        let mut emitted = Vec::new();
        let emit = tracing::debug_span!("emit", sets = resolution.sets.len()).entered();
        for set in &resolution.sets {
            let ty = set.target_type();
            if queue.is_type_failed(ty) {
                tracing::debug!(%ty, "not emitted: type has errors");
                skipped.insert(ty.clone());
                continue;
            }
            if let Some(ParentBinding::Local(parent)) = set.parent() {
                if skipped.contains(parent.target_type()) {
                    tracing::debug!(
                        %ty,
                        parent = %parent.target_type(),
                        "not emitted: parent was skipped"
                    );
                    skipped.insert(ty.clone());
                    continue;
                }
            }

            let def = synthesize(set, &self.config);
            match sink.write_binder(ty, &def) {
                Ok(()) => {
                    tracing::debug!(%ty, binder = %set.binder_name(), "binder emitted");
                    emitted.push(ty.clone());
                }
                Err(err) => {
                    queue.emit_error(emission_failed(ty, &err.to_string()));
                }
            }
        }

        drop(emit);

        self.declare_supertypes(emitted.iter().chain(known), sink, &mut queue);

        RoundOutput {
            diagnostics: queue.flush(),
            emitted,
        }
    }

    /// Hand the supertype chain of each of `types` to `sink`, once per edge.
    fn declare_supertypes<'t>(
        &self,
        types: impl Iterator<Item = &'t TypeName>,
        sink: &mut dyn EmissionSink,
        queue: &mut DiagnosticQueue,
    ) {
        let _declare = tracing::debug_span!("declare").entered();
        let mut declared: FxHashSet<TypeName> = FxHashSet::default();
        for ty in types {
            let mut current = ty.clone();
            while declared.insert(current.clone()) {
                let Some(supertype) = self.types.supertype(&current) else {
                    break;
                };
                if let Err(err) = sink.declare_supertype(&current, &supertype) {
                    queue.emit_error(emission_failed(&current, &err.to_string()));
                    break;
                }
                current = supertype;
            }
        }
        tracing::debug!(types = declared.len(), "supertypes declared");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
