//! Diagnostic queue for collecting diagnostics across a processing round.
//!
//! Features:
//! - Aggregation instead of fail-fast: every stage keeps going after an error
//! - Per-type failure tracking, so one bad type never blocks another
//! - Optional error limit and exact-duplicate suppression
//! - `ErrorGuaranteed` proof that errors were emitted

use rustc_hash::FxHashSet;
use wire_ir::TypeName;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors recorded (0 = unlimited).
    ///
    /// Errors past the limit are still counted and still fail their type;
    /// they are only dropped from the report.
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics in emission order.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// let guarantee = queue.emit_error(diagnostic);
/// if queue.is_type_failed(&ty) { /* skip emission for ty */ }
/// let report = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    /// Collected diagnostics.
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes), including dropped ones.
    error_count: usize,
    /// Declaring types that received at least one error.
    failed_types: FxHashSet<TypeName>,
    /// Configuration.
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic of any severity.
    ///
    /// Returns `true` if the diagnostic was recorded, `false` if it was
    /// filtered. Errors mark their owning type as failed either way.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.is_error() {
            self.error_count += 1;
            if let Some(owner) = diag.owner() {
                self.failed_types.insert(owner.clone());
            }
            if self.limit_reached_before_push() {
                return false;
            }
        }

        if self.config.deduplicate && self.diagnostics.contains(&diag) {
            return false;
        }

        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        self.add(diag);
        ErrorGuaranteed::new()
    }

    fn limit_reached_before_push(&self) -> bool {
        let recorded = self.diagnostics.iter().filter(|d| d.is_error()).count();
        self.config.error_limit > 0 && recorded >= self.config.error_limit
    }

    /// Get the number of errors emitted.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Whether `ty` received an error and must not be emitted.
    pub fn is_type_failed(&self, ty: &TypeName) -> bool {
        self.failed_types.contains(ty)
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Return all diagnostics in emission order and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.failed_types.clear();
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
