//! Diagnostic system for the binder processor.
//!
//! Every problem found while collecting, linking, or emitting binders is
//! reported as a `Diagnostic`:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - The element it is attached to (where it went wrong)
//! - Notes (why, or what to do)
//!
//! Errors kill emission for the offending type only; notes never do.
//!
//! # Error Guarantees
//!
//! `ErrorGuaranteed` is type-level proof that at least one error was
//! emitted. Stages that abandon a declaring type return it so the abandon
//! cannot happen silently.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn link(ty) -> Result<BindingSet, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{
    already_bound_key, cyclic_hierarchy, emission_failed, ElementRef, Diagnostic, Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::DiagnosticQueue;
