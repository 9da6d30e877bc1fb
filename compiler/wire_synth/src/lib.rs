//! Build-time binder synthesizer for wire
//!
//! Turns field annotations on declared types into one binder per declaring
//! type, linked to the binder of its nearest annotated ancestor.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=wire_synth=debug`: Stage summaries and per-type emit decisions.
//!   Example: `RUST_LOG=wire_synth=debug cargo test`
//!
//! - `RUST_LOG=wire_synth=trace`: Every finalized binding set and lookup.
//!
//! - `RUST_LOG=wire_rt=debug`: Runtime locator walks (with `Locator::set_debug`).
//!
//! # Architecture
//!
//! ```text
//! TypeIntrospector ──> Collector ──> HierarchyResolver ──> synthesize ──> EmissionSink
//!  (introspect.rs)    (collect.rs)    (hierarchy.rs)       (synth.rs)     (sink.rs)
//!                                                                          ├ MemorySink
//!                                                                          ├ DirSink (render.rs)
//!                                                                          └ RegistrySink (wire_rt)
//! ```
//!
//! `Processor::process_round` drives the stages and returns every
//! diagnostic reported along the way.

pub mod collect;
pub mod config;
pub mod hierarchy;
pub mod introspect;
pub mod processor;
pub mod render;
pub mod sink;
pub mod synth;

use std::sync::Once;

pub use collect::{Collected, Collector};
pub use config::{BindingAnnotation, ProcessorConfig};
pub use hierarchy::{HierarchyResolver, Resolution};
pub use introspect::{
    AnnotatedElement, Annotation, DeclKind, MemberDecl, Modifiers, TypeDecl, TypeIntrospector,
    TypeRef, TypeUniverse,
};
pub use processor::{Processor, RoundOutput};
pub use render::{render, render_with, CratePaths};
pub use sink::{DirSink, EmissionSink, EmitError, MemorySink, RegistrySink};
pub use synth::synthesize;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=wire_synth=debug` or `RUST_LOG=wire_synth=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
