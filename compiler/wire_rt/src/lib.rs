//! Wire runtime - binder registry and locator
//!
//! Generated binders (or binder definitions interpreted directly) are filed
//! in a `BinderRegistry` at program start. `Locator::bind` then finds the
//! binder for any target by walking the target's type chain, caching the
//! answer per type.
//!
//! # Architecture
//!
//! ```text
//! BinderRegistry        (binder name -> factory, type -> supertype)
//!        ↓
//!    Locator            (type -> Option<factory>, memoized)
//!        ↓
//!   Box<dyn Unbinder>   (no-op when no binder exists up to the boundary)
//! ```
//!
//! # Thread Affinity
//!
//! Targets are `Rc<RefCell<_>>` and the locator cache is a `RefCell`, so
//! none of these types are `Send` or `Sync`: all binding and unbinding
//! happens on the thread that owns the targets. No locking is involved.

mod error;
#[cfg(test)]
mod fixtures;
mod handle;
mod interpret;
mod locator;
mod registry;
mod source;
mod target;
mod unbinder;

pub use error::{BindError, UnbindError};
pub use handle::Handle;
pub use interpret::{DefTable, InterpretedBinder, SourceArg};
pub use locator::{Locator, LocatorConfig, LocatorStats};
pub use registry::{BinderFactory, BinderRegistry, TypeResolver};
pub use source::{
    cast_handle, find_handle, find_resource, LookupError, ResourceContext, ResourceSource,
};
pub use target::{
    target_as_context, target_as_source, target_context, target_root_source, Bindable, Target,
};
pub use unbinder::{NoopUnbinder, Unbinder};

// Generated binders name keys and types through these.
pub use wire_ir::{ResourceKey, TypeName};
