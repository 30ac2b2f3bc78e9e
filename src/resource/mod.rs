//! Resource write path
//!
//! Payload binding, lifecycle hooks, and the write controller shared by
//! every resource: [`FormBinder`] maps JSON onto entities, [`FormErrors`]
//! collects validation failures, [`LifecycleHooks`] wraps the persist
//! call, and [`ResourceWriter`] orchestrates create/update/delete.

mod binder;
mod form;
mod hooks;
mod writer;

pub use binder::FormBinder;
pub use form::{FormErrors, FormNode};
pub use hooks::{LifecycleHooks, NoHooks};
pub use writer::{install_flatten_separator, ResourceWriter, DEFAULT_FLATTEN_SEPARATOR};
