//! Write lifecycle hooks
//!
//! Resources that need extra work around persistence implement
//! [`LifecycleHooks`]; everything is a no-op by default, so most
//! resources use [`NoHooks`].

/// Hooks called synchronously around a persist operation.
///
/// `creation` distinguishes create from update.
pub trait LifecycleHooks<E>: Send + Sync {
    /// Called before an update binds new data, with the entity still in
    /// its stored state.
    fn store_original(&self, _entity: &E) {}

    /// Called after binding, before the store persists.
    fn pre_persist(&self, _entity: &mut E, _creation: bool) {}

    /// Called after the store persisted successfully.
    fn post_persist(&self, _entity: &E, _creation: bool) {}
}

/// The default: no lifecycle behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<E> LifecycleHooks<E> for NoHooks {}
