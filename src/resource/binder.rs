//! Form binding seam
//!
//! A [`FormBinder`] maps a raw JSON payload onto an entity, validating as
//! it goes. It stands in for a full form framework: how a resource
//! validates is entirely the binder's business, the writer only needs the
//! outcome.

use serde_json::Value;

use super::form::FormErrors;

/// Binds submitted data onto an entity.
pub trait FormBinder<E>: Send + Sync {
    /// Name prefixing flattened error keys (`user` -> `user_email_...`).
    fn form_name(&self) -> &'static str;

    /// Apply `input` to `entity`, validating each field. `creation` is
    /// true for create requests, letting binders require fields that are
    /// optional on update.
    fn bind(&self, entity: &mut E, input: &Value, creation: bool) -> Result<(), FormErrors>;
}
