//! Resource write orchestration
//!
//! [`ResourceWriter`] runs the write path shared by every resource:
//! bind the payload, run lifecycle hooks, persist through the entity
//! store, and translate failures into problem responses. Binding
//! failures become 422s carrying one flattened code per invalid field;
//! a rejected delete becomes a 400 `<slug>.not_deletable`.
//!
//! # Example
//!
//! ```rust,ignore
//! let writer = ResourceWriter::new(store, UserBinder, "user");
//! let user = writer.create(&payload).await?;
//! ```

use std::marker::PhantomData;
use std::sync::OnceLock;

use serde_json::Value;

use crate::problem::ApiError;
use crate::repository::EntityStore;

use super::binder::FormBinder;
use super::hooks::{LifecycleHooks, NoHooks};

/// Separator joining flattened form-error key segments when none has
/// been installed.
pub const DEFAULT_FLATTEN_SEPARATOR: &str = "_";

static INSTALLED_SEPARATOR: OnceLock<String> = OnceLock::new();

/// Install the flatten separator from configuration, picked up by
/// writers constructed afterwards. Call once at startup; later calls
/// are ignored.
pub fn install_flatten_separator(separator: impl Into<String>) {
    let _ = INSTALLED_SEPARATOR.set(separator.into());
}

fn default_flatten_separator() -> String {
    INSTALLED_SEPARATOR
        .get()
        .cloned()
        .unwrap_or_else(|| DEFAULT_FLATTEN_SEPARATOR.to_string())
}

/// Create/update/delete orchestration for one resource type.
#[derive(Debug, Clone)]
pub struct ResourceWriter<E, S, B, H = NoHooks> {
    store: S,
    binder: B,
    hooks: H,
    slug: String,
    flatten_separator: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S, B> ResourceWriter<E, S, B, NoHooks> {
    /// A writer without lifecycle behavior. `slug` is the resource's
    /// error-code slug (`user` -> `user.not_deletable`).
    pub fn new(store: S, binder: B, slug: impl Into<String>) -> Self {
        Self {
            store,
            binder,
            hooks: NoHooks,
            slug: slug.into(),
            flatten_separator: default_flatten_separator(),
            _entity: PhantomData,
        }
    }
}

impl<E, S, B, H> ResourceWriter<E, S, B, H> {
    /// Replace the lifecycle hooks.
    #[must_use]
    pub fn with_hooks<H2>(self, hooks: H2) -> ResourceWriter<E, S, B, H2> {
        ResourceWriter {
            store: self.store,
            binder: self.binder,
            hooks,
            slug: self.slug,
            flatten_separator: self.flatten_separator,
            _entity: PhantomData,
        }
    }

    /// Change the flattened-key separator.
    #[must_use]
    pub fn with_flatten_separator(mut self, separator: impl Into<String>) -> Self {
        self.flatten_separator = separator.into();
        self
    }
}

impl<E, S, B, H> ResourceWriter<E, S, B, H>
where
    E: Send,
    S: EntityStore<E>,
    B: FormBinder<E>,
    H: LifecycleHooks<E>,
{
    /// Create a new entity from the payload. Returns the persisted
    /// entity with generated identifiers filled in.
    pub async fn create(&self, input: &Value) -> Result<E, ApiError>
    where
        E: Default,
    {
        let mut entity = E::default();
        self.save(&mut entity, input, true).await?;
        Ok(entity)
    }

    /// Apply the payload to an existing entity and persist it.
    pub async fn update(&self, mut entity: E, input: &Value) -> Result<E, ApiError> {
        self.save(&mut entity, input, false).await?;
        Ok(entity)
    }

    /// Delete an entity. Any store rejection surfaces as
    /// `<slug>.not_deletable` rather than an internal failure, since
    /// constraint violations are the expected reason deletes fail.
    pub async fn delete(&self, entity: &E) -> Result<(), ApiError> {
        self.store.remove(entity).await.map_err(|err| {
            tracing::warn!(slug = %self.slug, error = %err, "delete rejected");
            ApiError::not_deletable(&self.slug)
        })
    }

    async fn save(&self, entity: &mut E, input: &Value, creation: bool) -> Result<(), ApiError> {
        if !creation {
            self.hooks.store_original(entity);
        }

        self.binder.bind(entity, input, creation).map_err(|errors| {
            ApiError::unprocessable(
                errors.messages(&self.flatten_separator, Some(self.binder.form_name())),
            )
        })?;

        self.hooks.pre_persist(entity, creation);
        if creation {
            self.store.insert(entity).await?;
        } else {
            self.store.update(entity).await?;
        }
        self.hooks.post_persist(entity, creation);
        Ok(())
    }
}
