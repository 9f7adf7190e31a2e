//! The single write path for properties.

use std::sync::Arc;

use tracing::debug;

use super::hooks::{WriteEvent, WriteHook};
use super::model::{NewProperty, Property, PropertyChanges};
use super::repository::PropertyRepository;
use crate::error::{AppError, Result};

/// Creates, updates and deletes properties, then runs every registered hook
/// in registration order before returning.
///
/// A hook failure is returned to the caller; the committed row stays.
#[derive(Clone)]
pub struct PropertyWriter {
    repository: PropertyRepository,
    hooks: Arc<Vec<Arc<dyn WriteHook>>>,
}

impl PropertyWriter {
    pub fn new(repository: PropertyRepository) -> Self {
        Self {
            repository,
            hooks: Arc::new(Vec::new()),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn WriteHook>) -> Self {
        Arc::make_mut(&mut self.hooks).push(hook);
        self
    }

    pub async fn create(&self, new: NewProperty) -> Result<Property> {
        let new = new.validated()?;
        let property = self.repository.insert(&new).await?;
        self.run_hooks(WriteEvent::Created(property.clone())).await?;
        Ok(property)
    }

    pub async fn update(&self, id: i64, changes: PropertyChanges) -> Result<Property> {
        let current = self.find(id).await?;
        let updated = changes.apply(&current)?;

        if !self.repository.update(&updated).await? {
            return Err(not_found(id));
        }
        self.run_hooks(WriteEvent::Updated(updated.clone())).await?;
        Ok(updated)
    }

    /// Deletes and returns the removed record.
    pub async fn delete(&self, id: i64) -> Result<Property> {
        let current = self.find(id).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }
        self.run_hooks(WriteEvent::Deleted(current.clone())).await?;
        Ok(current)
    }

    async fn find(&self, id: i64) -> Result<Property> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn run_hooks(&self, event: WriteEvent) -> Result<()> {
        debug!(action = event.action(), hooks = self.hooks.len(), "Running write hooks");
        for hook in self.hooks.iter() {
            hook.after_write(&event).await?;
        }
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Property {} does not exist", id))
}
