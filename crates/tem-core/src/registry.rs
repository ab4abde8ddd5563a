//! Backend registry and plugin hook
//!
//! Backends are looked up by name (the `EMAIL_BACKEND` setting). Crates providing a
//! backend expose a [`MailPlugin`] which registers a factory under one or more names.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{EmailBackend, MemoryPlugin};
use crate::error::MailError;
use crate::settings::{Settings, EMAIL_BACKEND};

/// Builds a backend from settings and the `fail_silently` flag
pub type BackendFactory =
    Arc<dyn Fn(&Settings, bool) -> Result<Box<dyn EmailBackend>, MailError> + Send + Sync>;

/// Backend used when `EMAIL_BACKEND` is unset
pub const DEFAULT_BACKEND: &str = "memory";

/// A crate that contributes one or more backends
pub trait MailPlugin {
    fn name(&self) -> &'static str;

    fn register(&self, registry: &mut BackendRegistry);
}

#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

impl BackendRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the in-memory backend installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_plugin(&MemoryPlugin::new());
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&Settings, bool) -> Result<Box<dyn EmailBackend>, MailError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_lowercase(), Arc::new(factory));
        self
    }

    pub fn register_plugin(&mut self, plugin: &dyn MailPlugin) -> &mut Self {
        debug!("Registering mail plugin: {}", plugin.name());
        plugin.register(self);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered backend names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build the backend registered as `name`
    pub fn connect(
        &self,
        name: &str,
        settings: &Settings,
        fail_silently: bool,
    ) -> Result<Box<dyn EmailBackend>, MailError> {
        let factory = self
            .factories
            .get(&name.to_lowercase())
            .ok_or_else(|| MailError::UnknownBackend(name.to_string()))?;

        debug!("Opening email backend: {}", name);
        factory(settings, fail_silently)
    }

    /// Build the backend selected by the `EMAIL_BACKEND` setting
    pub fn get_connection(
        &self,
        settings: &Settings,
        fail_silently: bool,
    ) -> Result<Box<dyn EmailBackend>, MailError> {
        let name = settings.get_or(EMAIL_BACKEND, DEFAULT_BACKEND);
        self.connect(name, settings, fail_silently)
    }
}
