//! Registers the Scaleway backend with a [`BackendRegistry`]

use tem_core::{BackendRegistry, MailPlugin};

use crate::backend::ScalewayBackend;

/// Short name accepted in `EMAIL_BACKEND`
pub const BACKEND_ALIAS: &str = "scw";

#[derive(Debug, Clone, Copy, Default)]
pub struct ScalewayPlugin;

impl ScalewayPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl MailPlugin for ScalewayPlugin {
    fn name(&self) -> &'static str {
        ScalewayBackend::NAME
    }

    fn register(&self, registry: &mut BackendRegistry) {
        for name in [ScalewayBackend::NAME, BACKEND_ALIAS] {
            registry.register(name, |settings, fail_silently| {
                Ok(Box::new(ScalewayBackend::from_settings(
                    settings,
                    fail_silently,
                )?))
            });
        }
    }
}
