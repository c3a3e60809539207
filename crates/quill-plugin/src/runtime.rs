//! One hook bus shared by the module and feather registries.

use std::sync::Arc;

use tracing::info;

use quill_core::config::PluginConfig;
use quill_core::traits::DescriptorStore;
use quill_core::types::{FeatherDescriptor, PluginDescriptor};

use crate::error::RegistryError;
use crate::hooks::{HookArgs, HookBus, HookName};
use crate::registry::feather::FeatherRegistry;
use crate::registry::{ActivationReport, Registry};
use crate::store::MemoryDescriptorStore;

/// Result of [`PluginRuntime::boot`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BootReport {
    pub modules: ActivationReport,
    pub feathers: ActivationReport,
}

impl BootReport {
    /// Total entries activated across both registries.
    pub fn activated(&self) -> usize {
        self.modules.activated.len() + self.feathers.activated.len()
    }

    /// Total entries that failed to activate.
    pub fn failed(&self) -> usize {
        self.modules.failed.len() + self.feathers.failed.len()
    }
}

/// The extension runtime.
#[derive(Debug)]
pub struct PluginRuntime {
    hooks: Arc<HookBus>,
    modules: Registry<PluginDescriptor>,
    feathers: FeatherRegistry,
}

impl PluginRuntime {
    /// Creates a runtime whose registries share `hooks`.
    pub fn new(
        hooks: Arc<HookBus>,
        module_store: Arc<dyn DescriptorStore<PluginDescriptor>>,
        feather_store: Arc<dyn DescriptorStore<FeatherDescriptor>>,
    ) -> Self {
        Self {
            modules: Registry::new("module", Arc::clone(&hooks), module_store),
            feathers: FeatherRegistry::new(Arc::clone(&hooks), feather_store),
            hooks,
        }
    }

    /// Runtime backed by in-memory descriptor stores.
    pub fn in_memory(config: &PluginConfig) -> Self {
        Self::new(
            Arc::new(HookBus::with_default_priority(config.default_priority)),
            Arc::new(MemoryDescriptorStore::<PluginDescriptor>::new()),
            Arc::new(MemoryDescriptorStore::<FeatherDescriptor>::new()),
        )
    }

    /// Activate every enabled module, then every enabled feather, then fire
    /// `runtime.started`.
    pub async fn boot(&self) -> Result<BootReport, RegistryError> {
        let report = BootReport {
            modules: self.modules.activate_enabled().await?,
            feathers: self.feathers.activate_enabled().await?,
        };

        let args = HookArgs::new()
            .with_int("activated", report.activated() as i64)
            .with_int("failed", report.failed() as i64);
        self.hooks.do_action(HookName::RUNTIME_STARTED, &args).await;

        info!(
            activated = report.activated(),
            failed = report.failed(),
            "Plugin runtime started"
        );
        Ok(report)
    }

    /// Fire `runtime.shutdown`, then deactivate feathers and modules.
    pub async fn shutdown(&self) {
        self.hooks
            .do_action(HookName::RUNTIME_SHUTDOWN, &HookArgs::new())
            .await;
        self.feathers.deactivate_all().await;
        self.modules.deactivate_all().await;
        info!("Plugin runtime stopped");
    }

    /// The shared hook bus.
    pub fn hooks(&self) -> &Arc<HookBus> {
        &self.hooks
    }

    /// The module registry.
    pub fn modules(&self) -> &Registry<PluginDescriptor> {
        &self.modules
    }

    /// The feather registry.
    pub fn feathers(&self) -> &FeatherRegistry {
        &self.feathers
    }
}
