//! Plugin registry: stores descriptors and drives the activation lifecycle.
//!
//! One generic [`Registry`] serves both plain modules and feathers. Every
//! mutating operation writes through the [`DescriptorStore`] before updating
//! memory, so a failed save leaves the in-memory state untouched.
//!
//! Lifecycle transitions are serialized by a separate mutex. The entry map
//! lock is never held while extension callbacks run, so a callback (or a
//! hook handler it triggers) may query the registry freely.
//!
//! Only direct dependencies are checked on activation. There is no
//! transitive resolution, ordering, or cycle detection, and deactivating a
//! dependency does not cascade to its dependents.

pub mod feather;
pub mod schema;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use quill_core::traits::DescriptorStore;
use quill_core::types::{Descriptor, LifecycleState};

use crate::error::RegistryError;
use crate::hooks::{HookArgs, HookBus, HookName};

/// Behaviour attached to a registered descriptor.
///
/// `on_activate` is where a plugin registers its hook handlers. Hooks are
/// not removed automatically on deactivation.
///
/// Callbacks may read the registry, but must not activate or deactivate
/// entries of the same registry: transitions are serialized and such a
/// call would wait on itself.
#[async_trait]
pub trait Extension: Send + Sync + std::fmt::Debug {
    /// Called when the entry transitions to `Activated`.
    async fn on_activate(&self, hooks: &HookBus) -> Result<(), String> {
        let _ = hooks;
        Ok(())
    }

    /// Called when the entry transitions to `Deactivated`.
    async fn on_deactivate(&self, hooks: &HookBus) -> Result<(), String> {
        let _ = hooks;
        Ok(())
    }
}

/// Extension for descriptors that carry no behaviour of their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExtension;

impl Extension for NoopExtension {}

/// Outcome of [`Registry::activate_enabled`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActivationReport {
    /// Slugs activated, in activation order.
    pub activated: Vec<String>,
    /// Slugs that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Entry in the registry.
#[derive(Debug)]
struct RegistryEntry<D> {
    descriptor: D,
    extension: Arc<dyn Extension>,
    state: LifecycleState,
}

#[derive(Debug)]
struct Inner<D> {
    entries: HashMap<String, RegistryEntry<D>>,
    /// Slugs in registration order.
    order: Vec<String>,
}

/// Named plugin lifecycle manager.
#[derive(Debug)]
pub struct Registry<D: Descriptor> {
    /// `"module"` or `"feather"`, used in logs and lifecycle hook args.
    kind: &'static str,
    inner: RwLock<Inner<D>>,
    /// Held for the whole of `activate` and `deactivate`.
    transition: Mutex<()>,
    hooks: Arc<HookBus>,
    store: Arc<dyn DescriptorStore<D>>,
}

impl<D: Descriptor> Registry<D> {
    /// Creates an empty registry of `kind` entries.
    pub fn new(kind: &'static str, hooks: Arc<HookBus>, store: Arc<dyn DescriptorStore<D>>) -> Self {
        Self {
            kind,
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                order: Vec::new(),
            }),
            transition: Mutex::new(()),
            hooks,
            store,
        }
    }

    /// `"module"` or `"feather"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The bus passed to activation callbacks.
    pub fn hooks(&self) -> &Arc<HookBus> {
        &self.hooks
    }

    /// Register a descriptor in the `Registered` state.
    ///
    /// If the store already holds a descriptor for this slug (a previous
    /// install), its `enabled` flag, configured values and install time are
    /// carried over before the merged descriptor is saved.
    pub async fn register(
        &self,
        mut descriptor: D,
        extension: Arc<dyn Extension>,
    ) -> Result<(), RegistryError> {
        let slug = descriptor.slug().to_string();
        let mut inner = self.inner.write().await;

        if inner.entries.contains_key(&slug) {
            return Err(RegistryError::DuplicateSlug(slug));
        }

        if let Some(stored) = self.store.load(&slug).await? {
            let stored = stored.plugin();
            let plugin = descriptor.plugin_mut();
            plugin.enabled = stored.enabled;
            plugin.config = stored.config.clone();
            plugin.installed_at = stored.installed_at;
            debug!(kind = self.kind, slug = %slug, "Restored persisted state");
        }

        self.store.save(&descriptor).await?;

        info!(
            kind = self.kind,
            slug = %slug,
            name = %descriptor.plugin().name,
            version = %descriptor.plugin().version,
            "Registered"
        );

        inner.order.push(slug.clone());
        inner.entries.insert(
            slug,
            RegistryEntry {
                descriptor,
                extension,
                state: LifecycleState::Registered,
            },
        );

        Ok(())
    }

    /// Activate a registered entry.
    ///
    /// Every direct dependency must be registered and active. Activating an
    /// already-active entry is a no-op.
    pub async fn activate(&self, slug: &str) -> Result<(), RegistryError> {
        {
            let _transition = self.transition.lock().await;

            let extension = {
                let inner = self.inner.read().await;

                let entry = inner
                    .entries
                    .get(slug)
                    .ok_or_else(|| RegistryError::ModuleNotFound(slug.to_string()))?;

                if entry.state.is_active() {
                    debug!(kind = self.kind, slug = %slug, "Already active");
                    return Ok(());
                }

                for dependency in &entry.descriptor.plugin().dependencies {
                    let active = inner
                        .entries
                        .get(dependency)
                        .is_some_and(|dep| dep.state.is_active());
                    if !active {
                        return Err(RegistryError::DependencyNotActive {
                            slug: slug.to_string(),
                            dependency: dependency.clone(),
                        });
                    }
                }

                Arc::clone(&entry.extension)
            };

            extension
                .on_activate(&self.hooks)
                .await
                .map_err(|reason| {
                    error!(kind = self.kind, slug = %slug, error = %reason, "Activation failed");
                    RegistryError::ActivationFailed {
                        slug: slug.to_string(),
                        reason,
                    }
                })?;

            let mut inner = self.inner.write().await;
            if let Some(entry) = inner.entries.get_mut(slug) {
                entry.state = LifecycleState::Activated;
            }

            info!(kind = self.kind, slug = %slug, "Activated");
        }

        self.announce(HookName::PLUGIN_ACTIVATED, slug).await;
        Ok(())
    }

    /// Deactivate an active entry.
    ///
    /// A deactivation callback error is logged and the entry is still marked
    /// `Deactivated`. Deactivating an inactive entry is a no-op.
    pub async fn deactivate(&self, slug: &str) -> Result<(), RegistryError> {
        {
            let _transition = self.transition.lock().await;

            let extension = {
                let inner = self.inner.read().await;

                let entry = inner
                    .entries
                    .get(slug)
                    .ok_or_else(|| RegistryError::ModuleNotFound(slug.to_string()))?;

                if !entry.state.is_active() {
                    debug!(kind = self.kind, slug = %slug, state = %entry.state, "Not active");
                    return Ok(());
                }

                Arc::clone(&entry.extension)
            };

            if let Err(e) = extension.on_deactivate(&self.hooks).await {
                warn!(
                    kind = self.kind,
                    slug = %slug,
                    error = %e,
                    "Deactivation callback returned error"
                );
            }

            let mut inner = self.inner.write().await;
            if let Some(entry) = inner.entries.get_mut(slug) {
                entry.state = LifecycleState::Deactivated;
            }

            info!(kind = self.kind, slug = %slug, "Deactivated");
        }

        self.announce(HookName::PLUGIN_DEACTIVATED, slug).await;
        Ok(())
    }

    /// Persist the enabled flag. Does not activate or deactivate.
    pub async fn toggle(&self, slug: &str, enabled: bool) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;

        let entry = inner
            .entries
            .get_mut(slug)
            .ok_or_else(|| RegistryError::ModuleNotFound(slug.to_string()))?;

        let mut updated = entry.descriptor.clone();
        updated.plugin_mut().enabled = enabled;
        self.store.save(&updated).await?;
        entry.descriptor = updated;

        info!(kind = self.kind, slug = %slug, enabled = enabled, "Toggled");
        Ok(())
    }

    /// Validate and persist one configuration value.
    ///
    /// The value is overlaid on the effective configuration and the whole
    /// object is validated against the descriptor's schema, so `required`
    /// and `additionalProperties` constraints apply.
    pub async fn upsert_config(&self, slug: &str, key: &str, value: Value) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;

        let entry = inner
            .entries
            .get_mut(slug)
            .ok_or_else(|| RegistryError::ModuleNotFound(slug.to_string()))?;

        let plugin = entry.descriptor.plugin();
        let mut candidate = plugin.effective_config();
        candidate.insert(key.to_string(), value.clone());

        let violations = schema::violations(&plugin.config_schema, &Value::Object(candidate))
            .map_err(|reason| RegistryError::InvalidSchema {
                slug: slug.to_string(),
                reason,
            })?;

        if !violations.is_empty() {
            warn!(
                kind = self.kind,
                slug = %slug,
                key = %key,
                violations = violations.len(),
                "Rejected config value"
            );
            return Err(RegistryError::InvalidConfig {
                slug: slug.to_string(),
                key: key.to_string(),
                violations,
            });
        }

        let mut updated = entry.descriptor.clone();
        updated.plugin_mut().config.insert(key.to_string(), value);
        self.store.save(&updated).await?;
        entry.descriptor = updated;

        info!(kind = self.kind, slug = %slug, key = %key, "Config updated");
        Ok(())
    }

    /// Activate every registered entry whose stored `enabled` flag is set.
    ///
    /// Entries are visited in registration order, so a dependency registered
    /// before its dependents comes up first. Failures are logged and
    /// reported; they never abort the pass.
    pub async fn activate_enabled(&self) -> Result<ActivationReport, RegistryError> {
        let enabled: HashSet<String> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|d| d.plugin().enabled)
            .map(|d| d.slug().to_string())
            .collect();

        let order = self.inner.read().await.order.clone();
        let mut report = ActivationReport::default();

        for slug in order.iter().filter(|slug| enabled.contains(*slug)) {
            match self.activate(slug).await {
                Ok(()) => report.activated.push(slug.clone()),
                Err(e) => {
                    error!(kind = self.kind, slug = %slug, error = %e, "Could not activate enabled entry");
                    report.failed.push((slug.clone(), e.to_string()));
                }
            }
        }

        info!(
            kind = self.kind,
            activated = report.activated.len(),
            failed = report.failed.len(),
            "Enabled entries activated"
        );
        Ok(report)
    }

    /// Deactivate every active entry, most recently registered first.
    pub async fn deactivate_all(&self) {
        let order = self.inner.read().await.order.clone();
        for slug in order.iter().rev() {
            if let Err(e) = self.deactivate(slug).await {
                error!(kind = self.kind, slug = %slug, error = %e, "Error deactivating");
            }
        }
    }

    // ── Queries ──

    /// Descriptor for `slug`.
    pub async fn get(&self, slug: &str) -> Option<D> {
        let inner = self.inner.read().await;
        inner.entries.get(slug).map(|e| e.descriptor.clone())
    }

    /// All descriptors in registration order.
    pub async fn list(&self) -> Vec<D> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|slug| inner.entries.get(slug))
            .map(|e| e.descriptor.clone())
            .collect()
    }

    /// Lifecycle state for `slug`.
    pub async fn state(&self, slug: &str) -> Option<LifecycleState> {
        let inner = self.inner.read().await;
        inner.entries.get(slug).map(|e| e.state)
    }

    /// Whether `slug` is registered and `Activated`.
    pub async fn is_active(&self, slug: &str) -> bool {
        self.state(slug).await.is_some_and(|s| s.is_active())
    }

    /// Whether `slug` is registered.
    pub async fn contains(&self, slug: &str) -> bool {
        self.inner.read().await.entries.contains_key(slug)
    }

    /// Number of registered entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Defaults overlaid by configured values.
    pub async fn effective_config(&self, slug: &str) -> Option<Map<String, Value>> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(slug)
            .map(|e| e.descriptor.plugin().effective_config())
    }

    async fn announce(&self, hook: HookName, slug: &str) {
        let args = HookArgs::new()
            .with_string("kind", self.kind)
            .with_string("slug", slug);
        self.hooks.do_action(hook, &args).await;
    }
}
