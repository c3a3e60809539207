//! In-memory [`DescriptorStore`] for tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quill_core::result::AppResult;
use quill_core::traits::DescriptorStore;
use quill_core::types::Descriptor;

/// Descriptor store backed by a `HashMap` keyed by slug.
#[derive(Debug)]
pub struct MemoryDescriptorStore<D> {
    descriptors: Mutex<HashMap<String, D>>,
}

impl<D: Descriptor> MemoryDescriptorStore<D> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            descriptors: Mutex::new(HashMap::new()),
        }
    }

    /// Seed the store, as if the descriptors were saved by a previous run.
    pub fn with_descriptors(descriptors: impl IntoIterator<Item = D>) -> Self {
        let map = descriptors
            .into_iter()
            .map(|d| (d.slug().to_string(), d))
            .collect();
        Self {
            descriptors: Mutex::new(map),
        }
    }

    /// Number of saved descriptors.
    pub async fn len(&self) -> usize {
        self.descriptors.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<D: Descriptor> Default for MemoryDescriptorStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: Descriptor> DescriptorStore<D> for MemoryDescriptorStore<D> {
    async fn save(&self, descriptor: &D) -> AppResult<()> {
        self.descriptors
            .lock()
            .await
            .insert(descriptor.slug().to_string(), descriptor.clone());
        Ok(())
    }

    async fn load(&self, slug: &str) -> AppResult<Option<D>> {
        Ok(self.descriptors.lock().await.get(slug).cloned())
    }

    async fn load_all(&self) -> AppResult<Vec<D>> {
        let mut all: Vec<D> = self.descriptors.lock().await.values().cloned().collect();
        all.sort_by(|a, b| a.slug().cmp(b.slug()));
        Ok(all)
    }
}
