//! Persistence collaborator for plugin registries.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::plugin::Descriptor;

/// Durable storage for registry descriptors.
///
/// Implemented outside the core (e.g. by a relational repository). The
/// registries call [`save`](Self::save) on every mutating operation and
/// own no durable state themselves.
#[async_trait]
pub trait DescriptorStore<D: Descriptor>: Send + Sync + std::fmt::Debug {
    /// Insert or replace the descriptor keyed by its slug.
    async fn save(&self, descriptor: &D) -> AppResult<()>;

    /// Load one descriptor by slug.
    async fn load(&self, slug: &str) -> AppResult<Option<D>>;

    /// Load every stored descriptor.
    async fn load_all(&self) -> AppResult<Vec<D>>;
}
