//! Hook registry: handlers stored per hook name in `(priority, sequence)` order.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use super::definitions::HookName;

/// Entry in the hook registry.
struct HookEntry<H: ?Sized> {
    handler: Arc<H>,
    priority: i32,
    /// Insertion counter, the tie-break between equal priorities.
    sequence: u64,
}

/// Ordered handler lists keyed by hook name.
///
/// Used twice by the bus, once for actions and once for filters. Lists stay
/// sorted by ascending `(priority, sequence)` at all times; readers take a
/// snapshot so late registration never mutates a list mid-dispatch.
pub struct HookRegistry<H: ?Sized> {
    handlers: RwLock<HashMap<HookName, Vec<HookEntry<H>>>>,
    next_sequence: AtomicU64,
}

impl<H: ?Sized> std::fmt::Debug for HookRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("next_sequence", &self.next_sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<H: ?Sized + Send + Sync> HookRegistry<H> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Insert a handler, keeping the list ordered. Returns its sequence number.
    pub async fn register(&self, hook: HookName, priority: i32, handler: Arc<H>) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);

        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook.clone()).or_default();

        // Sequences are taken before the lock, so a racing registration may
        // arrive with a smaller one; comparing the full key keeps order exact.
        let position = entries.partition_point(|e| (e.priority, e.sequence) <= (priority, sequence));
        entries.insert(
            position,
            HookEntry {
                handler,
                priority,
                sequence,
            },
        );

        debug!(
            hook = %hook,
            priority = priority,
            sequence = sequence,
            position = position,
            "Hook handler registered"
        );

        sequence
    }

    /// Clone the handler list for `hook` in dispatch order.
    pub async fn snapshot(&self, hook: &HookName) -> Vec<Arc<H>> {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
            .unwrap_or_default()
    }

    /// Priorities for `hook` in dispatch order.
    pub async fn priorities(&self, hook: &HookName) -> Vec<i32> {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| entries.iter().map(|e| e.priority).collect())
            .unwrap_or_default()
    }

    /// Whether `hook` has any handler.
    pub async fn has_handlers(&self, hook: &HookName) -> bool {
        self.handler_count(hook).await > 0
    }

    /// Number of handlers on `hook`.
    pub async fn handler_count(&self, hook: &HookName) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Every hook name with at least one handler, sorted.
    pub async fn registered_hooks(&self) -> Vec<HookName> {
        let handlers = self.handlers.read().await;
        let mut hooks: Vec<HookName> = handlers.keys().cloned().collect();
        hooks.sort();
        hooks
    }
}

impl<H: ?Sized + Send + Sync> Default for HookRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
