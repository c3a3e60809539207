//! Hook bus: registers handlers and dispatches actions and filters.
//!
//! For actions:
//! - Handlers are awaited one at a time in `(priority, insertion)` order.
//! - A failing or panicking handler is logged and the next one still runs.
//!
//! For filters:
//! - The value is threaded through each handler in the same order.
//! - A failing or panicking handler is skipped: the value it was given is
//!   passed unchanged to the next handler.
//!
//! There is no per-handler timeout; callers that need one wrap the handler.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error};

use super::definitions::{HookArgs, HookName};
use super::handler::{ActionHandler, FilterHandler, HandlerError};
use super::registry::HookRegistry;

/// Priority used by [`HookBus::add_action`] and [`HookBus::add_filter`].
pub const DEFAULT_PRIORITY: i32 = 10;

/// Priority-ordered action broadcast and filter chaining.
///
/// Constructed explicitly and shared via `Arc`; there is no global instance.
#[derive(Debug)]
pub struct HookBus {
    actions: HookRegistry<dyn ActionHandler>,
    filters: HookRegistry<dyn FilterHandler>,
    default_priority: i32,
}

impl HookBus {
    /// Creates an empty bus using [`DEFAULT_PRIORITY`].
    pub fn new() -> Self {
        Self::with_default_priority(DEFAULT_PRIORITY)
    }

    /// Create a bus whose `add_*` helpers use `priority`.
    pub fn with_default_priority(priority: i32) -> Self {
        Self {
            actions: HookRegistry::new(),
            filters: HookRegistry::new(),
            default_priority: priority,
        }
    }

    /// Priority used by the `add_*` helpers.
    pub fn default_priority(&self) -> i32 {
        self.default_priority
    }

    // ── Actions ──

    /// Register an action handler at `priority` (lower runs first).
    pub async fn register_action(
        &self,
        name: impl Into<HookName>,
        priority: i32,
        handler: Arc<dyn ActionHandler>,
    ) {
        self.actions.register(name.into(), priority, handler).await;
    }

    /// Register an action handler at the default priority.
    pub async fn add_action(&self, name: impl Into<HookName>, handler: Arc<dyn ActionHandler>) {
        self.register_action(name, self.default_priority, handler).await;
    }

    /// Run every handler registered on `name`, in order, isolating failures.
    pub async fn do_action(&self, name: impl Into<HookName>, args: &HookArgs) {
        let name = name.into();
        let handlers = self.actions.snapshot(&name).await;
        if handlers.is_empty() {
            return;
        }

        debug!(hook = %name, handler_count = handlers.len(), "Dispatching action");

        let mut failures = 0usize;
        for handler in &handlers {
            if let Err(e) = isolate(handler.call(args)).await {
                failures += 1;
                error!(
                    hook = %name,
                    handler = %handler.label(),
                    error = %e,
                    "Action handler failed, continuing"
                );
            }
        }

        debug!(hook = %name, failures = failures, "Action dispatch complete");
    }

    // ── Filters ──

    /// Register a filter handler at `priority` (lower runs first).
    pub async fn register_filter(
        &self,
        name: impl Into<HookName>,
        priority: i32,
        handler: Arc<dyn FilterHandler>,
    ) {
        self.filters.register(name.into(), priority, handler).await;
    }

    /// Register a filter handler at the default priority.
    pub async fn add_filter(&self, name: impl Into<HookName>, handler: Arc<dyn FilterHandler>) {
        self.register_filter(name, self.default_priority, handler).await;
    }

    /// Thread `initial` through every filter on `name` and return the result.
    pub async fn apply_filters(
        &self,
        name: impl Into<HookName>,
        initial: Value,
        args: &HookArgs,
    ) -> Value {
        let name = name.into();
        let handlers = self.filters.snapshot(&name).await;
        if handlers.is_empty() {
            return initial;
        }

        debug!(hook = %name, handler_count = handlers.len(), "Applying filters");

        let mut value = initial;
        for handler in &handlers {
            match isolate(handler.apply(&value, args)).await {
                Ok(next) => value = next,
                Err(e) => {
                    error!(
                        hook = %name,
                        handler = %handler.label(),
                        error = %e,
                        "Filter handler failed, value left unchanged"
                    );
                }
            }
        }

        value
    }

    // ── Introspection ──

    /// Whether any action handler is registered on `name`.
    pub async fn has_action(&self, name: impl Into<HookName>) -> bool {
        self.actions.has_handlers(&name.into()).await
    }

    /// Whether any filter handler is registered on `name`.
    pub async fn has_filter(&self, name: impl Into<HookName>) -> bool {
        self.filters.has_handlers(&name.into()).await
    }

    /// Number of action handlers on `name`.
    pub async fn action_count(&self, name: impl Into<HookName>) -> usize {
        self.actions.handler_count(&name.into()).await
    }

    /// Number of filter handlers on `name`.
    pub async fn filter_count(&self, name: impl Into<HookName>) -> usize {
        self.filters.handler_count(&name.into()).await
    }

    /// Filter handler priorities on `name`, in dispatch order.
    pub async fn filter_priorities(&self, name: impl Into<HookName>) -> Vec<i32> {
        self.filters.priorities(&name.into()).await
    }

    /// Hooks with at least one action handler, sorted.
    pub async fn registered_actions(&self) -> Vec<HookName> {
        self.actions.registered_hooks().await
    }

    /// Hooks with at least one filter handler, sorted.
    pub async fn registered_filters(&self) -> Vec<HookName> {
        self.filters.registered_hooks().await
    }
}

impl Default for HookBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Await a handler future, turning a panic into a [`HandlerError`].
async fn isolate<T, F>(future: F) -> Result<T, HandlerError>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
