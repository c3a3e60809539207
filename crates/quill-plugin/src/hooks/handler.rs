//! Handler traits and closure adapters.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use quill_core::error::AppError;

use super::definitions::HookArgs;

/// Error raised by a single handler invocation.
///
/// Never surfaced to the dispatch caller: the bus logs it and moves on to
/// the next handler.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(String),
    /// The handler panicked while running.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Create a `Failed` error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<AppError> for HandlerError {
    fn from(err: AppError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Side-effecting handler registered on an action hook.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Name used in log lines when this handler fails.
    fn label(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Run the handler. The return value only signals failure.
    async fn call(&self, args: &HookArgs) -> Result<(), HandlerError>;
}

/// Value transform registered on a filter hook.
#[async_trait]
pub trait FilterHandler: Send + Sync {
    /// Name used in log lines when this handler fails.
    fn label(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Produce the next value in the chain from the current one.
    async fn apply(&self, value: &Value, args: &HookArgs) -> Result<Value, HandlerError>;
}

type ActionClosure =
    Arc<dyn Fn(HookArgs) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

type FilterClosure =
    Arc<dyn Fn(Value, HookArgs) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// A closure-based action handler for quick registration.
///
/// The closure receives an owned copy of the arguments so the returned
/// future can be `'static`.
pub struct ActionFn {
    label: String,
    func: ActionClosure,
}

impl std::fmt::Debug for ActionFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFn")
            .field("label", &self.label)
            .field("func", &"<closure>")
            .finish()
    }
}

impl ActionFn {
    /// Wrap an async closure.
    pub fn new<F, Fut>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(move |args| Box::pin(func(args))),
        }
    }

    /// Wrap an async closure straight into a shareable handler.
    pub fn arc<F, Fut>(label: impl Into<String>, func: F) -> Arc<dyn ActionHandler>
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Arc::new(Self::new(label, func))
    }
}

#[async_trait]
impl ActionHandler for ActionFn {
    fn label(&self) -> &str {
        &self.label
    }

    async fn call(&self, args: &HookArgs) -> Result<(), HandlerError> {
        (self.func)(args.clone()).await
    }
}

/// A closure-based filter handler for quick registration.
pub struct FilterFn {
    label: String,
    func: FilterClosure,
}

impl std::fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterFn")
            .field("label", &self.label)
            .field("func", &"<closure>")
            .finish()
    }
}

impl FilterFn {
    /// Wrap an async closure.
    pub fn new<F, Fut>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value, HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(move |value, args| Box::pin(func(value, args))),
        }
    }

    /// Wrap an async closure straight into a shareable handler.
    pub fn arc<F, Fut>(label: impl Into<String>, func: F) -> Arc<dyn FilterHandler>
    where
        F: Fn(Value, HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Arc::new(Self::new(label, func))
    }
}

#[async_trait]
impl FilterHandler for FilterFn {
    fn label(&self) -> &str {
        &self.label
    }

    async fn apply(&self, value: &Value, args: &HookArgs) -> Result<Value, HandlerError> {
        (self.func)(value.clone(), args.clone()).await
    }
}
