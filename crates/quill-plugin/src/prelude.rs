//! Convenience re-exports for plugin authors.

pub use crate::error::RegistryError;
pub use crate::hooks::{
    ActionFn, ActionHandler, DEFAULT_PRIORITY, FilterFn, FilterHandler, HandlerError, HookArgs,
    HookBus, HookName,
};
pub use crate::registry::feather::{FeatherRegistry, FeatherRenderer, RenderedContent};
pub use crate::registry::{ActivationReport, Extension, NoopExtension, Registry};
pub use crate::runtime::{BootReport, PluginRuntime};

pub use quill_core::types::{
    FeatherDescriptor, FieldSpec, FieldType, LifecycleState, PluginDescriptor,
};

pub use async_trait::async_trait;
pub use serde_json::{Value, json};
