//! # quill-plugin
//!
//! Extension runtime for Quill. Provides:
//!
//! - [`HookBus`]: priority-ordered action broadcast and filter chaining with
//!   per-handler failure isolation
//! - [`Registry`]: named plugin lifecycle (register, activate, deactivate,
//!   toggle, configure) backed by an external [`DescriptorStore`]
//! - [`FeatherRegistry`]: the registry specialized for content types, binding
//!   each feather slug to its renderer and form manifest
//! - [`PluginRuntime`]: one bus shared by the module and feather registries
//!
//! [`DescriptorStore`]: quill_core::traits::DescriptorStore

pub mod error;
pub mod hooks;
pub mod prelude;
pub mod registry;
pub mod runtime;
pub mod store;

pub use error::RegistryError;
pub use hooks::{HookArgs, HookBus, HookName};
pub use registry::feather::{FeatherRegistry, FeatherRenderer};
pub use registry::{ActivationReport, Extension, NoopExtension, Registry};
pub use runtime::{BootReport, PluginRuntime};
pub use store::MemoryDescriptorStore;
