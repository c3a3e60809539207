//! Shared domain types.

pub mod feather;
pub mod plugin;

pub use feather::{FeatherDescriptor, FieldSpec, FieldType};
pub use plugin::{Descriptor, LifecycleState, PluginDescriptor};
