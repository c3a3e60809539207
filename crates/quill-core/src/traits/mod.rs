//! Collaborator traits implemented outside the core.

pub mod store;

pub use store::DescriptorStore;
