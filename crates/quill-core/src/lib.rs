//! # quill-core
//!
//! Core crate for Quill. Contains the unified error system, configuration
//! schemas, plugin and feather descriptor types, and the persistence
//! collaborator trait the registries write through.
//!
//! This crate has **no** internal dependencies on other Quill crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
