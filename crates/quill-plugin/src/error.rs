//! Registry error taxonomy.

use quill_core::error::AppError;

/// Errors from registry setup and lifecycle operations.
///
/// These are configuration-time mistakes and fail fast to the caller.
/// Handler failures during dispatch never appear here.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A descriptor with this slug is already registered.
    #[error("'{0}' is already registered")]
    DuplicateSlug(String),

    /// No descriptor with this slug is registered.
    #[error("'{0}' is not registered")]
    ModuleNotFound(String),

    /// A direct dependency is unregistered or not active.
    #[error("'{slug}' depends on '{dependency}', which is not active")]
    DependencyNotActive {
        /// The plugin being activated.
        slug: String,
        /// The first dependency found inactive.
        dependency: String,
    },

    /// A configuration value violates the descriptor's schema.
    #[error("invalid value for '{slug}.{key}': {}", .violations.join("; "))]
    InvalidConfig {
        /// The plugin being configured.
        slug: String,
        /// The key being written.
        key: String,
        /// Every violated constraint.
        violations: Vec<String>,
    },

    /// The descriptor's configuration schema is not a valid JSON Schema.
    #[error("'{slug}' has an invalid config schema: {reason}")]
    InvalidSchema {
        /// The plugin whose schema failed to compile.
        slug: String,
        /// Compiler message.
        reason: String,
    },

    /// The plugin's activation callback returned an error.
    #[error("'{slug}' failed to activate: {reason}")]
    ActivationFailed {
        /// The plugin being activated.
        slug: String,
        /// Error reported by the plugin.
        reason: String,
    },

    /// No renderer is bound to this feather.
    #[error("no renderer is bound to feather '{0}'")]
    RendererMissing(String),

    /// A required feather field was absent or empty.
    #[error("feather '{slug}' requires field '{field}'")]
    MissingField {
        /// The feather being rendered.
        slug: String,
        /// The missing field name.
        field: String,
    },

    /// The feather renderer returned an error.
    #[error("feather '{slug}' failed to render: {reason}")]
    RenderFailed {
        /// The feather being rendered.
        slug: String,
        /// Error reported by the renderer.
        reason: String,
    },

    /// The persistence collaborator failed.
    #[error("descriptor store error: {0}")]
    Storage(#[from] AppError),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::Storage(inner) => inner,
            RegistryError::DuplicateSlug(_) => AppError::conflict(message),
            RegistryError::ModuleNotFound(_) | RegistryError::RendererMissing(_) => {
                AppError::not_found(message)
            }
            RegistryError::InvalidConfig { .. } | RegistryError::MissingField { .. } => {
                AppError::validation(message)
            }
            RegistryError::InvalidSchema { .. } => AppError::configuration(message),
            RegistryError::DependencyNotActive { .. }
            | RegistryError::ActivationFailed { .. }
            | RegistryError::RenderFailed { .. } => AppError::plugin(message),
        }
    }
}
