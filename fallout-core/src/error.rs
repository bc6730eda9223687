use miette::Diagnostic;
use thiserror::Error;

use crate::TypeKey;

/// A handler that cannot be registered.
///
/// Raised synchronously by registration; the registry is left unchanged.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("handler '{handler}' has no associated deleted type")]
    #[diagnostic(
        code(fallout::missing_deleted_type),
        help("return the model label this handler reacts to from `deleted_type()`")
    )]
    MissingDeletedType { handler: String },

    #[error("handler '{handler}' declares invalid deleted type '{ty}'")]
    #[diagnostic(
        code(fallout::invalid_deleted_type),
        help("{reason}; use a label such as 'auth.User'")
    )]
    InvalidDeletedType {
        handler: String,
        ty: String,
        reason: &'static str,
    },

    #[error("handler '{handler}' reacts to '{declared}' but was registered for '{requested}'")]
    #[diagnostic(
        code(fallout::type_mismatch),
        help("register the handler for '{declared}' or change its `deleted_type()`")
    )]
    TypeMismatch {
        handler: String,
        declared: TypeKey,
        requested: TypeKey,
    },
}

impl ConfigurationError {
    /// Name of the handler that failed to register.
    pub fn handler(&self) -> &str {
        match self {
            ConfigurationError::MissingDeletedType { handler }
            | ConfigurationError::InvalidDeletedType { handler, .. }
            | ConfigurationError::TypeMismatch { handler, .. } => handler,
        }
    }
}
