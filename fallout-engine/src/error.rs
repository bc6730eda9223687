use std::fmt;

use fallout_core::{HandlerError, TypeKey};
use miette::Diagnostic;
use thiserror::Error;

/// Which handler capability was running when a handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `Handler::compute_side_effects`
    ComputeSideEffects,
    /// `Handler::describe`
    Describe,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ComputeSideEffects => write!(f, "compute_side_effects"),
            Stage::Describe => write!(f, "describe"),
        }
    }
}

/// A gather that was aborted. No partial report is produced.
#[derive(Debug, Error, Diagnostic)]
pub enum GatherError {
    #[error("handler '{handler}' failed in {stage}")]
    #[diagnostic(code(fallout::handler_failed))]
    Handler {
        handler: String,
        stage: Stage,
        #[source]
        source: HandlerError,
    },

    #[error("cascade from '{ty}' exceeded the maximum depth of {limit}")]
    #[diagnostic(
        code(fallout::depth_exceeded),
        help("raise `max_depth` in [engine] or look for a handler that keeps cascading")
    )]
    DepthExceeded { limit: usize, ty: TypeKey },

    #[error("cascade marked more than {limit} objects as deleted")]
    #[diagnostic(code(fallout::too_many_objects), help("raise `max_deleted` in [engine]"))]
    TooManyObjects { limit: usize },
}

impl GatherError {
    pub(crate) fn handler(handler: &str, stage: Stage, source: HandlerError) -> Self {
        GatherError::Handler {
            handler: handler.to_string(),
            stage,
            source,
        }
    }

    /// The error returned by the failing handler, if a handler failed.
    ///
    /// Use `downcast_ref` on the result to recover the handler's own error type.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            GatherError::Handler { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
