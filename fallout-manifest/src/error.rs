use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, optionally pointing at a span.
    pub fn validation_error(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidIdentifier {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }

    /// Create a duplicate relation error pointing at both occurrences.
    pub fn duplicate_relation_error(
        &self,
        relation: impl Into<String>,
        handler: impl Into<String>,
        spans: (Option<SourceSpan>, Option<SourceSpan>),
    ) -> Box<Error> {
        Box::new(Error::DuplicateRelation {
            src: self.named_source(),
            first_span: spans.0,
            second_span: spans.1,
            relation: relation.into(),
            handler: handler.into(),
        })
    }

    /// Create an invalid type label error.
    pub fn invalid_type_label_error(
        &self,
        label: impl Into<String>,
        handler: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidTypeLabel {
            src: self.named_source(),
            span,
            label: label.into(),
            handler: handler.into(),
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("create a fallout.toml or pass its location with --config"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fallout.toml")]
    #[diagnostic(code(fallout::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(fallout::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid {context} name '{name}'")]
    #[diagnostic(
        code(fallout::invalid_identifier),
        help(
            "{reason}. Use only letters, numbers, underscores, and dashes, starting with a letter or underscore."
        )
    )]
    InvalidIdentifier {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid identifier")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
        reason: String,
    },

    #[error("relation '{relation}' is listed twice in cascade of handler '{handler}'")]
    #[diagnostic(
        code(fallout::duplicate_relation),
        help("remove the second '{relation}' from `cascade`")
    )]
    DuplicateRelation {
        #[source_code]
        src: NamedSource<String>,
        #[label("first listed here")]
        first_span: Option<SourceSpan>,
        #[label("listed again here")]
        second_span: Option<SourceSpan>,
        relation: String,
        handler: String,
    },

    #[error("invalid deleted type '{label}' for handler '{handler}'")]
    #[diagnostic(
        code(fallout::invalid_type_label),
        help("{reason}. Use a model label such as 'auth.User'.")
    )]
    InvalidTypeLabel {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid type label")]
        span: Option<SourceSpan>,
        label: String,
        handler: String,
        reason: String,
    },
}
