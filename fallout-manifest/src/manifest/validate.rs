//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use fallout_core::{validate_identifier, validate_type_label};
use miette::SourceSpan;

use crate::{EngineConfig, HandlerSpec, Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current path
/// through the manifest hierarchy, making it easier to pass validation
/// context through nested tables.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "fallout.toml");
/// ctx.validate_name("team_memberships", "handler")?;
///
/// let nested = ctx.push("handlers").push("team_memberships");
/// nested.validate_handler("team_memberships", &spec)?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Path segments for nested validation (e.g., ["handlers", "team_memberships"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages.
    ///
    /// For example: "relation in 'handlers.teams'" or just "handler" if no path.
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Validate that a name is a valid identifier.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if let Some(reason) = validate_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                reason,
                find_name_span(self.src(), name),
            ));
        }
        Ok(())
    }

    /// Validate the `[engine]` table.
    pub fn validate_engine(&self, engine: &EngineConfig) -> Result<()> {
        if engine.max_depth == Some(0) {
            return Err(self.source.validation_error(
                "max_depth must be at least 1",
                find_key_span(self.src(), "max_depth"),
            ));
        }
        if engine.max_deleted == Some(0) {
            return Err(self.source.validation_error(
                "max_deleted must be at least 1",
                find_key_span(self.src(), "max_deleted"),
            ));
        }
        Ok(())
    }

    /// Validate a `[handlers.<name>]` table.
    pub fn validate_handler(&self, name: &str, spec: &HandlerSpec) -> Result<()> {
        let label = spec.deleted_type.as_str();
        if let Some(reason) = validate_type_label(label) {
            return Err(self.source.invalid_type_label_error(
                label,
                name,
                reason,
                find_value_span(self.src(), "deleted_type", label),
            ));
        }

        for relation in spec.relations() {
            self.validate_name(relation, "relation")?;
        }

        if let Some(dup) = first_duplicate(&spec.cascade) {
            return Err(self.source.duplicate_relation_error(
                dup,
                name,
                find_repeated_spans(self.src(), dup),
            ));
        }

        Ok(())
    }
}

fn first_duplicate(items: &[String]) -> Option<&str> {
    items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(*item))
        .map(|(_, item)| item.as_str())
}

/// Find the span of a name in the TOML source.
///
/// Searches for table headers (`[handlers.name]`) first, then quoted
/// strings (`"name"`), such as relation names.
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let header_patterns = [format!(".{}]", name), format!(".{}.", name)];
    for pattern in &header_patterns {
        if let Some(pos) = src.find(pattern) {
            // +1 to skip the leading dot
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }

    for quote in ['"', '\''] {
        let pattern = format!("{quote}{name}{quote}");
        if let Some(pos) = src.find(&pattern) {
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }

    None
}

/// Find the first two quoted occurrences of `name`.
pub(crate) fn find_repeated_spans(
    src: &str,
    name: &str,
) -> (Option<SourceSpan>, Option<SourceSpan>) {
    for quote in ['"', '\''] {
        let pattern = format!("{quote}{name}{quote}");
        let mut found = src
            .match_indices(&pattern)
            .map(|(pos, _)| SourceSpan::from((pos + 1, name.len())));
        if let Some(first) = found.next() {
            return (Some(first), found.next());
        }
    }
    (None, None)
}

/// Find the span of a bare key such as `max_depth`.
pub(crate) fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    src.lines()
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some((start, line))
        })
        .find_map(|(start, line)| {
            let trimmed = line.trim_start();
            let rest = trimmed.strip_prefix(key)?;
            if !rest.trim_start().starts_with('=') {
                return None;
            }
            let indent = line.len() - trimmed.len();
            Some(SourceSpan::from((start + indent, key.len())))
        })
}

/// Find the span of a string value assigned to `key`, e.g. `deleted_type = "auth..User"`.
pub(crate) fn find_value_span(src: &str, key: &str, value: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        for sep in [" = ", "="] {
            let pattern = format!("{key}{sep}{quote}{value}{quote}");
            if let Some(pos) = src.find(&pattern) {
                let start = pos + key.len() + sep.len() + 1;
                return Some(SourceSpan::from((start, value.len())));
            }
        }
    }
    None
}
