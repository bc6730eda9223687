//! Type labels used to key handlers.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Runtime type of a deletable object, e.g. `auth.User`.
///
/// A type key is an interned model label. Two keys are equal when their
/// labels are equal, so hosts can build them from whatever their object
/// layer reports (`app_label.ModelName`, a table name, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Create a type key from a label.
    ///
    /// The label is not validated here; registration validates it.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// The raw label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment of the label (`User` for `auth.User`).
    pub fn model_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Check the label, returning the reason it is invalid if it is.
    pub fn validate(&self) -> Option<&'static str> {
        validate_type_label(&self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for TypeKey {
    fn from(label: String) -> Self {
        Self(Arc::from(label))
    }
}

/// Validate a model label such as `auth.User` or `ContentType`.
///
/// A label is one or more dot-separated segments; each segment starts with a
/// letter or underscore and continues with letters, digits or underscores.
/// Returns None if valid, Some(reason) if invalid.
pub fn validate_type_label(label: &str) -> Option<&'static str> {
    if label.trim().is_empty() {
        return Some("type label cannot be empty");
    }

    for segment in label.split('.') {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(_) => return Some("each label segment must start with a letter or underscore"),
            None => return Some("type label cannot contain empty segments"),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some("type label must contain only letters, numbers, underscores, and dots");
        }
    }

    None
}

/// Validate a handler or relation name.
///
/// Names start with a letter or underscore and may contain letters, digits,
/// underscores and single dashes (not trailing).
/// Returns None if valid, Some(reason) if invalid.
pub fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    let mut prev_was_dash = false;
    for c in chars {
        if c == '-' {
            if prev_was_dash {
                return Some("name cannot contain consecutive dashes");
            }
            prev_was_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            prev_was_dash = false;
        } else {
            return Some("name must contain only letters, numbers, underscores, and dashes");
        }
    }

    if prev_was_dash {
        return Some("name cannot end with a dash");
    }

    None
}
