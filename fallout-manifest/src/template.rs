//! Message templates for declarative handlers.

use std::fmt;

use serde::Deserialize;

/// A value that can be interpolated into a message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{count}`: number of affected objects.
    Count,
    /// `{type}`: type label of the affected objects.
    Type,
    /// `{first}`: primary key of the first affected object.
    First,
}

impl Placeholder {
    /// All supported placeholders.
    pub const ALL: [Placeholder; 3] = [Placeholder::Count, Placeholder::Type, Placeholder::First];

    /// The name used inside braces.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Count => "count",
            Placeholder::Type => "type",
            Placeholder::First => "first",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Values substituted into a [`MessageTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub count: usize,
    pub type_label: &'a str,
    pub first: &'a str,
}

/// Error from parsing a message template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("message template cannot be empty")]
    Empty,
    #[error("unknown placeholder '{{{0}}}' in message template (expected {{count}}, {{type}} or {{first}})")]
    UnknownPlaceholder(String),
    #[error("unclosed '{{' in message template")]
    Unclosed,
    #[error("unmatched '}}' in message template; write '}}}}' for a literal brace")]
    Unmatched,
}

/// A parsed message such as `"{count} member(s) will lose access"`.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parse a template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        if source.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(TemplateError::Unclosed),
                        }
                    }
                    let placeholder = Placeholder::from_name(name.trim())
                        .ok_or(TemplateError::UnknownPlaceholder(name))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::Unmatched),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholders used by this template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Render the template with the given values.
    pub fn render(&self, values: &TemplateValues<'_>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(Placeholder::Count) => out.push_str(&values.count.to_string()),
                Segment::Placeholder(Placeholder::Type) => out.push_str(values.type_label),
                Segment::Placeholder(Placeholder::First) => out.push_str(values.first),
            }
        }
        out
    }
}

impl TryFrom<String> for MessageTemplate {
    type Error = TemplateError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
