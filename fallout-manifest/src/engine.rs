use serde::Deserialize;

/// Cascade limits from the `[engine]` table. Both are unlimited by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Deepest cascade level processed before the gather is aborted.
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum number of objects a single gather may mark as deleted.
    #[serde(default)]
    pub max_deleted: Option<usize>,
}
