use fallout_core::TypeKey;
use serde::Deserialize;

use crate::MessageTemplate;

/// A declarative handler from a `[handlers.<name>]` table.
///
/// ```toml
/// [handlers.team_memberships]
/// deleted_type = "org.Team"
/// affected = "members"
/// cascade = ["memberships"]
/// message = "{count} member(s) will lose access"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerSpec {
    /// Model label of the objects this handler reacts to.
    pub deleted_type: TypeKey,

    /// Optional human description (shown by `fallout list`).
    #[serde(default)]
    pub description: Option<String>,

    /// Relation whose targets are affected. The deleted objects themselves
    /// are affected when omitted.
    #[serde(default)]
    pub affected: Option<String>,

    /// Relations whose targets are cascade-deleted.
    #[serde(default)]
    pub cascade: Vec<String>,

    /// Message rendered once for everything this handler affected.
    pub message: MessageTemplate,
}

impl HandlerSpec {
    /// All relation names referenced by this handler.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.affected
            .as_deref()
            .into_iter()
            .chain(self.cascade.iter().map(String::as_str))
    }

    /// Returns true if deleting objects of this type can cascade further.
    pub fn cascades(&self) -> bool {
        !self.cascade.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::Manifest;

    fn parse(content: &str) -> Manifest {
        toml::from_str(content).expect("Failed to parse TOML")
    }

    #[test]
    fn test_minimal_handler() {
        let manifest = parse(
            r#"
            [handlers.users]
            deleted_type = "auth.User"
            message = "{count} users deleted"
            "#,
        );

        let spec = &manifest.handlers["users"];
        assert_eq!(spec.deleted_type.as_str(), "auth.User");
        assert_eq!(spec.affected, None);
        assert!(spec.cascade.is_empty());
        assert!(!spec.cascades());
        assert_eq!(spec.message.as_str(), "{count} users deleted");
    }

    #[test]
    fn test_handler_relations() {
        let manifest = parse(
            r#"
            [handlers.teams]
            deleted_type = "org.Team"
            affected = "members"
            cascade = ["memberships", "invites"]
            message = "{count} members lose access"
            "#,
        );

        let spec = &manifest.handlers["teams"];
        let relations: Vec<_> = spec.relations().collect();
        assert_eq!(relations, vec!["members", "memberships", "invites"]);
        assert!(spec.cascades());
    }

    #[test]
    fn test_handlers_keep_declaration_order() {
        let manifest = parse(
            r#"
            [handlers.zeta]
            deleted_type = "a.Z"
            message = "z"

            [handlers.alpha]
            deleted_type = "a.A"
            message = "a"
            "#,
        );

        let names: Vec<_> = manifest.handlers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_bad_template_is_a_parse_error() {
        let result: Result<Manifest, _> = toml::from_str(
            r#"
            [handlers.users]
            deleted_type = "auth.User"
            message = "{total} users"
            "#,
        );
        let err = result.unwrap_err();
        assert!(err.message().contains("unknown placeholder"));
    }
}
