//! Parsing and validation tests for fallout.toml.

use std::str::FromStr;

use fallout_manifest::{Error, FalloutToml, Manifest};

const TEAMS: &str = r#"
[engine]
max_depth = 16

[handlers.team_memberships]
deleted_type = "org.Team"
description = "Members of a deleted team lose access"
affected = "members"
cascade = ["memberships"]
message = "{count} member(s) will lose access"

[handlers.membership_audit]
deleted_type = "org.Membership"
message = "{count} membership(s) removed"
"#;

#[test]
fn test_parse_valid_manifest() {
    let manifest = Manifest::from_str(TEAMS).expect("manifest should parse");

    assert_eq!(manifest.engine.max_depth, Some(16));
    assert_eq!(manifest.handlers.len(), 2);

    let teams = &manifest.handlers["team_memberships"];
    assert_eq!(teams.deleted_type.as_str(), "org.Team");
    assert_eq!(teams.affected.as_deref(), Some("members"));
    assert_eq!(teams.cascade, vec!["memberships".to_string()]);
}

#[test]
fn test_empty_manifest_is_valid() {
    let manifest = Manifest::from_str("").expect("empty manifest should parse");
    assert!(manifest.handlers.is_empty());
    assert_eq!(manifest.engine.max_depth, None);
    assert_eq!(manifest.engine.max_deleted, None);
}

#[test]
fn test_invalid_handler_name() {
    let err = Manifest::from_str(
        r#"
        [handlers.2fast]
        deleted_type = "auth.User"
        message = "x"
        "#,
    )
    .unwrap_err();

    match *err {
        Error::InvalidIdentifier {
            ref name,
            ref context,
            span,
            ..
        } => {
            assert_eq!(name, "2fast");
            assert_eq!(context, "handler");
            assert!(span.is_some());
        }
        other => panic!("expected InvalidIdentifier, got {other:?}"),
    }
}

#[test]
fn test_invalid_deleted_type() {
    let err = Manifest::from_str(
        r#"
        [handlers.users]
        deleted_type = "auth..User"
        message = "x"
        "#,
    )
    .unwrap_err();

    match *err {
        Error::InvalidTypeLabel {
            ref label,
            ref handler,
            span,
            ..
        } => {
            assert_eq!(label, "auth..User");
            assert_eq!(handler, "users");
            assert!(span.is_some());
        }
        other => panic!("expected InvalidTypeLabel, got {other:?}"),
    }
}

#[test]
fn test_invalid_relation_name() {
    let err = Manifest::from_str(
        r#"
        [handlers.teams]
        deleted_type = "org.Team"
        cascade = ["member ships"]
        message = "x"
        "#,
    )
    .unwrap_err();

    assert!(matches!(*err, Error::InvalidIdentifier { .. }));
    assert!(err.to_string().contains("relation in 'handlers.teams'"));
}

#[test]
fn test_duplicate_cascade_relation() {
    let err = Manifest::from_str(
        r#"
        [handlers.teams]
        deleted_type = "org.Team"
        cascade = ["memberships", "memberships"]
        message = "x"
        "#,
    )
    .unwrap_err();

    match *err {
        Error::DuplicateRelation {
            ref relation,
            ref handler,
            first_span,
            second_span,
            ..
        } => {
            assert_eq!(relation, "memberships");
            assert_eq!(handler, "teams");
            assert!(first_span.is_some());
            assert!(second_span.is_some());
            assert_ne!(first_span, second_span);
        }
        other => panic!("expected DuplicateRelation, got {other:?}"),
    }
}

#[test]
fn test_zero_max_depth() {
    let err = Manifest::from_str("[engine]\nmax_depth = 0\n").unwrap_err();
    match *err {
        Error::Validation { ref message, span, .. } => {
            assert_eq!(message, "max_depth must be at least 1");
            assert_eq!(span.map(|s| s.offset()), Some(9));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn test_zero_max_deleted() {
    let err = Manifest::from_str("[engine]\nmax_deleted = 0\n").unwrap_err();
    match *err {
        Error::Validation { ref message, span, .. } => {
            assert_eq!(message, "max_deleted must be at least 1");
            assert_eq!(span.map(|s| s.offset()), Some(9));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn test_missing_message_is_parse_error() {
    let err = Manifest::from_str(
        r#"
        [handlers.users]
        deleted_type = "auth.User"
        "#,
    )
    .unwrap_err();

    assert!(matches!(*err, Error::Parse { .. }));
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallout.toml");
    std::fs::write(&path, TEAMS).unwrap();

    let file = FalloutToml::open(&path).expect("file should parse");
    assert_eq!(file.path(), path.as_path());
    assert_eq!(file.content(), TEAMS);
    assert_eq!(file.manifest().handlers.len(), 2);

    let manifest = Manifest::from_file(&path).unwrap();
    assert_eq!(manifest.handlers.len(), 2);
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = FalloutToml::open(dir.path().join("missing.toml"))
        .err()
        .expect("missing file should fail");
    assert!(matches!(*err, Error::Io { .. }));
}
