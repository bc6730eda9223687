//! Gather results.

use std::fmt;

use fallout_core::Object;
use serde::Serialize;

/// One handler's contribution to a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<O> {
    /// Name of the handler that produced this row.
    pub handler: String,
    /// The handler's description of the affected objects.
    pub message: String,
    /// Everything the handler reported as affected, deduplicated, in first-seen order.
    pub affected_objects: Vec<O>,
}

/// The outcome of a gather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report<O> {
    rows: Vec<ReportRow<O>>,
    deleted: Vec<O>,
    levels: usize,
}

impl<O> Default for Report<O> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            deleted: Vec::new(),
            levels: 0,
        }
    }
}

impl<O: Object> Report<O> {
    pub(crate) fn new(rows: Vec<ReportRow<O>>, deleted: Vec<O>, levels: usize) -> Self {
        Self {
            rows,
            deleted,
            levels,
        }
    }

    /// Rows in the order handlers first reported an affected object.
    pub fn rows(&self) -> &[ReportRow<O>] {
        &self.rows
    }

    /// Every object the deletion removes: roots first, then in discovery order.
    pub fn deleted(&self) -> &[O] {
        &self.deleted
    }

    /// Number of type-groups the cascade processed, roots included.
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn messages(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.message.as_str()).collect()
    }

    /// Find the row produced by the handler named `handler`.
    pub fn row_for(&self, handler: &str) -> Option<&ReportRow<O>> {
        self.rows.iter().find(|row| row.handler == handler)
    }

    /// Check if no handler reported an affected object.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn into_rows(self) -> Vec<ReportRow<O>> {
        self.rows
    }
}

impl<O> IntoIterator for Report<O> {
    type Item = ReportRow<O>;
    type IntoIter = std::vec::IntoIter<ReportRow<O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, O> IntoIterator for &'a Report<O> {
    type Item = &'a ReportRow<O>;
    type IntoIter = std::slice::Iter<'a, ReportRow<O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<O> fmt::Display for Report<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "- {}", row.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fallout_core::ObjectRef;

    use super::*;

    fn sample() -> Report<ObjectRef> {
        Report::new(
            vec![
                ReportRow {
                    handler: "team_memberships".to_string(),
                    message: "2 member(s) will lose access".to_string(),
                    affected_objects: vec![
                        ObjectRef::new("auth.User", 1),
                        ObjectRef::new("auth.User", 2),
                    ],
                },
                ReportRow {
                    handler: "team_invites".to_string(),
                    message: "1 pending invite(s) will be revoked".to_string(),
                    affected_objects: vec![ObjectRef::new("org.Invite", "inv-9")],
                },
            ],
            vec![ObjectRef::new("org.Team", 3)],
            1,
        )
    }

    #[test]
    fn test_empty_report() {
        let report: Report<ObjectRef> = Report::default();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
        assert_eq!(report.levels(), 0);
    }

    #[test]
    fn test_display() {
        insta::assert_snapshot!(sample().to_string(), @r"
        - 2 member(s) will lose access
        - 1 pending invite(s) will be revoked
        ");
    }

    #[test]
    fn test_row_lookup() {
        let report = sample();
        let row = report.row_for("team_invites").unwrap();
        assert_eq!(row.affected_objects.len(), 1);
        assert!(report.row_for("missing").is_none());
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_serialize() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["rows"][0]["message"], "2 member(s) will lose access");
        assert_eq!(
            value["rows"][1]["affected_objects"][0],
            serde_json::json!({ "type": "org.Invite", "id": "inv-9" })
        );
        assert_eq!(value["deleted"][0]["id"], 3);
        assert_eq!(value["levels"], 1);
    }
}
