use crate::config::CheckConfig;
use crate::core::codec;
use crate::domain::model::{ChangeCounts, CsvRow, GitHubIssue, RecordKind, UpdateHistory};
use crate::utils::error::{RecordError, Result};
use crate::utils::validation::{
    validate_date, validate_host, validate_non_empty_string, validate_positive_number,
    validate_required_columns, validate_rfc3339, Validate,
};
use serde::Serialize;
use std::path::Path;

/// A decoded document: every record of one shape, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Rows(Vec<CsvRow>),
    Issues(Vec<GitHubIssue>),
    History(Vec<UpdateHistory>),
}

impl Document {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Rows(_) => RecordKind::Rows,
            Self::Issues(_) => RecordKind::Issues,
            Self::History(_) => RecordKind::History,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Issues(issues) => issues.len(),
            Self::History(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Zero-based record position in the document.
    pub index: usize,
    pub field: String,
    pub message: String,
}

impl Violation {
    fn from_error(index: usize, error: RecordError) -> Self {
        let (field, message) = match error {
            RecordError::ValidationError { field, message } => (field, message),
            other => {
                let field = match &other {
                    RecordError::TimestampError { field, .. } => field.clone(),
                    _ => String::new(),
                };
                (field, other.to_string())
            }
        };
        Self {
            index,
            field,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub kind: RecordKind,
    pub records: usize,
    pub violations: Vec<Violation>,
    /// Summed change counts, for history documents only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<ChangeCounts>,
}

impl CheckReport {
    pub fn is_conforming(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turns a failing report into an error carrying the violation count.
    pub fn into_result(self) -> Result<Self> {
        if self.is_conforming() {
            Ok(self)
        } else {
            Err(RecordError::NonConformingError {
                kind: self.kind.to_string(),
                violations: self.violations.len(),
            })
        }
    }
}

pub struct ShapeChecker {
    config: CheckConfig,
}

impl ShapeChecker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn decode_str(&self, kind: RecordKind, content: &str) -> Result<Document> {
        tracing::debug!("Decoding {} document ({} bytes)", kind, content.len());
        let document = match kind {
            RecordKind::Rows => {
                Document::Rows(codec::read_rows(content.as_bytes(), self.config.delimiter()?)?)
            }
            RecordKind::Issues => Document::Issues(codec::read_issues(content)?),
            RecordKind::History => Document::History(codec::read_history(content)?),
        };
        tracing::info!("Decoded {} {} record(s)", document.len(), kind);
        Ok(document)
    }

    pub fn decode_file<P: AsRef<Path>>(&self, kind: RecordKind, path: P) -> Result<Document> {
        let path = path.as_ref();
        tracing::info!("Reading {} from {}", kind, path.display());
        let content = String::from_utf8(std::fs::read(path)?)?;
        self.decode_str(kind, &content)
    }

    pub fn check_str(&self, kind: RecordKind, content: &str) -> Result<CheckReport> {
        let document = self.decode_str(kind, content)?;
        Ok(self.check_document(&document))
    }

    pub fn check_file<P: AsRef<Path>>(&self, kind: RecordKind, path: P) -> Result<CheckReport> {
        let document = self.decode_file(kind, path)?;
        Ok(self.check_document(&document))
    }

    pub fn check_document(&self, document: &Document) -> CheckReport {
        let mut violations = Vec::new();
        let mut totals = None;

        match document {
            Document::Rows(rows) => {
                for (index, row) in rows.iter().enumerate() {
                    violations.extend(self.check_row(index, row));
                }
            }
            Document::Issues(issues) => {
                for (index, issue) in issues.iter().enumerate() {
                    violations.extend(self.check_issue(index, issue));
                }
            }
            Document::History(entries) => {
                let mut sum = ChangeCounts::default();
                for (index, entry) in entries.iter().enumerate() {
                    violations.extend(self.check_history(index, entry));
                    sum += entry.changes;
                }
                totals = Some(sum);
            }
        }

        for violation in &violations {
            tracing::debug!(
                "Record {} field '{}': {}",
                violation.index,
                violation.field,
                violation.message
            );
        }

        let report = CheckReport {
            kind: document.kind(),
            records: document.len(),
            violations,
            totals,
        };

        if report.is_conforming() {
            tracing::info!("All {} {} record(s) conform", report.records, report.kind);
        } else {
            tracing::warn!(
                "{} violation(s) in {} {} record(s)",
                report.violations.len(),
                report.records,
                report.kind
            );
        }

        report
    }

    fn check_row(&self, index: usize, row: &CsvRow) -> Vec<Violation> {
        let mut errors = validate_required_columns(row, &self.config.rows.required_columns);
        if let Err(e) = row.validate() {
            errors.push(e);
        }
        collect(index, errors.into_iter().map(Err))
    }

    fn check_issue(&self, index: usize, issue: &GitHubIssue) -> Vec<Violation> {
        collect(
            index,
            [
                validate_positive_number("number", issue.number, 1),
                validate_non_empty_string("title", &issue.title),
                validate_rfc3339("created_at", &issue.created_at),
                validate_host("html_url", &issue.html_url, &self.config.issues.allowed_hosts),
            ],
        )
    }

    fn check_history(&self, index: usize, entry: &UpdateHistory) -> Vec<Violation> {
        let date_check = validate_non_empty_string("date", &entry.date)
            .and_then(|_| validate_date("date", &entry.date, &self.config.history.date_format));

        collect(
            index,
            [
                date_check,
                validate_host(
                    "commitUrl",
                    &entry.commit_url,
                    &self.config.history.allowed_hosts,
                ),
            ],
        )
    }
}

fn collect<I>(index: usize, results: I) -> Vec<Violation>
where
    I: IntoIterator<Item = Result<()>>,
{
    results
        .into_iter()
        .filter_map(|r| r.err())
        .map(|e| Violation::from_error(index, e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = r#"[
        {"date": "2024-01-10", "changes": {"added": 5, "modified": 2, "removed": 0}, "commitUrl": "https://github.com/o/r/commit/a1"},
        {"date": "2024-01-17", "changes": {"added": 0, "modified": 1, "removed": 3}, "commitUrl": "https://github.com/o/r/commit/b2"}
    ]"#;

    #[test]
    fn test_history_totals() {
        let checker = ShapeChecker::new(CheckConfig::default());
        let report = checker.check_str(RecordKind::History, HISTORY).unwrap();

        assert!(report.is_conforming());
        assert_eq!(report.records, 2);
        assert_eq!(report.totals, Some(ChangeCounts::new(5, 3, 3)));
    }

    #[test]
    fn test_history_totals_saturate() {
        let content = r#"[
            {"date": "2024-01-10", "changes": {"added": 18446744073709551615, "modified": 0, "removed": 0}, "commitUrl": "https://github.com/o/r/commit/a1"},
            {"date": "2024-01-11", "changes": {"added": 18446744073709551615, "modified": 1, "removed": 0}, "commitUrl": "https://github.com/o/r/commit/b2"}
        ]"#;
        let report = ShapeChecker::new(CheckConfig::default())
            .check_str(RecordKind::History, content)
            .unwrap();

        assert!(report.is_conforming());
        assert_eq!(report.totals, Some(ChangeCounts::new(u64::MAX, 1, 0)));
        assert_eq!(report.totals.unwrap().total(), u64::MAX);
    }

    #[test]
    fn test_duplicate_columns_fail_decoding() {
        let checker = ShapeChecker::new(CheckConfig::default());
        let err = checker.check_str(RecordKind::Rows, "id,id\n1,2\n").unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_history_date_format_rule() {
        let mut config = CheckConfig::default();
        config.history.date_format = "%d/%m/%Y".to_string();
        let report = ShapeChecker::new(config)
            .check_str(RecordKind::History, HISTORY)
            .unwrap();

        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.field == "date"));
        assert_eq!(report.violations[1].index, 1);
    }

    #[test]
    fn test_issue_collects_every_violation() {
        let content = r#"{"number": 0, "title": "", "body": "", "created_at": "soon", "html_url": "gitlab"}"#;
        let report = ShapeChecker::new(CheckConfig::default())
            .check_str(RecordKind::Issues, content)
            .unwrap();

        let fields: Vec<&str> = report.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["number", "title", "created_at", "html_url"]);
        assert!(report.totals.is_none());
        assert!(matches!(
            report.into_result(),
            Err(RecordError::NonConformingError { violations: 4, .. })
        ));
    }

    #[test]
    fn test_issue_host_allow_list() {
        let mut config = CheckConfig::default();
        config.issues.allowed_hosts = vec!["github.com".to_string()];
        let content = r#"[
            {"number": 1, "title": "ok", "body": "", "created_at": "2024-01-01T00:00:00Z", "html_url": "https://github.com/o/r/issues/1"},
            {"number": 2, "title": "elsewhere", "body": "", "created_at": "2024-01-01T00:00:00Z", "html_url": "https://example.org/issues/2"}
        ]"#;
        let report = ShapeChecker::new(config)
            .check_str(RecordKind::Issues, content)
            .unwrap();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].index, 1);
        assert_eq!(report.violations[0].field, "html_url");
    }

    #[test]
    fn test_rows_required_columns() {
        let mut config = CheckConfig::default();
        config.rows.required_columns = vec!["code".to_string(), "name".to_string()];
        let report = ShapeChecker::new(config)
            .check_str(RecordKind::Rows, "code,label\n1,a\n2,b\n")
            .unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.field == "name"));
    }

    #[test]
    fn test_decode_failure_is_error() {
        let checker = ShapeChecker::new(CheckConfig::default());
        assert!(checker.check_str(RecordKind::History, "[{\"date\": 1}]").is_err());
        assert!(checker.check_str(RecordKind::Issues, "not json").is_err());
    }

    #[test]
    fn test_empty_document_conforms() {
        let checker = ShapeChecker::new(CheckConfig::default());
        let report = checker.check_str(RecordKind::History, "[]").unwrap();
        assert!(report.is_conforming());
        assert_eq!(report.totals, Some(ChangeCounts::default()));
    }

    #[test]
    fn test_report_serializes_without_totals_for_rows() {
        let report = ShapeChecker::new(CheckConfig::default())
            .check_str(RecordKind::Rows, "a\n1\n")
            .unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "rows");
        assert_eq!(value["records"], 1);
        assert!(value.get("totals").is_none());
    }
}
