use crate::domain::model::{CsvRow, GitHubIssue, UpdateHistory};
use crate::utils::error::{RecordError, Result};
use chrono::{DateTime, NaiveDate};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    parse_http_url(field_name, url_str).map(|_| ())
}

fn parse_http_url(field_name: &str, url_str: &str) -> Result<Url> {
    if url_str.is_empty() {
        return Err(RecordError::validation(field_name, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(RecordError::validation(
                field_name,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(RecordError::validation(
            field_name,
            format!("Invalid URL format: {}", e),
        )),
    }
}

/// Checks that `url_str` is an http(s) URL whose host is in `allowed_hosts`.
/// An empty allow-list accepts any host.
pub fn validate_host(field_name: &str, url_str: &str, allowed_hosts: &[String]) -> Result<()> {
    let url = parse_http_url(field_name, url_str)?;
    if allowed_hosts.is_empty() {
        return Ok(());
    }

    let host = url.host_str().unwrap_or_default();
    if allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        Ok(())
    } else {
        Err(RecordError::validation(
            field_name,
            format!(
                "Host '{}' is not allowed. Allowed hosts: {}",
                host,
                allowed_hosts.join(", ")
            ),
        ))
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RecordError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RecordError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RecordError::validation(
            field_name,
            format!("Value must be at least {}, got {}", min_value, value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecordError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_rfc3339(field_name: &str, value: &str) -> Result<()> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|source| RecordError::TimestampError {
            field: field_name.to_string(),
            value: value.to_string(),
            source,
        })
}

pub fn validate_date(field_name: &str, value: &str, format: &str) -> Result<()> {
    NaiveDate::parse_from_str(value, format)
        .map(|_| ())
        .map_err(|source| RecordError::TimestampError {
            field: field_name.to_string(),
            value: value.to_string(),
            source,
        })
}

/// Returns one error per missing column, in the order given.
pub fn validate_required_columns(row: &CsvRow, columns: &[String]) -> Vec<RecordError> {
    columns
        .iter()
        .filter(|column| row.get(column).is_none())
        .map(|column| RecordError::validation(column.as_str(), "Required column is missing"))
        .collect()
}

impl Validate for CsvRow {
    fn validate(&self) -> Result<()> {
        if self.columns().any(|c| c.trim().is_empty()) {
            return Err(RecordError::validation(
                "columns",
                "Column names cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Validate for GitHubIssue {
    fn validate(&self) -> Result<()> {
        validate_positive_number("number", self.number, 1)?;
        validate_non_empty_string("title", &self.title)?;
        validate_rfc3339("created_at", &self.created_at)?;
        validate_url("html_url", &self.html_url)
    }
}

impl Validate for UpdateHistory {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("date", &self.date)?;
        validate_url("commitUrl", &self.commit_url)
    }
}
