use crate::utils::error::{RecordError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env placeholder pattern is valid")
});

/// Rules applied on top of the built-in shape checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    #[serde(default)]
    pub rows: RowsConfig,
    #[serde(default)]
    pub issues: IssuesConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowsConfig {
    #[serde(default)]
    pub required_columns: Vec<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuesConfig {
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for RowsConfig {
    fn default() -> Self {
        Self {
            required_columns: Vec::new(),
            delimiter: default_delimiter(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            allowed_hosts: Vec::new(),
        }
    }
}

impl CheckConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        tracing::debug!("Loading check config from {}", path.as_ref().display());
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// The rows delimiter as a single byte.
    pub fn delimiter(&self) -> Result<u8> {
        parse_delimiter("rows.delimiter", &self.rows.delimiter)
    }
}

pub fn parse_delimiter(field_name: &str, value: &str) -> Result<u8> {
    let value = match value {
        "\\t" | "tab" => "\t",
        other => other,
    };
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(RecordError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Delimiter must be a single ASCII character".to_string(),
        }),
    }
}

impl Validate for CheckConfig {
    fn validate(&self) -> Result<()> {
        self.delimiter()?;

        for column in &self.rows.required_columns {
            validate_non_empty_string("rows.required_columns", column)?;
        }

        for host in self.issues.allowed_hosts.iter().chain(&self.history.allowed_hosts) {
            if host.trim().is_empty() || host.contains('/') {
                return Err(RecordError::InvalidConfigValueError {
                    field: "allowed_hosts".to_string(),
                    value: host.clone(),
                    reason: "Expected a bare host name such as github.com".to_string(),
                });
            }
        }

        validate_date_format(&self.history.date_format)
    }
}

fn validate_date_format(format: &str) -> Result<()> {
    use chrono::format::{Item, StrftimeItems};

    if format.trim().is_empty()
        || StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
    {
        return Err(RecordError::InvalidConfigValueError {
            field: "history.date_format".to_string(),
            value: format.to_string(),
            reason: "Not a valid strftime format".to_string(),
        });
    }
    Ok(())
}
