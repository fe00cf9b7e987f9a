use crate::config::toml_config::{parse_delimiter, CheckConfig};
use crate::domain::model::RecordKind;
use crate::utils::error::{RecordError, Result};
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "update-records")]
#[command(about = "Check and normalize CSV rows, GitHub issues and update history records")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with extra check rules
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override rows.delimiter from the config file (use "tab" for TSV)
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Decode a document and report every shape violation
    Check {
        #[arg(value_parser = parse_kind)]
        kind: RecordKind,
        file: PathBuf,
    },
    /// Decode a document and print its records as normalized JSON
    Show {
        #[arg(value_parser = parse_kind)]
        kind: RecordKind,
        file: PathBuf,
    },
}

fn parse_kind(value: &str) -> std::result::Result<RecordKind, String> {
    value.parse().map_err(|e: RecordError| e.to_string())
}

impl Command {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Check { kind, .. } | Self::Show { kind, .. } => *kind,
        }
    }

    pub fn file(&self) -> &PathBuf {
        match self {
            Self::Check { file, .. } | Self::Show { file, .. } => file,
        }
    }
}

impl CliConfig {
    /// Loads the TOML rules (or defaults) and applies command-line overrides.
    pub fn load_check_config(&self) -> Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) if !path.is_file() => {
                return Err(RecordError::MissingConfigError {
                    field: path.display().to_string(),
                })
            }
            Some(path) => CheckConfig::from_file(path)?,
            None => CheckConfig::default(),
        };

        if let Some(delimiter) = &self.delimiter {
            tracing::debug!("Delimiter overridden to {:?}", delimiter);
            config.rows.delimiter = delimiter.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("file", &self.command.file().to_string_lossy())?;
        if let Some(path) = &self.config {
            validate_path("config", &path.to_string_lossy())?;
        }
        if let Some(delimiter) = &self.delimiter {
            parse_delimiter("delimiter", delimiter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let config =
            CliConfig::try_parse_from(["update-records", "check", "history", "history.json"])
                .unwrap();
        assert_eq!(config.command.kind(), RecordKind::History);
        assert_eq!(config.command.file(), &PathBuf::from("history.json"));
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let config = CliConfig::try_parse_from([
            "update-records",
            "show",
            "ROWS",
            "data.tsv",
            "--delimiter",
            "tab",
            "--json",
        ])
        .unwrap();
        assert_eq!(config.command.kind(), RecordKind::Rows);
        assert!(config.json);
        assert_eq!(config.load_check_config().unwrap().delimiter().unwrap(), b'\t');
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(CliConfig::try_parse_from(["update-records", "check", "pulls", "x.json"]).is_err());
    }

    #[test]
    fn test_invalid_delimiter_override() {
        let config = CliConfig::try_parse_from([
            "update-records",
            "check",
            "rows",
            "data.csv",
            "--delimiter",
            "||",
        ])
        .unwrap();
        assert!(config.validate().is_err());
        assert!(config.load_check_config().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let config = CliConfig::try_parse_from([
            "update-records",
            "check",
            "issues",
            "issues.json",
            "--config",
            "/nonexistent/update-records.toml",
        ])
        .unwrap();
        let err = config.load_check_config().unwrap_err();
        assert!(matches!(err, RecordError::MissingConfigError { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
