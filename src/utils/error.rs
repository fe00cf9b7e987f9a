use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Input is not valid UTF-8: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid timestamp in '{field}' ({value}): {source}")]
    TimestampError {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error in '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Document is not a conforming {kind} document ({violations} violation(s))")]
    NonConformingError { kind: String, violations: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Io,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecordError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::CsvError(e) if e.is_io_error() => ErrorCategory::Io,
            Self::EncodingError(_)
            | Self::CsvError(_)
            | Self::JsonError(_)
            | Self::TimestampError { .. } => ErrorCategory::Input,
            Self::TomlError(_)
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::ValidationError { .. } | Self::NonConformingError { .. } => {
                ErrorCategory::Validation
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::Critical,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::EncodingError(_) => "Save the file as UTF-8 and try again",
            Self::CsvError(_) => {
                "Make sure the file has a header row and every row has the same number of fields"
            }
            Self::JsonError(_) => "Make sure the file is a JSON object or an array of objects",
            Self::TomlError(_) => "Fix the TOML syntax in the configuration file",
            Self::TimestampError { .. } => "Use RFC 3339 timestamps, e.g. 2024-01-31T12:00:00Z",
            Self::InvalidConfigValueError { .. } | Self::MissingConfigError { .. } => {
                "Review the configuration file and command-line options"
            }
            Self::ValidationError { .. } | Self::NonConformingError { .. } => {
                "Run the check with --verbose to list every violation"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("Could not read input: {}", e),
            Self::EncodingError(_) => "The input file is not valid UTF-8 text".to_string(),
            Self::CsvError(e) => format!("The CSV input could not be decoded: {}", e),
            Self::JsonError(e) => format!("The JSON input could not be decoded: {}", e),
            Self::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            Self::NonConformingError { kind, violations } => {
                format!("{} violation(s) found in {} document", violations, kind)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
