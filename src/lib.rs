pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::CheckConfig;

pub use core::check::{CheckReport, Document, ShapeChecker, Violation};
pub use domain::model::{ChangeCounts, CsvRow, GitHubIssue, RecordKind, UpdateHistory};
pub use utils::error::{RecordError, Result};
