pub mod check;
pub mod codec;

pub use crate::domain::model::{ChangeCounts, CsvRow, GitHubIssue, RecordKind, UpdateHistory};
pub use crate::utils::error::Result;
