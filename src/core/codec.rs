use crate::domain::model::{CsvRow, GitHubIssue, UpdateHistory};
use crate::utils::error::{RecordError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::io::{Read, Write};

/// Reads every data row of a headed CSV document. Repeated column names are
/// rejected, since each row keeps one value per column.
pub fn read_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<CsvRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    {
        let mut seen = HashSet::new();
        for column in csv_reader.headers()? {
            if !seen.insert(column) {
                return Err(RecordError::validation(
                    "header",
                    format!("Duplicate column name '{}'", column),
                ));
            }
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<CsvRow>() {
        rows.push(record?);
    }

    tracing::debug!("Decoded {} CSV rows", rows.len());
    Ok(rows)
}

/// Writes rows under a header made of the sorted union of their columns.
/// Cells a row does not have are left empty.
pub fn write_rows<W: Write>(writer: W, rows: &[CsvRow], delimiter: u8) -> Result<()> {
    let header: BTreeSet<&str> = rows.iter().flat_map(CsvRow::columns).collect();

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    if header.is_empty() {
        csv_writer.flush()?;
        return Ok(());
    }

    csv_writer.write_record(&header)?;
    for row in rows {
        csv_writer.write_record(header.iter().map(|column| row.get(column).unwrap_or("")))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_issues(content: &str) -> Result<Vec<GitHubIssue>> {
    read_json_records(content)
}

pub fn read_history(content: &str) -> Result<Vec<UpdateHistory>> {
    read_json_records(content)
}

/// Accepts a JSON array of records or a single record object, with or
/// without a leading byte order mark.
fn read_json_records<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let value: serde_json::Value = serde_json::from_str(content)?;
    let records = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?,
        single => vec![serde_json::from_value(single)?],
    };

    tracing::debug!("Decoded {} JSON records", records.len());
    Ok(records)
}

pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
