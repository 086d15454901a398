//! Raw corpus loading.
//!
//! The corpus is tabular: either CSV with a header row or a JSON array of
//! row objects keyed by column name. Loading is all-or-nothing: a file that
//! cannot be parsed, a ragged CSV row, or a required column missing from the
//! header is a [`BrainbugError::MalformedInput`] and no records are returned.
//! Empty cells are fine here; the curator decides what to drop.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::error::{BrainbugError, Result};
use crate::domain::record::{RawBugRecord, REQUIRED_COLUMNS};

fn csv_error(err: csv::Error) -> BrainbugError {
    if err.is_io_error() {
        BrainbugError::Csv(err)
    } else {
        BrainbugError::MalformedInput(err.to_string())
    }
}

fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: BTreeSet<&str> = present.into_iter().map(str::trim).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !present.contains(col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BrainbugError::MalformedInput(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Read CSV records from any reader. The first row must be the header.
pub fn read_corpus_csv<R: Read>(reader: R) -> Result<Vec<RawBugRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    check_columns(headers.iter())?;

    let records = rdr
        .deserialize::<RawBugRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    debug!(rows = records.len(), "parsed csv corpus");
    Ok(records)
}

/// Numbers and booleans become their text form so cells read the same as
/// in CSV. `null` stays missing; arrays and objects are left for the record
/// deserializer to reject.
fn stringify_scalars(row: Map<String, Value>) -> Map<String, Value> {
    row.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Number(n) => Value::String(n.to_string()),
                Value::Bool(b) => Value::String(b.to_string()),
                other => other,
            };
            (key, value)
        })
        .collect()
}

/// Read records from a JSON array of row objects.
pub fn read_corpus_json(content: &str) -> Result<Vec<RawBugRecord>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(content).map_err(|e| {
        BrainbugError::MalformedInput(format!("corpus is not a JSON array of objects: {e}"))
    })?;

    if !rows.is_empty() {
        check_columns(rows.iter().flat_map(|row| row.keys().map(String::as_str)))?;
    }

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            serde_json::from_value::<RawBugRecord>(Value::Object(stringify_scalars(row)))
                .map_err(|e| BrainbugError::MalformedInput(format!("row {idx}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = records.len(), "parsed json corpus");
    Ok(records)
}

/// Read a corpus file, choosing the format by extension (`.json` is JSON,
/// anything else CSV).
pub fn read_corpus(path: &Path) -> Result<Vec<RawBugRecord>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let content = std::fs::read_to_string(path)?;
        read_corpus_json(&content)
    } else {
        let file = std::fs::File::open(path)?;
        read_corpus_csv(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Faulty Code,Fault Free Code,Fault_Acronym,Implementation-Level Description,Bug_Description,Project,Diff_patch";

    #[test]
    fn test_csv_reads_rows_and_empty_cells() {
        let data = format!(
            "{HEADER}\n\"x = f(a)\",\"x = f(b)\",WPFV,wrong arg,desc,proj,\"-a\n+b\"\n\"y\",,MFC,,,,\n"
        );
        let records = read_corpus_csv(data.as_bytes()).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fault_acronym_text(), "WPFV");
        assert_eq!(records[0].diff_patch_text(), "-a\n+b");
        assert!(records[0].is_usable());
        assert!(!records[1].is_usable());
    }

    #[test]
    fn test_csv_missing_column_is_malformed() {
        let data = "Faulty Code,Fault Free Code\na,b\n";
        let err = read_corpus_csv(data.as_bytes()).expect_err("should fail");
        match err {
            BrainbugError::MalformedInput(msg) => {
                assert!(msg.contains("Fault_Acronym"));
                assert!(msg.contains("Diff_patch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_csv_ragged_row_is_malformed() {
        let data = format!("{HEADER}\na,b,c\n");
        let err = read_corpus_csv(data.as_bytes()).expect_err("should fail");
        assert!(matches!(err, BrainbugError::MalformedInput(_)));
    }

    #[test]
    fn test_json_reads_rows() {
        let content = serde_json::json!([
            {
                "Faulty Code": "a", "Fault Free Code": "b", "Fault_Acronym": "WAV",
                "Implementation-Level Description": "", "Bug_Description": "",
                "Project": "p", "Diff_patch": ""
            },
            { "Faulty Code": "c", "Fault Free Code": null }
        ])
        .to_string();
        let records = read_corpus_json(&content).expect("parse");
        assert_eq!(records.len(), 2);
        assert!(records[0].is_usable());
        assert!(!records[1].is_usable());
    }

    #[test]
    fn test_json_scalar_cells_read_as_text() {
        let content = serde_json::json!([{
            "Faulty Code": "x = 1", "Fault Free Code": "x = 2", "Fault_Acronym": "WAV",
            "Implementation-Level Description": "", "Bug_Description": false,
            "Project": 12345, "Diff_patch": 1.5, "Bug_Type": null
        }])
        .to_string();
        let records = read_corpus_json(&content).expect("parse");
        assert_eq!(records[0].project_text(), "12345");
        assert_eq!(records[0].bug_description_text(), "false");
        assert_eq!(records[0].diff_patch_text(), "1.5");
        assert_eq!(records[0].bug_type_text(), "WAV");
    }

    #[test]
    fn test_json_nested_cell_is_malformed() {
        let content = serde_json::json!([{
            "Faulty Code": "a", "Fault Free Code": "b", "Fault_Acronym": "WAV",
            "Implementation-Level Description": "", "Bug_Description": "",
            "Project": ["p"], "Diff_patch": ""
        }])
        .to_string();
        let err = read_corpus_json(&content).expect_err("should fail");
        assert!(matches!(err, BrainbugError::MalformedInput(msg) if msg.starts_with("row 0")));
    }

    #[test]
    fn test_json_not_an_array_is_malformed() {
        let err = read_corpus_json("{\"a\": 1}").expect_err("should fail");
        assert!(matches!(err, BrainbugError::MalformedInput(_)));
    }

    #[test]
    fn test_json_empty_array_is_empty_corpus() {
        assert!(read_corpus_json("[]").expect("parse").is_empty());
    }
}
