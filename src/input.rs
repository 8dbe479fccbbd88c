//! Reading construction files from disk.
//!
//! `.json` holds either a serialized [`ConstructionFile`] (an object) or a
//! list of blobs, `.csv`/`.tsv` one table, and anything else plain CF text.

use crate::{
    error::CfError,
    parser::{Blob, Cell, ParseReport, parse_blobs},
};
use cfsim_protocol::{ConstructionFile, ConstructionStep};
use csv::ReaderBuilder;
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq)]
pub enum InputDocument {
    ConstructionFile(ConstructionFile),
    Blobs(Vec<Blob>),
}

impl InputDocument {
    pub fn from_json_text(text: &str) -> Result<Self, CfError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(match value {
            serde_json::Value::Object(_) => {
                check_step_operations(&value)?;
                Self::ConstructionFile(serde_json::from_value(value)?)
            }
            serde_json::Value::Array(_) => Self::Blobs(serde_json::from_value(value)?),
            other => Self::Blobs(vec![serde_json::from_value(other)?]),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CfError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Self::from_json_text(&text),
            "csv" => Ok(Self::Blobs(vec![table_from_delimited(&text, b',')?])),
            "tsv" => Ok(Self::Blobs(vec![table_from_delimited(&text, b'\t')?])),
            _ => Ok(Self::Blobs(vec![Blob::text(&text)])),
        }
    }

    /// Parses blob documents; serialized construction files pass through.
    pub fn into_report(self, strict: bool) -> Result<ParseReport, CfError> {
        match self {
            Self::ConstructionFile(construction_file) => Ok(ParseReport {
                construction_file,
                ..ParseReport::default()
            }),
            Self::Blobs(blobs) => parse_blobs(&blobs, strict),
        }
    }
}

// Unknown step tags would otherwise surface as a serde error.
fn check_step_operations(value: &serde_json::Value) -> Result<(), CfError> {
    let steps = value["steps"].as_array().map(Vec::as_slice).unwrap_or_default();
    match steps
        .iter()
        .filter_map(|step| step["operation"].as_str())
        .find(|operation| !ConstructionStep::OPERATIONS.contains(operation))
    {
        Some(operation) => Err(CfError::UnsupportedOperation {
            operation: operation.to_string(),
        }),
        None => Ok(()),
    }
}

/// One 2-D table blob from delimited text, cell for cell.
pub fn table_from_delimited(text: &str, delimiter: u8) -> Result<Blob, CfError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut rows = vec![];
    for record in rdr.records() {
        rows.push(
            record?
                .iter()
                .map(|s| match s.trim() {
                    "" => Cell::Empty,
                    s => Cell::from(s),
                })
                .collect(),
        );
    }
    Ok(Blob::Table(rows))
}

/// Reads several files into one construction file, in order. Steps are
/// appended; a sequence defined again replaces the earlier definition and
/// is listed in [`ParseReport::redefined`].
pub fn load_construction_file<P: AsRef<Path>>(
    paths: &[P],
    strict: bool,
) -> Result<ParseReport, CfError> {
    let mut ret = ParseReport::default();
    for path in paths {
        let report = InputDocument::from_path(path)?.into_report(strict)?;
        merge_report(&mut ret, report);
    }
    Ok(ret)
}

fn merge_report(into: &mut ParseReport, report: ParseReport) {
    into.construction_file
        .steps
        .extend(report.construction_file.steps);
    for (name, sequence) in report.construction_file.sequences {
        if into
            .construction_file
            .sequences
            .insert(name.clone(), sequence)
            .is_some()
            && !into.redefined.contains(&name)
        {
            into.redefined.push(name);
        }
    }
    into.skipped.extend(report.skipped);
    for name in report.redefined {
        if !into.redefined.contains(&name) {
            into.redefined.push(name);
        }
    }
}
