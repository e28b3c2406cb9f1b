use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::error::{Result, ScoreError};
use crate::model::AnnotationRecord;

const REQUIRED_FIELDS: [&str; 2] = ["page_id", "attribute"];

/// Annotations either already parsed by the caller or stored as JSON lines.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Records(Vec<Value>),
    Path(PathBuf),
}

impl From<Vec<Value>> for RecordSource {
    fn from(records: Vec<Value>) -> Self {
        Self::Records(records)
    }
}

impl From<PathBuf> for RecordSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for RecordSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

pub fn load_records(source: RecordSource) -> Result<Vec<AnnotationRecord>> {
    match source {
        RecordSource::Records(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| parse_record(value, format!("record #{index}")))
            .collect(),
        RecordSource::Path(path) => load_json_lines(&path),
    }
}

pub fn load_json_lines(path: &Path) -> Result<Vec<AnnotationRecord>> {
    let raw = fs::read_to_string(path).map_err(|err| ScoreError::from_io(path, err))?;

    let mut records = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let location = format!("{}:{}", path.display(), index + 1);
        let value: Value =
            serde_json::from_str(line).map_err(|err| ScoreError::format(&location, err))?;
        records.push(parse_record(value, location)?);
    }

    Ok(records)
}

fn parse_record(value: Value, location: String) -> Result<AnnotationRecord> {
    let Some(object) = value.as_object() else {
        return Err(ScoreError::format(location, "expected a JSON object"));
    };
    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(ScoreError::missing_field(location, field));
        }
    }

    serde_json::from_value(value).map_err(|err| ScoreError::format(location, err))
}

/// Resolves a target-page argument: a JSON array literal when it starts with
/// `[`, otherwise the path of a CSV file whose cells are flattened in order.
pub fn load_target(input: &str) -> Result<Vec<String>> {
    if input.trim_start().starts_with('[') {
        parse_target_literal(input)
    } else {
        load_target_csv(Path::new(input))
    }
}

fn parse_target_literal(literal: &str) -> Result<Vec<String>> {
    let values: Vec<Value> = serde_json::from_str(literal)
        .map_err(|err| ScoreError::format("target literal", err))?;

    values
        .into_iter()
        .map(|value| match value {
            Value::String(page_id) => Ok(page_id),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(ScoreError::format(
                "target literal",
                format!("unsupported page id: {other}"),
            )),
        })
        .collect()
}

fn load_target_csv(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|err| ScoreError::from_io(path, err))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut target = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| ScoreError::format(path.display().to_string(), err))?;
        target.extend(
            row.iter()
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(ToOwned::to_owned),
        );
    }

    Ok(target)
}
