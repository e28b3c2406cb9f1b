use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line_id: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSpan {
    pub start: Position,
    pub end: Position,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub page_id: String,
    pub attribute: String,
    #[serde(
        rename = "ENE",
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub ene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_offset: Option<OffsetSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_offset: Option<OffsetSpan>,
}

impl AnnotationRecord {
    pub fn offset(&self, kind: OffsetKind) -> Option<&OffsetSpan> {
        match kind {
            OffsetKind::Html => self.html_offset.as_ref(),
            OffsetKind::Text => self.text_offset.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetKind {
    Html,
    Text,
}

impl OffsetKind {
    pub const ALL: [OffsetKind; 2] = [OffsetKind::Html, OffsetKind::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "text",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Html => "html_offset",
            Self::Text => "text_offset",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for OffsetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (start line, start column, end line, end column); equal only when all four match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CanonicalSpan {
    pub start_line: usize,
    pub start_offset: usize,
    pub end_line: usize,
    pub end_offset: usize,
}

impl From<&OffsetSpan> for CanonicalSpan {
    fn from(span: &OffsetSpan) -> Self {
        Self {
            start_line: span.start.line_id,
            start_offset: span.start.offset,
            end_line: span.end.line_id,
            end_offset: span.end.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountBucket {
    pub tp: usize,
    pub tpfp: usize,
    pub tpfn: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "F1")]
    pub f1: f64,
}

/// Scores of one offset kind: one entry per gold attribute plus both averages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeScores {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, ScoreEntry>,
    pub macro_ave: ScoreEntry,
    pub micro_ave: ScoreEntry,
    #[serde(skip)]
    pub counts: BTreeMap<String, CountBucket>,
}

impl AttributeScores {
    pub const MACRO_AVE: &'static str = "macro_ave";
    pub const MICRO_AVE: &'static str = "micro_ave";

    pub fn rows(&self) -> impl Iterator<Item = (&str, &ScoreEntry)> {
        self.attributes
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .chain([
                (Self::MACRO_AVE, &self.macro_ave),
                (Self::MICRO_AVE, &self.micro_ave),
            ])
    }

    pub fn get(&self, name: &str) -> Option<&ScoreEntry> {
        match name {
            Self::MACRO_AVE => Some(&self.macro_ave),
            Self::MICRO_AVE => Some(&self.micro_ave),
            _ => self.attributes.get(name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ScoreReport(pub BTreeMap<OffsetKind, AttributeScores>);

impl ScoreReport {
    pub fn get(&self, kind: OffsetKind) -> Option<&AttributeScores> {
        self.0.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = OffsetKind> + '_ {
        self.0.keys().copied()
    }

    /// Micro-averaged F1 of the text pass, or of the html pass when no text
    /// pass ran.
    pub fn headline(&self) -> Option<(OffsetKind, f64)> {
        [OffsetKind::Text, OffsetKind::Html]
            .into_iter()
            .find_map(|kind| self.get(kind).map(|scores| (kind, scores.micro_ave.f1)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error_type")]
pub enum ErrorRow {
    #[serde(rename = "Not Found")]
    NotFound { page_id: String },
    #[serde(rename = "Different offset")]
    DifferentOffset {
        page_id: String,
        title: String,
        start: Position,
        end: Position,
        text: String,
        extracted_string: String,
    },
}

impl ErrorRow {
    pub const CSV_HEADER: [&'static str; 9] = [
        "page_id",
        "error_type",
        "title",
        "start_lineid",
        "start_offset",
        "end_lineid",
        "end_offset",
        "text",
        "extracted_string",
    ];

    pub fn page_id(&self) -> &str {
        match self {
            Self::NotFound { page_id } | Self::DifferentOffset { page_id, .. } => page_id,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Not Found",
            Self::DifferentOffset { .. } => "Different offset",
        }
    }

    pub fn csv_record(&self) -> Vec<String> {
        match self {
            Self::NotFound { page_id } => vec![page_id.clone(), self.error_type().to_string()],
            Self::DifferentOffset {
                page_id,
                title,
                start,
                end,
                text,
                extracted_string,
            } => vec![
                page_id.clone(),
                self.error_type().to_string(),
                title.clone(),
                start.line_id.to_string(),
                start.offset.to_string(),
                end.line_id.to_string(),
                end.offset.to_string(),
                text.clone(),
                extracted_string.clone(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorReport(pub BTreeMap<OffsetKind, Vec<ErrorRow>>);

impl ErrorReport {
    pub fn get(&self, kind: OffsetKind) -> Option<&[ErrorRow]> {
        self.0.get(&kind).map(Vec::as_slice)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(value) => value,
            StringOrNumber::Integer(value) => value.to_string(),
            StringOrNumber::Float(value) => value.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub category: String,
    pub submission_file: String,
    pub submission_sha256: String,
    pub ene: String,
    pub target_count: usize,
    pub headline_kind: Option<OffsetKind>,
    pub headline_f1: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub offset_error_counts: BTreeMap<OffsetKind, usize>,
    pub scores: ScoreReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub settings_path: String,
    pub submission_dir: String,
    pub category_count: usize,
    pub overall: f64,
    pub categories: Vec<CategoryResult>,
}
