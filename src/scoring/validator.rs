use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::error::{Result, ScoreError};
use super::index::AnnotationIndex;
use crate::model::{ErrorRow, OffsetKind, OffsetSpan};

/// Resolves a page id to the full text of its source document.
pub trait SourceLookup {
    /// `Ok(None)` when the document does not exist.
    fn fetch(&self, page_id: &str) -> Result<Option<String>>;
}

/// Documents stored as `<dir>/<page_id>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn for_kind(dir: impl Into<PathBuf>, kind: OffsetKind) -> Self {
        Self::new(dir, kind.extension())
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    pub fn path_for(&self, page_id: &str) -> PathBuf {
        self.dir.join(format!("{page_id}.{}", self.extension))
    }
}

impl SourceLookup for DirectorySource {
    fn fetch(&self, page_id: &str) -> Result<Option<String>> {
        let path = self.path_for(page_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ScoreError::from_io(path, err)),
        }
    }
}

impl SourceLookup for HashMap<String, String> {
    fn fetch(&self, page_id: &str) -> Result<Option<String>> {
        Ok(self.get(page_id).cloned())
    }
}

/// Checks that every submitted offset of `kind` reproduces its stored text.
///
/// Mismatches and missing documents come back as rows, never as errors.
pub fn validate(
    lookup: &dyn SourceLookup,
    submitted: &AnnotationIndex,
    kind: OffsetKind,
) -> Result<Vec<ErrorRow>> {
    let mut rows = Vec::new();

    for (page_id, attributes) in &submitted.pages {
        let Some(document) = lookup.fetch(page_id)? else {
            debug!(page_id = %page_id, kind = %kind, "source document not found");
            rows.push(ErrorRow::NotFound {
                page_id: page_id.clone(),
            });
            continue;
        };
        let document = normalize_newlines(&document);
        let lines = document.split('\n').collect::<Vec<_>>();

        for (attribute, records) in attributes {
            for record in records {
                let span = record.offset(kind).ok_or_else(|| {
                    ScoreError::missing_field(
                        format!("page_id={page_id} attribute={attribute}"),
                        kind.field_name(),
                    )
                })?;

                let extracted = extract_span(&lines, span);
                if extracted != span.text {
                    rows.push(ErrorRow::DifferentOffset {
                        page_id: page_id.clone(),
                        title: record.title.clone().unwrap_or_default(),
                        start: span.start,
                        end: span.end,
                        text: span.text.clone(),
                        extracted_string: extracted,
                    });
                }
            }
        }
    }

    Ok(rows)
}

/// Rebuilds the text covered by `span`, joining lines with `\n`. Columns
/// count characters and clamp to the line; lines past the end of the
/// document are dropped.
pub fn extract_span(lines: &[&str], span: &OffsetSpan) -> String {
    let (start, end) = (span.start, span.end);
    let mut extracted = String::new();
    if start.line_id > end.line_id {
        return extracted;
    }

    for line_id in start.line_id..=end.line_id {
        let Some(line) = lines.get(line_id) else {
            break;
        };
        if line_id != start.line_id {
            extracted.push('\n');
        }

        let from = if line_id == start.line_id {
            char_to_byte(line, start.offset)
        } else {
            0
        };
        let to = if line_id == end.line_id {
            char_to_byte(line, end.offset)
        } else {
            line.len()
        };
        if from < to {
            extracted.push_str(&line[from..to]);
        }
    }

    extracted
}

/// Folds `\r\n` and lone `\r` into `\n` so line ids match text-mode reads.
fn normalize_newlines(document: &str) -> String {
    document.replace("\r\n", "\n").replace('\r', "\n")
}

fn char_to_byte(line: &str, index: usize) -> usize {
    line.char_indices()
        .nth(index)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}
