use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::error::{Result, ScoreError};
use crate::model::{ErrorReport, ErrorRow, ScoreReport};

const SCORE_HEADER: [&str; 4] = ["attribute", "precision", "recall", "F1"];

/// Writes `<kind>_score.csv` per offset kind and returns the written paths.
pub fn write_score_csv(dir: &Path, report: &ScoreReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (kind, scores) in &report.0 {
        let path = dir.join(format!("{kind}_score.csv"));
        let mut rows: Vec<Vec<String>> =
            vec![SCORE_HEADER.iter().map(ToString::to_string).collect()];
        rows.extend(scores.rows().map(|(attribute, entry)| {
            vec![
                attribute.to_string(),
                format_metric(entry.precision),
                format_metric(entry.recall),
                format_metric(entry.f1),
            ]
        }));
        write_rows(&path, &rows)?;
        written.push(path);
    }
    Ok(written)
}

/// Writes `<kind>_error_log.csv` per offset kind and returns the written paths.
pub fn write_error_csv(dir: &Path, report: &ErrorReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (kind, errors) in &report.0 {
        let path = dir.join(format!("{kind}_error_log.csv"));
        let mut rows: Vec<Vec<String>> =
            vec![ErrorRow::CSV_HEADER.iter().map(ToString::to_string).collect()];
        rows.extend(errors.iter().map(ErrorRow::csv_record));
        write_rows(&path, &rows)?;
        written.push(path);
    }
    Ok(written)
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| ScoreError::from_io(parent, err))?;
    }
    let file = File::create(path).map_err(|err| ScoreError::from_io(path, err))?;
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    for row in rows {
        writer
            .write_record(row)
            .map_err(|err| ScoreError::from_io(path, io::Error::other(err)))?;
    }
    writer
        .flush()
        .map_err(|err| ScoreError::from_io(path, err))?;
    Ok(())
}

fn format_metric(value: f64) -> String {
    format!("{value:?}")
}

/// One markdown table per offset kind, three decimals per metric.
pub fn render_markdown<W: Write>(output: &mut W, report: &ScoreReport) -> io::Result<()> {
    for (kind, scores) in &report.0 {
        writeln!(output, "({kind})")?;
        writeln!(output, "|attribute|precision|recall|F1|")?;
        writeln!(output, "|-|-|-|-|")?;
        for (attribute, entry) in scores.rows() {
            writeln!(
                output,
                "|{attribute}|{:.3}|{:.3}|{:.3}|",
                entry.precision, entry.recall, entry.f1
            )?;
        }
    }
    Ok(())
}
