use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::ScoreArgs;
use crate::model::{ErrorReport, OffsetKind, ScoreReport};
use crate::scoring::{
    DirectorySource, ScoreOutcome, ScoreRequest, Target, get_score, render_markdown,
    write_error_csv, write_score_csv,
};

#[derive(Debug, Serialize)]
struct ScoreResponse<'a> {
    ene: &'a str,
    target_count: usize,
    headline_kind: Option<OffsetKind>,
    headline_f1: Option<f64>,
    scores: &'a ScoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ErrorReport>,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    info!(
        gold = %args.gold.display(),
        submission = %args.submission.display(),
        target_pages = args.target.as_deref().unwrap_or("all gold pages"),
        "scoring submission"
    );

    let outcome = get_score(build_request(&args))
        .with_context(|| format!("failed to score {}", args.submission.display()))?;
    log_outcome(&outcome);

    if let Some(score_dir) = &args.score_dir {
        for path in write_score_csv(score_dir, &outcome.scores)
            .with_context(|| format!("failed to export scores to {}", score_dir.display()))?
        {
            info!(path = %path.display(), "wrote score csv");
        }
    }

    if let Some(error_dir) = &args.error_dir {
        match &outcome.errors {
            Some(errors) => {
                for path in write_error_csv(error_dir, errors).with_context(|| {
                    format!("failed to export offset errors to {}", error_dir.display())
                })? {
                    info!(path = %path.display(), "wrote error log csv");
                }
            }
            None => warn!("--error-dir ignored: pass --html-dir or --text-dir to check offsets"),
        }
    }

    if args.json {
        write_json_response(&outcome)
    } else {
        write_text_response(&outcome)
    }
}

fn build_request(args: &ScoreArgs) -> ScoreRequest {
    let mut request = ScoreRequest::new(args.gold.as_path(), args.submission.as_path());
    if let Some(target) = &args.target {
        request = request.with_target(Target::Argument(target.clone()));
    }
    if let Some(html_dir) = &args.html_dir {
        request = request.with_source(
            OffsetKind::Html,
            DirectorySource::for_kind(html_dir, OffsetKind::Html),
        );
    }
    if let Some(text_dir) = &args.text_dir {
        request = request.with_source(
            OffsetKind::Text,
            DirectorySource::for_kind(text_dir, OffsetKind::Text),
        );
    }
    request
}

fn log_outcome(outcome: &ScoreOutcome) {
    let kinds = outcome
        .scores
        .kinds()
        .map(OffsetKind::as_str)
        .collect::<Vec<_>>()
        .join(" & ");
    info!(
        ene = %outcome.ene,
        target_count = outcome.target_count,
        kinds = %kinds,
        "scoring complete"
    );

    for (kind, scores) in &outcome.scores.0 {
        info!(
            kind = %kind,
            attributes = scores.attributes.len(),
            macro_f1 = scores.macro_ave.f1,
            micro_f1 = scores.micro_ave.f1,
            "offset pass scored"
        );
    }

    if let Some(errors) = &outcome.errors {
        for (kind, rows) in &errors.0 {
            if rows.is_empty() {
                info!(kind = %kind, "offsets match source documents");
            } else {
                warn!(kind = %kind, errors = rows.len(), "offset annotation errors found");
            }
            for row in rows {
                debug!(
                    kind = %kind,
                    page_id = row.page_id(),
                    error_type = row.error_type(),
                    "offset annotation error"
                );
            }
        }
    }
}

fn write_json_response(outcome: &ScoreOutcome) -> Result<()> {
    let headline = outcome.scores.headline();
    let response = ScoreResponse {
        ene: &outcome.ene,
        target_count: outcome.target_count,
        headline_kind: headline.map(|(kind, _)| kind),
        headline_f1: headline.map(|(_, f1)| f1),
        scores: &outcome.scores,
        errors: outcome.errors.as_ref(),
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &response)
        .context("failed to serialize score json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(outcome: &ScoreOutcome) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "System result score")?;
    render_markdown(&mut output, &outcome.scores)?;
    if let Some((kind, f1)) = outcome.scores.headline() {
        writeln!(output, "Headline: {kind} micro_ave F1 = {f1:.3}")?;
    }
    if let Some(errors) = &outcome.errors {
        for (kind, rows) in &errors.0 {
            writeln!(output, "{kind} annotation errors: {}", rows.len())?;
        }
    }
    output.flush()?;
    Ok(())
}
