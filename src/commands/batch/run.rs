use super::*;

const BATCH_REPORT_VERSION: u32 = 1;

pub fn run(args: BatchArgs) -> Result<()> {
    let settings = load_settings(&args.settings)?;
    info!(
        settings = %args.settings.display(),
        submission_dir = %args.submission_dir.display(),
        categories = settings.categories.len(),
        "batch scoring requested"
    );

    let report = score_batch(
        &settings,
        &args.settings,
        &args.submission_dir,
        args.score_dir.as_deref(),
    )?;

    let report_path = args
        .report_path
        .unwrap_or_else(|| args.submission_dir.join("batch_report.json"));
    write_json_pretty(&report_path, &report)?;
    info!(path = %report_path.display(), "wrote batch report");
    info!(
        categories = report.category_count,
        overall = report.overall,
        "batch scoring completed"
    );

    Ok(())
}

pub(super) fn score_batch(
    settings: &BatchSettings,
    settings_path: &Path,
    submission_dir: &Path,
    score_dir: Option<&Path>,
) -> Result<BatchReport> {
    let base_dir = settings_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let missing = settings
        .categories
        .iter()
        .map(|category| submission_dir.join(&category.submission_file))
        .filter(|path| !path.is_file())
        .collect::<Vec<PathBuf>>();
    if let Some(first_missing) = missing.first() {
        let names = missing
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(anyhow::Error::new(ScoreError::NotFound {
            path: first_missing.clone(),
        })
        .context(format!(
            "submission is missing {} of {} categories: {names}",
            missing.len(),
            settings.categories.len()
        )));
    }

    let mut categories = Vec::with_capacity(settings.categories.len());
    for category in &settings.categories {
        categories.push(score_category(category, &base_dir, submission_dir, score_dir)?);
    }

    let overall = if categories.is_empty() {
        0.0
    } else {
        categories
            .iter()
            .map(|category| category.headline_f1)
            .sum::<f64>()
            / categories.len() as f64
    };

    Ok(BatchReport {
        manifest_version: BATCH_REPORT_VERSION,
        generated_at: now_utc_string(),
        settings_path: settings_path.display().to_string(),
        submission_dir: submission_dir.display().to_string(),
        category_count: categories.len(),
        overall,
        categories,
    })
}

fn score_category(
    category: &CategorySettings,
    base_dir: &Path,
    submission_dir: &Path,
    score_dir: Option<&Path>,
) -> Result<CategoryResult> {
    let submission_path = submission_dir.join(&category.submission_file);
    let gold_path = resolve_relative(base_dir, &category.gold_path);

    let mut request = ScoreRequest::new(gold_path.as_path(), submission_path.as_path());
    if let Some(target) = category.resolve_target(base_dir)? {
        request = request.with_target(target);
    }
    for (kind, source) in category.sources(base_dir) {
        request = request.with_source(kind, source);
    }

    let outcome = get_score(request)
        .with_context(|| format!("failed to score category {}", category.submission_file))?;

    let (headline_kind, headline_f1) = match outcome.scores.headline() {
        Some((kind, f1)) => (Some(kind), f1),
        None => (None, 0.0),
    };

    let offset_error_counts = outcome
        .errors
        .as_ref()
        .map(|errors| {
            errors
                .0
                .iter()
                .map(|(kind, rows)| (*kind, rows.len()))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();
    for (kind, count) in &offset_error_counts {
        if *count > 0 {
            warn!(
                category = category.name(),
                kind = %kind,
                errors = count,
                "offset annotation errors found"
            );
        }
    }

    if let Some(score_dir) = score_dir {
        let category_dir = score_dir.join(category.name());
        for path in write_score_csv(&category_dir, &outcome.scores)
            .with_context(|| format!("failed to export scores to {}", category_dir.display()))?
        {
            info!(path = %path.display(), "wrote score csv");
        }
    }

    info!(
        category = category.name(),
        kind = headline_kind.map(OffsetKind::as_str).unwrap_or("none"),
        micro_f1 = headline_f1,
        "category scored"
    );

    Ok(CategoryResult {
        category: category.name().to_string(),
        submission_file: category.submission_file.clone(),
        submission_sha256: sha256_file(&submission_path)?,
        ene: outcome.ene,
        target_count: outcome.target_count,
        headline_kind,
        headline_f1,
        offset_error_counts,
        scores: outcome.scores,
    })
}
