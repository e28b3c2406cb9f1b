use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::error::{Result, ScoreError};
use super::index::AnnotationIndex;
use super::loader::{RecordSource, load_records, load_target};
use super::scorer::score;
use super::validator::{SourceLookup, validate};
use crate::model::{AnnotationRecord, ErrorReport, OffsetKind, ScoreReport};

/// Which gold pages to score.
#[derive(Debug, Clone)]
pub enum Target {
    Pages(Vec<String>),
    /// A JSON array literal or the path of a CSV file.
    Argument(String),
}

pub struct ScoreRequest {
    pub gold: RecordSource,
    pub submitted: RecordSource,
    pub target: Option<Target>,
    pub sources: BTreeMap<OffsetKind, Box<dyn SourceLookup>>,
}

impl ScoreRequest {
    pub fn new(gold: impl Into<RecordSource>, submitted: impl Into<RecordSource>) -> Self {
        Self {
            gold: gold.into(),
            submitted: submitted.into(),
            target: None,
            sources: BTreeMap::new(),
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Enables offset validation of `kind` against documents from `lookup`.
    pub fn with_source(mut self, kind: OffsetKind, lookup: impl SourceLookup + 'static) -> Self {
        self.sources.insert(kind, Box::new(lookup));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreOutcome {
    pub scores: ScoreReport,
    /// Present whenever at least one source lookup was supplied.
    pub errors: Option<ErrorReport>,
    pub ene: String,
    pub target_count: usize,
}

pub fn get_score(request: ScoreRequest) -> Result<ScoreOutcome> {
    let ScoreRequest {
        gold,
        submitted,
        target,
        sources,
    } = request;

    let gold = load_records(gold)?;
    let submitted = load_records(submitted)?;
    let target = match target {
        None => Vec::new(),
        Some(Target::Pages(pages)) => pages,
        Some(Target::Argument(argument)) => load_target(&argument)?,
    };

    let ene = resolve_ene(&gold)?;
    let gold_index = AnnotationIndex::build(gold, &ene);
    let submitted_index = AnnotationIndex::build(submitted, &ene);
    let target_count = if target.is_empty() {
        gold_index.pages.len()
    } else {
        target.len()
    };

    let kinds = scoring_kinds(&gold_index, &submitted_index)?;
    debug!(
        ene = %ene,
        target_count,
        kinds = ?kinds,
        "resolved scoring passes"
    );

    let mut scores = ScoreReport::default();
    let mut errors = ErrorReport::default();
    for kind in kinds {
        let attribute_scores = score(
            &gold_index,
            &submitted_index,
            &target,
            &gold_index.attributes,
            kind,
        )?;
        scores.0.insert(kind, attribute_scores);

        if let Some(lookup) = sources.get(&kind) {
            let rows = validate(lookup.as_ref(), &submitted_index, kind)?;
            errors.0.insert(kind, rows);
        }
    }

    Ok(ScoreOutcome {
        scores,
        errors: (!sources.is_empty()).then_some(errors),
        ene,
        target_count,
    })
}

/// The single ENE shared by every gold record that carries one.
pub fn resolve_ene(gold: &[AnnotationRecord]) -> Result<String> {
    let enes = gold
        .iter()
        .filter_map(|record| record.ene.as_deref())
        .collect::<BTreeSet<_>>();

    let mut iter = enes.iter();
    match (iter.next(), iter.next()) {
        (Some(ene), None) => Ok((*ene).to_string()),
        (None, _) => Err(ScoreError::Schema(
            "gold data must contain one ENE, found none".to_string(),
        )),
        (Some(_), Some(_)) => Err(ScoreError::Schema(format!(
            "gold data must contain one ENE, found {}: {}",
            enes.len(),
            enes.iter().copied().collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Offset kinds present in gold, narrowed to those the submission carries.
/// A submission without any offsets is scored on every gold kind.
fn scoring_kinds(gold: &AnnotationIndex, submitted: &AnnotationIndex) -> Result<Vec<OffsetKind>> {
    let gold_kinds = gold.kinds();
    if gold_kinds.is_empty() {
        return Err(ScoreError::Schema(
            "gold records carry neither html_offset nor text_offset".to_string(),
        ));
    }

    let submitted_kinds = submitted.kinds();
    if submitted_kinds.is_empty() {
        return Ok(gold_kinds);
    }

    let kinds = gold_kinds
        .into_iter()
        .filter(|kind| submitted_kinds.contains(kind))
        .collect::<Vec<_>>();
    if kinds.is_empty() {
        return Err(ScoreError::Schema(format!(
            "submission offsets ({}) do not match any offset kind in gold",
            submitted_kinds
                .iter()
                .map(|kind| kind.field_name())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(kinds)
}
