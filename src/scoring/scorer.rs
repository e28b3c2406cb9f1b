use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::canonical::canonicalize;
use super::error::Result;
use super::index::AnnotationIndex;
use crate::model::{AttributeScores, CanonicalSpan, CountBucket, OffsetKind, ScoreEntry};

/// Exact-match scores of `submitted` against `gold` for one offset kind.
///
/// Only gold pages listed in `target` are visited (every gold page when
/// `target` is empty), and only the gold-derived `attributes` are counted.
/// Spans are compared as sets, so duplicates within one page/attribute bucket
/// collapse before counting.
pub fn score(
    gold: &AnnotationIndex,
    submitted: &AnnotationIndex,
    target: &[String],
    attributes: &[String],
    kind: OffsetKind,
) -> Result<AttributeScores> {
    let gold_spans = canonicalize(&gold.pages, kind)?;
    let submitted_spans = canonicalize(&submitted.pages, kind)?;
    let target: HashSet<&str> = target.iter().map(String::as_str).collect();

    let mut counts: BTreeMap<String, CountBucket> = BTreeMap::new();
    let mut pages_scored = 0_usize;
    for (page_id, gold_attributes) in &gold_spans {
        if !target.is_empty() && !target.contains(page_id.as_str()) {
            continue;
        }
        pages_scored += 1;

        let submitted_attributes = submitted_spans.get(page_id);
        for attribute in attributes {
            let expected = span_set(gold_attributes.get(attribute));
            let predicted = span_set(
                submitted_attributes.and_then(|submitted| submitted.get(attribute)),
            );
            if expected.is_empty() && predicted.is_empty() {
                continue;
            }

            let bucket = counts.entry(attribute.clone()).or_default();
            bucket.tp += expected.intersection(&predicted).count();
            bucket.tpfp += predicted.len();
            bucket.tpfn += expected.len();
        }
    }

    let attribute_scores = counts
        .iter()
        .map(|(attribute, bucket)| (attribute.clone(), calc_score(bucket)))
        .collect::<BTreeMap<_, _>>();
    let macro_ave = macro_average(attribute_scores.values());
    let micro_ave = micro_average(counts.values());

    debug!(
        kind = %kind,
        pages = pages_scored,
        attributes = counts.len(),
        micro_f1 = micro_ave.f1,
        "scoring pass complete"
    );

    Ok(AttributeScores {
        attributes: attribute_scores,
        macro_ave,
        micro_ave,
        counts,
    })
}

fn span_set(spans: Option<&Vec<CanonicalSpan>>) -> HashSet<CanonicalSpan> {
    spans
        .map(|spans| spans.iter().copied().collect())
        .unwrap_or_default()
}

/// Precision, recall and F1 of one bucket; all zero when nothing matched.
pub fn calc_score(bucket: &CountBucket) -> ScoreEntry {
    if bucket.tp == 0 {
        return ScoreEntry::default();
    }

    let tp = bucket.tp as f64;
    let recall = tp / bucket.tpfn as f64;
    let precision = tp / bucket.tpfp as f64;
    ScoreEntry {
        precision,
        recall,
        f1: 2.0 * recall * precision / (recall + precision),
    }
}

/// Unweighted mean of per-attribute scores.
pub fn macro_average<'a, I>(scores: I) -> ScoreEntry
where
    I: IntoIterator<Item = &'a ScoreEntry>,
{
    let mut total = ScoreEntry::default();
    let mut count = 0_usize;
    for entry in scores {
        total.precision += entry.precision;
        total.recall += entry.recall;
        total.f1 += entry.f1;
        count += 1;
    }

    if count == 0 {
        return ScoreEntry::default();
    }

    let count = count as f64;
    ScoreEntry {
        precision: total.precision / count,
        recall: total.recall / count,
        f1: total.f1 / count,
    }
}

/// Score of the counts pooled across all attributes.
pub fn micro_average<'a, I>(buckets: I) -> ScoreEntry
where
    I: IntoIterator<Item = &'a CountBucket>,
{
    let pooled = buckets
        .into_iter()
        .fold(CountBucket::default(), |pooled, bucket| CountBucket {
            tp: pooled.tp + bucket.tp,
            tpfp: pooled.tpfp + bucket.tpfp,
            tpfn: pooled.tpfn + bucket.tpfn,
        });
    calc_score(&pooled)
}
