use std::collections::BTreeMap;

use super::error::{Result, ScoreError};
use super::index::PageIndex;
use crate::model::{AnnotationRecord, CanonicalSpan, OffsetKind};

/// Anything that can be reduced to a comparable span for one offset kind.
pub trait SpanSource {
    fn canonical_span(&self, kind: OffsetKind) -> Option<CanonicalSpan>;
}

impl SpanSource for AnnotationRecord {
    fn canonical_span(&self, kind: OffsetKind) -> Option<CanonicalSpan> {
        self.offset(kind).map(CanonicalSpan::from)
    }
}

impl SpanSource for CanonicalSpan {
    fn canonical_span(&self, _kind: OffsetKind) -> Option<CanonicalSpan> {
        Some(*self)
    }
}

/// Replaces every item of `index` with its span for `kind`, keeping the
/// page/attribute layout and arrival order.
pub fn canonicalize<T: SpanSource>(
    index: &PageIndex<T>,
    kind: OffsetKind,
) -> Result<PageIndex<CanonicalSpan>> {
    let mut cleaned = PageIndex::new();

    for (page_id, attributes) in index {
        let mut cleaned_attributes = BTreeMap::new();
        for (attribute, items) in attributes {
            let spans = items
                .iter()
                .map(|item| {
                    item.canonical_span(kind).ok_or_else(|| {
                        ScoreError::missing_field(
                            format!("page_id={page_id} attribute={attribute}"),
                            kind.field_name(),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            cleaned_attributes.insert(attribute.clone(), spans);
        }
        cleaned.insert(page_id.clone(), cleaned_attributes);
    }

    Ok(cleaned)
}
