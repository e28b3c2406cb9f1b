use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::normalize::normalize_attribute;
use crate::model::{AnnotationRecord, OffsetKind};

/// page_id -> normalized attribute -> items in arrival order.
pub type PageIndex<T> = BTreeMap<String, BTreeMap<String, Vec<T>>>;

#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    pub pages: PageIndex<AnnotationRecord>,
    pub has_html: bool,
    pub has_text: bool,
    /// Distinct normalized attribute names, sorted ascending.
    pub attributes: Vec<String>,
}

impl AnnotationIndex {
    pub fn build<I>(records: I, ene: &str) -> Self
    where
        I: IntoIterator<Item = AnnotationRecord>,
    {
        let mut pages = PageIndex::new();
        let mut attributes = BTreeSet::new();
        let mut has_html = false;
        let mut has_text = false;
        let mut record_count = 0_usize;

        for record in records {
            let attribute = normalize_attribute(ene, &record.attribute);
            attributes.insert(attribute.clone());

            has_html |= record.html_offset.is_some();
            has_text |= record.text_offset.is_some();

            pages
                .entry(record.page_id.clone())
                .or_insert_with(BTreeMap::new)
                .entry(attribute)
                .or_insert_with(Vec::new)
                .push(record);
            record_count += 1;
        }

        debug!(
            ene,
            records = record_count,
            pages = pages.len(),
            attributes = attributes.len(),
            has_html,
            has_text,
            "indexed annotations"
        );

        Self {
            pages,
            has_html,
            has_text,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn has_kind(&self, kind: OffsetKind) -> bool {
        match kind {
            OffsetKind::Html => self.has_html,
            OffsetKind::Text => self.has_text,
        }
    }

    /// Offset kinds carried by at least one record, html first.
    pub fn kinds(&self) -> Vec<OffsetKind> {
        OffsetKind::ALL
            .into_iter()
            .filter(|kind| self.has_kind(*kind))
            .collect()
    }

    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn records(&self, page_id: &str, attribute: &str) -> &[AnnotationRecord] {
        self.pages
            .get(page_id)
            .and_then(|attributes| attributes.get(attribute))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
