
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::store::SearchHit;

/// The aggregated result of a similarity query: the retained chunk texts in
/// rank order, and the unique source ids that contributed to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextSet {
    /// Chunk texts, highest similarity first.
    pub context: Vec<String>,
    /// Source ids in first-seen order, one entry per source no matter how
    /// many of its chunks were retained.
    pub sources: Vec<String>,
}

impl ContextSet {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

/// Collapse raw search hits into the context handed to the prompt.
///
/// Hits whose text is blank after trimming are skipped entirely: they add
/// nothing to the prompt, and they must not claim a source slot either.
#[inline]
pub fn aggregate(hits: &[SearchHit]) -> ContextSet {
    let mut context = Vec::with_capacity(hits.len());
    let mut sources = Vec::new();
    let mut seen_sources = HashSet::new();

    for hit in hits {
        if hit.text.trim().is_empty() {
            continue;
        }

        context.push(hit.text.clone());
        if seen_sources.insert(hit.source_id.clone()) {
            sources.push(hit.source_id.clone());
        }
    }

    ContextSet { context, sources }
}
