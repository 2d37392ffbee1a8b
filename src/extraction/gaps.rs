//! Quarter-gap extraction
//!
//! Every quarter bracketed by two sufficiently complete neighbours becomes
//! one supervised sample: (before, after) -> target.

use crate::data::{CompanyHistory, CompanyKey, QuarterlyRecord, QuarterlyTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A neighbour with this many missing fields or more is not usable
pub const DEFAULT_COMPLETENESS_THRESHOLD: usize = 10;

/// One training sample before feature transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapTriple {
    pub company: CompanyKey,
    pub before: QuarterlyRecord,
    pub after: QuarterlyRecord,
    /// Quarter to reconstruct; may have any number of missing fields
    pub target: QuarterlyRecord,
}

/// Scans company histories for reconstructable quarters
#[derive(Debug, Clone, Copy)]
pub struct GapExtractor {
    completeness_threshold: usize,
}

impl Default for GapExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETENESS_THRESHOLD)
    }
}

impl GapExtractor {
    pub fn new(completeness_threshold: usize) -> Self {
        Self {
            completeness_threshold,
        }
    }

    pub fn completeness_threshold(&self) -> usize {
        self.completeness_threshold
    }

    /// Completeness predicate for neighbouring quarters
    pub fn is_complete(&self, record: &QuarterlyRecord) -> bool {
        record.missing_count() < self.completeness_threshold
    }

    /// Emits every valid gap of one company.
    ///
    /// Candidate positions run from the second to the second-to-last
    /// distinct quarter. When a quarter label is shared by several rows the
    /// before/after pair is kept only if its row count equals the target's;
    /// rows are then paired positionally.
    pub fn extract(&self, history: &CompanyHistory) -> Vec<GapTriple> {
        let quarters = history.quarters();
        if quarters.len() < 3 {
            return Vec::new();
        }

        let mut triples = Vec::new();
        for i in 1..quarters.len() - 1 {
            let before_rows = history.rows_for(quarters[i - 1]);
            let target_rows = history.rows_for(quarters[i]);
            let after_rows = history.rows_for(quarters[i + 1]);

            if before_rows.len() != after_rows.len() || before_rows.len() != target_rows.len() {
                debug!(
                    company = %history.key,
                    quarter = quarters[i],
                    input_rows = before_rows.len().max(after_rows.len()),
                    target_rows = target_rows.len(),
                    "Discarding gap with misaligned rows"
                );
                continue;
            }

            for ((before, after), target) in before_rows
                .into_iter()
                .zip(after_rows)
                .zip(target_rows)
            {
                if self.is_complete(before) && self.is_complete(after) {
                    triples.push(GapTriple {
                        company: history.key.clone(),
                        before: before.clone(),
                        after: after.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        triples
    }

    /// Runs [`GapExtractor::extract`] over many tables, skipping empty ones
    pub fn extract_tables<I>(&self, tables: I) -> Vec<GapTriple>
    where
        I: IntoIterator<Item = QuarterlyTable>,
    {
        let mut triples = Vec::new();
        for table in tables {
            if table.is_empty() {
                warn!(company = %table.key, "Skipping empty table");
                continue;
            }
            let history = CompanyHistory::from(table);
            let found = self.extract(&history);
            debug!(company = %history.key, gaps = found.len(), "Extracted gaps");
            triples.extend(found);
        }
        triples
    }
}
