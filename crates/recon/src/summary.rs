use crate::model::{EnrichStats, MergeStats, RunSummary};

/// Fold stage counters into the run summary.
pub fn compute_summary(
    merge: &MergeStats,
    dropped_missing_required: usize,
    enrichment: Option<EnrichStats>,
    output_rows: usize,
) -> RunSummary {
    RunSummary {
        merged_rows: merge.matched + merge.left_only + merge.right_only + merge.unkeyed,
        matched: merge.matched,
        left_only: merge.left_only,
        right_only: merge.right_only,
        unkeyed: merge.unkeyed,
        dropped_missing_required,
        output_rows,
        resolutions: merge.resolutions.clone(),
        enrichment,
    }
}

impl RunSummary {
    /// Shared-field values kept as `a<sep>b` for human review.
    pub fn unresolved_conflicts(&self) -> usize {
        self.resolutions.get("conflict").copied().unwrap_or(0)
    }
}
