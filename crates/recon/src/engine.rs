use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::merge::merge_record_sets;
use crate::model::{PipelineOutput, RecordSet, RunMeta};
use crate::pipeline::{enrich, filter_required, LabelLookup};
use crate::reconcile::Reconciler;
use crate::summary::compute_summary;

/// Run the full pipeline: merge `remote` with `local`, drop records without
/// the required field, then resolve label colors through `lookup`.
///
/// Passing `None` for `lookup` skips enrichment entirely.
/// Merge and filter errors abort the run; lookup failures never do.
pub fn run(
    config: &ReconConfig,
    remote: &RecordSet,
    local: &RecordSet,
    lookup: Option<&dyn LabelLookup>,
) -> Result<PipelineOutput, ReconError> {
    let reconciler = Reconciler::from_config(&config.merge);
    let merged = merge_record_sets(remote, local, &config.merge.key_field, &reconciler)?;

    let (filtered, dropped) = filter_required(merged.records, &config.pipeline.required_field)?;

    let (records, enrichment) = match lookup {
        Some(lookup) => {
            let (records, stats) = enrich(
                filtered,
                &config.pipeline.label_field,
                &config.pipeline.color_field,
                lookup,
            );
            (records, Some(stats))
        }
        None => (filtered, None),
    };

    let summary = compute_summary(&merged.stats, dropped, enrichment, records.len());

    Ok(PipelineOutput {
        meta: RunMeta {
            key_field: config.merge.key_field.clone(),
            required_field: config.pipeline.required_field.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
    })
}
