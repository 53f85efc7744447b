use std::time::Instant;

use super::resolver::resolve;
use super::types::{LabelRecord, LabelSource};
use crate::pipeline::{PipelineError, MAX_BATCH_SIZE};

/// Resolve a batch of drug names, preserving input order.
///
/// Lookups run concurrently, one scoped thread per name. Any lookup failure
/// fails the whole batch. Names that resolve to the same drug are all kept.
pub fn normalize_batch(
    source: &dyn LabelSource,
    names: &[String],
) -> Result<Vec<LabelRecord>, PipelineError> {
    if names.is_empty() {
        return Err(PipelineError::InvalidInput(
            "at least one drug name is required".into(),
        ));
    }
    if names.len() > MAX_BATCH_SIZE {
        return Err(PipelineError::BatchSizeExceeded {
            requested: names.len(),
            limit: MAX_BATCH_SIZE,
        });
    }
    if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
        return Err(PipelineError::InvalidInput(format!(
            "drug name at position {} is empty",
            pos + 1
        )));
    }

    let _span = tracing::info_span!("normalize_batch", batch_size = names.len()).entered();
    let started = Instant::now();

    let outcomes: Vec<Result<LabelRecord, PipelineError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| scope.spawn(move || resolve(source, name)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let records = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

    let unknown = records.iter().filter(|r| r.is_unknown()).count();
    tracing::info!(
        resolved = records.len() - unknown,
        unknown,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Batch normalized"
    );

    Ok(records)
}
