//! Drives one split request end to end: attribute selection, partition
//! enumeration, per-partition windowing, and CSV output.

use crate::errors::{Result, SplitError};
use crate::partition;
use crate::select;
use crate::sizing;
use crate::store::{DatasetStore, RowWindow};
use crate::types::{SplitKind, SplitRequest};

/// Computes the requested split and appends it to `sink` as CSV.
///
/// Partitions are processed strictly in canonical class order; the
/// header, when requested, is written exactly once before the first
/// partition's rows. A store failure aborts the remaining partitions;
/// if any bytes had already been appended the error is wrapped as
/// `SplitError::PartialWrite` and the earlier bytes are left in place.
pub async fn execute_split<S: DatasetStore>(
    store: &mut S,
    request: &SplitRequest,
    sink: &mut Vec<u8>,
) -> Result<()> {
    validate(request)?;

    let schema = store.column_names(&request.dataset).await?;
    if !schema.iter().any(|c| c == &request.class_attribute) {
        return Err(SplitError::Schema(format!(
            "unknown class attribute '{}' in dataset '{}'",
            request.class_attribute, request.dataset
        )));
    }
    let candidates: Vec<String> = schema
        .into_iter()
        .filter(|c| c != &request.class_attribute)
        .collect();

    // The class attribute always comes last.
    let columns: Vec<String> = if request.class_only {
        vec![request.class_attribute.clone()]
    } else {
        let mut cols = select::select_attributes(
            &candidates,
            &request.include_attributes,
            &request.exclude_attributes,
            request.attributes_rate,
            request.random_seed,
        );
        cols.push(request.class_attribute.clone());
        cols
    };

    let partitions = partition::class_partitions(
        store,
        &request.dataset,
        &request.class_attribute,
        request.training_rate,
        request.fusion_rate,
    )
    .await?;

    let start = sink.len();
    if request.include_header {
        write_header(sink, &columns)?;
    }

    for p in &partitions {
        let window = sizing::split_window(request.kind, p, request.sample_rate, request.sample_number);
        let row_window = RowWindow {
            table: &request.dataset,
            columns: &columns,
            where_column: &request.class_attribute,
            where_value: &p.class_value,
            seed: request.random_seed,
            limit: window.limit,
            offset: window.offset,
        };
        if let Err(err) = store.copy_rows(&row_window, sink).await {
            let bytes_written = (sink.len() - start) as u64;
            return Err(if bytes_written > 0 {
                SplitError::PartialWrite {
                    bytes_written,
                    source: Box::new(err),
                }
            } else {
                err
            });
        }
    }
    Ok(())
}

fn validate(request: &SplitRequest) -> Result<()> {
    check_rate("training_rate", request.training_rate)?;
    check_rate("fusion_rate", request.fusion_rate)?;
    check_rate("attributes_rate", request.attributes_rate)?;
    if request.training_rate + request.fusion_rate > 1.0 {
        return Err(SplitError::Validation(format!(
            "training_rate + fusion_rate must not exceed 1 (got {})",
            request.training_rate + request.fusion_rate
        )));
    }
    if request.kind == SplitKind::TrainingSample {
        check_rate("sample_rate", request.sample_rate)?;
    }
    Ok(())
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(SplitError::Validation(format!(
            "{name} must be within [0, 1] (got {rate})"
        )));
    }
    Ok(())
}

fn write_header(sink: &mut Vec<u8>, columns: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(&mut *sink);
    writer
        .write_record(columns)
        .map_err(|e| SplitError::Store(format!("header write failed: {e}")))?;
    writer
        .flush()
        .map_err(|e| SplitError::Store(format!("header write failed: {e}")))?;
    Ok(())
}
