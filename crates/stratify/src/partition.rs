//! Enumeration of class partitions and their sizes.

use crate::errors::Result;
use crate::store::DatasetStore;
use crate::types::ClassPartition;

/// Enumerates the partitions of `class_attribute` with derived split
/// sizes, in canonical order.
///
/// The canonical order is ascending on the value's textual form, imposed
/// here with an explicit sort. Store enumeration order is never trusted;
/// the whole determinism guarantee hangs on this.
pub async fn class_partitions<S: DatasetStore>(
    store: &mut S,
    table: &str,
    class_attribute: &str,
    training_rate: f64,
    fusion_rate: f64,
) -> Result<Vec<ClassPartition>> {
    let mut values = store.distinct_values(table, class_attribute).await?;
    values.sort();

    let mut partitions = Vec::with_capacity(values.len());
    for value in values {
        let size = store.count_where(table, class_attribute, &value).await?;
        partitions.push(ClassPartition::new(value, size, training_rate, fusion_rate));
    }
    Ok(partitions)
}
