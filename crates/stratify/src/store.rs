//! The capability contract the split executor needs from a relational
//! store. Implementations own one store session for the duration of a
//! request and must not share it concurrently.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::Attribute;

/// One windowed row request against a partition's seeded ordering.
///
/// The store must order the matching rows pseudo-randomly in a way that
/// is fully reproducible from `seed`, so that the same offset/limit
/// window always selects the same rows.
#[derive(Clone, Copy, Debug)]
pub struct RowWindow<'a> {
    pub table: &'a str,
    pub columns: &'a [String],
    pub where_column: &'a str,
    pub where_value: &'a str,
    pub seed: i64,
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait DatasetStore: Send {
    /// Creates the dataset's backing table. Identifiers are validated by
    /// the implementation before any statement is built.
    async fn create_dataset(&mut self, name: &str, attributes: &[Attribute]) -> Result<()>;

    /// Drops the dataset if present.
    async fn destroy_dataset(&mut self, name: &str) -> Result<()>;

    /// Bulk-imports CSV data into an existing dataset.
    async fn bulk_load(
        &mut self,
        name: &str,
        delimiter: char,
        has_header: bool,
        data: &[u8],
    ) -> Result<()>;

    /// Column names in schema order.
    async fn column_names(&mut self, table: &str) -> Result<Vec<String>>;

    /// Distinct values of `column`, in their textual form. Enumeration
    /// order is unspecified; callers impose their own. Rows with a NULL
    /// value are excluded and belong to no partition.
    async fn distinct_values(&mut self, table: &str, column: &str) -> Result<Vec<String>>;

    /// Number of rows where `column` equals `value`.
    async fn count_where(&mut self, table: &str, column: &str, value: &str) -> Result<u64>;

    /// Appends the window's rows to `sink` as CSV data rows (no header),
    /// streamed row-by-row. Returns the number of rows appended.
    async fn copy_rows(&mut self, window: &RowWindow<'_>, sink: &mut Vec<u8>) -> Result<u64>;
}
