//! Stratified dataset splitting
//!
//! Computes reproducible, class-stratified training/fusion/test splits
//! over a stored tabular dataset and streams them out as CSV. The same
//! seed and the same data always produce byte-identical output.

mod errors;
pub mod executor;
pub mod ident;
pub mod partition;
pub mod select;
pub mod sizing;
pub mod store;
pub mod types;

pub use errors::{Result, SplitError};
pub use executor::execute_split;
pub use store::{DatasetStore, RowWindow};
pub use types::{Attribute, AttributeType, ClassPartition, SplitKind, SplitRequest, Window};
