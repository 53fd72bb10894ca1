use serde::{Deserialize, Serialize};

/// Attribute type vocabulary accepted on dataset upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Integer,
    Real,
    Text,
}

/// One column of a dataset schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
}

/// The split a request asks for. Sizing matches on this exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    Training,
    Fusion,
    Test,
    TrainingSample,
}

/// Everything needed to compute one split. Built per call, never stored.
#[derive(Clone, Debug)]
pub struct SplitRequest {
    pub dataset: String,
    pub kind: SplitKind,
    pub training_rate: f64,
    /// Zero for pure training splits and training samples.
    pub fusion_rate: f64,
    /// Only meaningful for `SplitKind::TrainingSample`.
    pub sample_rate: f64,
    /// Window index within the training split, starting at 0.
    pub sample_number: u64,
    pub class_attribute: String,
    pub include_attributes: Vec<String>,
    pub exclude_attributes: Vec<String>,
    pub attributes_rate: f64,
    pub random_seed: i64,
    pub include_header: bool,
    pub class_only: bool,
}

/// The rows sharing one class value, with the derived split sizes.
///
/// `training_size + fusion_size + test_size == partition_size` always;
/// the test split absorbs the truncation remainder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassPartition {
    pub class_value: String,
    pub partition_size: u64,
    pub training_size: u64,
    pub fusion_size: u64,
    pub test_size: u64,
}

impl ClassPartition {
    pub fn new(
        class_value: String,
        partition_size: u64,
        training_rate: f64,
        fusion_rate: f64,
    ) -> Self {
        let training_size = (partition_size as f64 * training_rate) as u64;
        let fusion_size = (partition_size as f64 * fusion_rate) as u64;
        let test_size = partition_size - training_size - fusion_size;
        Self {
            class_value,
            partition_size,
            training_size,
            fusion_size,
            test_size,
        }
    }
}

/// A LIMIT/OFFSET window into one partition's seeded row ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}
