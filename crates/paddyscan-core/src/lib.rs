pub mod encode;
pub mod error;
pub mod labels;
pub mod record;
pub mod reduce;

pub use encode::{Channel, Tensor, TensorType, encode};
pub use error::{ClassifyError, LabelError};
pub use labels::LabelTable;
pub use record::ScanRecord;
pub use reduce::{ClassificationResult, argmax, check_scores, rank, reduce};
