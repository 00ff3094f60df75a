use thiserror::Error;

/// Failures of a single encode → infer → reduce attempt.
///
/// All of them are fatal to the attempt; nothing is retried here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("input array length must be divisible by 3 (got {len})")]
    InvalidInput { len: usize },

    #[error("model produced no scores")]
    EmptyScores,

    #[error("class index {index} has no label (table has {classes} classes)")]
    UnknownClassIndex { index: usize, classes: usize },

    #[error("model produced a non-finite score for class {index}")]
    NonFiniteScore { index: usize },
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("cannot read label table: {0}")]
    Io(#[from] std::io::Error),

    #[error("label table JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("label key {0:?} is not a class index")]
    InvalidKey(String),

    #[error("label table names class index {0} more than once")]
    DuplicateIndex(usize),

    #[error("label table has no entry for class index {0}")]
    MissingIndex(usize),

    #[error("label table is empty")]
    Empty,
}
