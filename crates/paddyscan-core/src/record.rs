//! Persistable scan results.

use serde::{Deserialize, Serialize};

use crate::reduce::ClassificationResult;

/// One classified image, in the shape of a row of the `results` table the
/// mobile client syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub classification: String,
    /// Percent, two decimal places.
    pub confidence: f64,
    pub class_index: usize,
    /// Image path or URI the scan came from.
    pub source: String,
    /// Model file the scan was produced with.
    pub model: String,
    /// ISO 8601 timestamp string.
    pub created_at: String,
    /// Runner-up classes, best first, when requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranking: Vec<ClassificationResult>,
}

impl ScanRecord {
    pub fn new(
        result: &ClassificationResult,
        source: impl Into<String>,
        model: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            classification: result.class_name.clone(),
            confidence: result.confidence_percent,
            class_index: result.class_index,
            source: source.into(),
            model: model.into(),
            created_at: created_at.into(),
            ranking: Vec::new(),
        }
    }

    pub fn with_ranking(mut self, ranking: Vec<ClassificationResult>) -> Self {
        self.ranking = ranking;
        self
    }
}
