//! Encode → infer → reduce for one image at a time.
//!
//! A [`Pipeline`] is a cheap handle: clones share the same loaded model and
//! label table, and calls through any clone are serialised on the model.
//! The `*_async` variants move the whole attempt onto a blocking worker so
//! an async caller never stalls on pixel work or inference.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use paddyscan_core::{
    ClassificationResult, LabelTable, Tensor, TensorType, check_scores, encode, rank, reduce,
};
use tracing::debug;

use crate::engine::InferenceEngine;
use crate::error::PipelineError;
use crate::image_source::load_pixels;

pub struct Pipeline<E> {
    engine: Arc<Mutex<E>>,
    labels: Arc<LabelTable>,
}

impl<E> Clone for Pipeline<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            labels: Arc::clone(&self.labels),
        }
    }
}

impl<E: InferenceEngine> Pipeline<E> {
    pub fn new(engine: E, labels: LabelTable) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            labels: Arc::new(labels),
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn input_size(&self) -> u32 {
        self.engine().input_size()
    }

    pub fn input_type(&self) -> TensorType {
        self.engine().input_type()
    }

    // A panic inside `infer` leaves nothing half-written in the pipeline,
    // so a poisoned lock is still usable.
    fn engine(&self) -> MutexGuard<'_, E> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Model scores for an interleaved RGB buffer.
    ///
    /// Scores are checked against the label table here, so classifying and
    /// ranking the same image fail or succeed together.
    pub fn scores(&self, pixels: &[u8]) -> Result<Vec<f32>, PipelineError> {
        let mut engine = self.engine();
        let tensor = encode(pixels, engine.input_type())?;
        let scores = engine.infer(&tensor).map_err(PipelineError::Inference)?;
        debug!(classes = scores.len(), "inference complete");
        check_scores(&scores, &self.labels)?;
        Ok(scores)
    }

    pub fn classify_pixels(&self, pixels: &[u8]) -> Result<ClassificationResult, PipelineError> {
        let scores = self.scores(pixels)?;
        Ok(reduce(&scores, &self.labels)?)
    }

    /// Top `k` classes for an interleaved RGB buffer, best first.
    pub fn rank_pixels(
        &self,
        pixels: &[u8],
        k: usize,
    ) -> Result<Vec<ClassificationResult>, PipelineError> {
        let scores = self.scores(pixels)?;
        Ok(rank(&scores, &self.labels, k)?)
    }

    /// Decode an image at the model's input size and classify it.
    pub fn classify_path(&self, path: &Path) -> Result<ClassificationResult, PipelineError> {
        let pixels = load_pixels(path, self.input_size())?;
        self.classify_pixels(&pixels)
    }

    pub fn rank_path(
        &self,
        path: &Path,
        k: usize,
    ) -> Result<Vec<ClassificationResult>, PipelineError> {
        let pixels = load_pixels(path, self.input_size())?;
        self.rank_pixels(&pixels, k)
    }
}

impl<E: InferenceEngine + Send + 'static> Pipeline<E> {
    pub async fn classify_path_async(
        &self,
        path: PathBuf,
    ) -> Result<ClassificationResult, PipelineError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.classify_path(&path)).await?
    }

    pub async fn rank_path_async(
        &self,
        path: PathBuf,
        k: usize,
    ) -> Result<Vec<ClassificationResult>, PipelineError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.rank_path(&path, k)).await?
    }
}

/// Run the encoder on a blocking worker.
///
/// The caller only ever sees the finished tensor or the error.
pub async fn encode_blocking(pixels: Vec<u8>, output: TensorType) -> Result<Tensor, PipelineError> {
    Ok(tokio::task::spawn_blocking(move || encode(&pixels, output)).await??)
}
