use paddyscan_core::ClassifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
