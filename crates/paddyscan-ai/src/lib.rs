//! Inference layer: image source, ONNX Runtime engine, and the
//! encode → infer → reduce pipeline.

mod engine;
mod error;
pub mod image_source;
mod pipeline;

pub use engine::InferenceEngine;
pub use error::PipelineError;
pub use image_source::{DEFAULT_INPUT_SIZE, load_pixels, pixels_from_image};
pub use pipeline::{Pipeline, encode_blocking};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::{OnnxEngine, OnnxOptions};
