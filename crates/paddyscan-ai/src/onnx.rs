//! ONNX Runtime engine for planar RGB image classifiers.
//!
//! Expects a single `[1, 3, H, W]` input (NCHW, `H == W`) and a first output
//! holding one `f32` score per class, shaped `[N]` or `[1, N]`.

use std::path::{Path, PathBuf};

use ort::session::Session;
use ort::value::Tensor as OrtTensor;
use paddyscan_core::{Tensor, TensorType};
use tracing::{debug, info};

use crate::engine::InferenceEngine;
use crate::image_source::DEFAULT_INPUT_SIZE;

#[derive(Debug, Clone)]
pub struct OnnxOptions {
    pub input_type: TensorType,
    /// Used when the model's input shape is dynamic.
    pub input_size: u32,
}

impl Default for OnnxOptions {
    fn default() -> Self {
        Self {
            input_type: TensorType::Float32,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

pub struct OnnxEngine {
    session: Session,
    input_type: TensorType,
    input_size: u32,
    model_path: PathBuf,
}

impl OnnxEngine {
    /// Load a model file and commit an inference session for it.
    pub fn load(model_path: &Path, options: OnnxOptions) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "model not found: {model_path:?}");

        let session = Session::builder()?.commit_from_file(model_path)?;

        anyhow::ensure!(
            !session.inputs().is_empty(),
            "model {model_path:?} declares no inputs"
        );
        let static_size = infer_square_size(session.inputs()[0].dtype());
        if let Some(size) = static_size
            && size != options.input_size
        {
            debug!(
                configured = options.input_size,
                model = size,
                "using input size declared by the model"
            );
        }
        let input_size = static_size.unwrap_or(options.input_size);

        info!(
            model = %model_path.display(),
            input_size,
            input_type = %options.input_type,
            "loaded classification model"
        );
        Ok(Self {
            session,
            input_type: options.input_type,
            input_size,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceEngine for OnnxEngine {
    fn input_type(&self) -> TensorType {
        self.input_type
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn infer(&mut self, tensor: &Tensor) -> anyhow::Result<Vec<f32>> {
        let side = self.input_size as usize;
        anyhow::ensure!(
            tensor.len() == 3 * side * side,
            "tensor has {} values, model expects 3x{side}x{side}",
            tensor.len()
        );
        anyhow::ensure!(
            tensor.tensor_type() == self.input_type,
            "tensor is {}, model expects {}",
            tensor.tensor_type(),
            self.input_type
        );

        let shape = [1i64, 3, side as i64, side as i64];
        let outputs = match tensor {
            Tensor::Float32(values) => {
                let input = OrtTensor::from_array((shape, values.clone().into_boxed_slice()))?;
                self.session.run(ort::inputs![input])?
            }
            Tensor::Uint8(values) => {
                let input = OrtTensor::from_array((shape, values.clone().into_boxed_slice()))?;
                self.session.run(ort::inputs![input])?
            }
        };

        let (output_shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            matches!(dims, [_] | [1, _]),
            "unexpected output shape: {dims:?}, expected [N] or [1, N]"
        );
        anyhow::ensure!(!data.is_empty(), "model produced an empty output");

        Ok(data.to_vec())
    }
}

/// Square spatial size from a static `[1, 3, H, W]` input shape.
fn infer_square_size(input_type: &ort::value::ValueType) -> Option<u32> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            let dims: &[i64] = shape;
            match dims {
                [_, 3, h, w] if *h > 0 && h == w => u32::try_from(*h).ok(),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddyscan_core::encode;

    fn model_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("rice-npk")
            .join("model.onnx")
    }

    #[test]
    fn missing_model_is_an_error() {
        let path = PathBuf::from("/nonexistent/paddyscan/model.onnx");
        let err = OnnxEngine::load(&path, OnnxOptions::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    #[ignore = "needs models/rice-npk/model.onnx exported from the training notebook"]
    fn classifies_uniform_image() {
        let mut engine = OnnxEngine::load(&model_path(), OnnxOptions::default()).unwrap();
        let side = engine.input_size() as usize;
        let pixels = vec![90u8; 3 * side * side];
        let tensor = encode(&pixels, engine.input_type()).unwrap();

        let scores = engine.infer(&tensor).unwrap();
        assert!(!scores.is_empty());
        assert!(scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    #[ignore = "needs models/rice-npk/model.onnx exported from the training notebook"]
    fn rejects_wrong_tensor_length() {
        let mut engine = OnnxEngine::load(&model_path(), OnnxOptions::default()).unwrap();
        let tensor = encode(&[0, 0, 0], TensorType::Float32).unwrap();
        assert!(engine.infer(&tensor).is_err());
    }
}
