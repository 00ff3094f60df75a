use paddyscan_core::{Tensor, TensorType};

/// A loaded classification model.
///
/// Takes a planar RGB tensor of `3 * input_size * input_size` values and
/// returns one score per class. The handle is owned by whoever runs
/// inference; dropping it releases the model.
pub trait InferenceEngine {
    /// Numeric type the model input expects.
    fn input_type(&self) -> TensorType;

    /// Side length of the square input image, in pixels.
    fn input_size(&self) -> u32;

    fn infer(&mut self, tensor: &Tensor) -> anyhow::Result<Vec<f32>>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn input_type(&self) -> TensorType {
        (**self).input_type()
    }

    fn input_size(&self) -> u32 {
        (**self).input_size()
    }

    fn infer(&mut self, tensor: &Tensor) -> anyhow::Result<Vec<f32>> {
        (**self).infer(tensor)
    }
}
