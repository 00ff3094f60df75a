//! Pixel buffer → model input tensor.
//!
//! Decoded images arrive as interleaved RGB bytes (`R G B R G B ...`, row-major).
//! The classification models expect channel-planar input: every red value,
//! then every green value, then every blue value, each scaled into `[0, 1]`.
//! The plane order is fixed by the model and must not change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifyError;

const RGB_CHANNELS: usize = 3;

/// Numeric type the model consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorType {
    #[default]
    Float32,
    Uint8,
}

impl TensorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Uint8 => "uint8",
        }
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(Self::Float32),
            "uint8" | "u8" => Ok(Self::Uint8),
            other => Err(format!(
                "unknown tensor type {other:?}, expected 'float32' or 'uint8'"
            )),
        }
    }
}

/// One colour plane of a planar tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    fn offset(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Channel-planar model input: `[R..., G..., B...]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// Values normalised into `[0, 1]`.
    Float32(Vec<f32>),
    /// Values in `[0, 255]`.
    Uint8(Vec<u8>),
}

impl Tensor {
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Uint8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tensor_type(&self) -> TensorType {
        match self {
            Self::Float32(_) => TensorType::Float32,
            Self::Uint8(_) => TensorType::Uint8,
        }
    }

    /// Number of values in each colour plane (= pixel count).
    pub fn plane_len(&self) -> usize {
        self.len() / RGB_CHANNELS
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::Float32(v) => Some(v),
            Self::Uint8(_) => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            Self::Uint8(v) => Some(v),
            Self::Float32(_) => None,
        }
    }

    /// Borrow one plane of a float tensor.
    pub fn plane(&self, channel: Channel) -> Option<&[f32]> {
        let n = self.plane_len();
        let start = channel.offset() * n;
        self.as_f32().map(|v| &v[start..start + n])
    }

    /// Mean value of one plane, in the tensor's own scale.
    pub fn plane_mean(&self, channel: Channel) -> f64 {
        let n = self.plane_len();
        if n == 0 {
            return 0.0;
        }
        let range = channel.offset() * n..(channel.offset() + 1) * n;
        let sum: f64 = match self {
            Self::Float32(v) => v[range].iter().map(|&x| f64::from(x)).sum(),
            Self::Uint8(v) => v[range].iter().map(|&x| f64::from(x)).sum(),
        };
        sum / n as f64
    }
}

/// Encode an interleaved RGB buffer into a planar tensor.
///
/// Every channel value is divided by 255 (linear, no gamma). In
/// [`TensorType::Uint8`] mode the normalised values are scaled back with
/// `round(v * 255)`.
///
/// Fails with [`ClassifyError::InvalidInput`] unless `pixels.len()` is a
/// positive multiple of 3; nothing is produced in that case.
pub fn encode(pixels: &[u8], output: TensorType) -> Result<Tensor, ClassifyError> {
    if pixels.is_empty() || pixels.len() % RGB_CHANNELS != 0 {
        return Err(ClassifyError::InvalidInput { len: pixels.len() });
    }

    let n = pixels.len() / RGB_CHANNELS;
    let mut planar = vec![0.0f32; pixels.len()];
    for (i, px) in pixels.chunks_exact(RGB_CHANNELS).enumerate() {
        planar[i] = normalize(px[0]);
        planar[n + i] = normalize(px[1]);
        planar[2 * n + i] = normalize(px[2]);
    }

    let tensor = match output {
        TensorType::Float32 => Tensor::Float32(planar),
        TensorType::Uint8 => Tensor::Uint8(
            planar
                .into_iter()
                .map(|v| (v * 255.0).round() as u8)
                .collect(),
        ),
    };

    debug!(pixels = n, tensor_type = %output, "encoded pixel buffer");
    Ok(tensor)
}

fn normalize(value: u8) -> f32 {
    f32::from(value) / 255.0
}
