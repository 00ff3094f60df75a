//! Decoded, fixed-size RGB pixel buffers for the encoder.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::PipelineError;

/// Square side length most rice-leaf models are exported with.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Resize to `size × size` (aspect ratio is not kept) and flatten to
/// interleaved RGB bytes, row-major.
pub fn pixels_from_image(image: &DynamicImage, size: u32) -> Vec<u8> {
    image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8()
        .into_raw()
}

/// Decode an image file and return its `size × size` RGB pixel buffer.
pub fn load_pixels(path: &Path, size: u32) -> Result<Vec<u8>, PipelineError> {
    let image = image::open(path)?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        size,
        "decoded image"
    );
    Ok(pixels_from_image(&image, size))
}
