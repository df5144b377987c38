use std::path::Path;

use crate::{
    assets::source::SourceImage,
    foundation::error::{AcuityError, AcuityResult},
};

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied [`SourceImage`].
pub fn decode_image(bytes: &[u8]) -> AcuityResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| AcuityError::decode(format!("decode image from memory: {e}")))?;
    SourceImage::from_rgba_image(dyn_img.to_rgba8())
}

/// Read and decode an image file.
#[tracing::instrument(level = "debug")]
pub fn load_image(path: &Path) -> AcuityResult<SourceImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| AcuityError::decode(format!("read image '{}': {e}", path.display())))?;
    let img = decode_image(&bytes)?;
    tracing::debug!(width = img.width, height = img.height, "source image decoded");
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
