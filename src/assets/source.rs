use std::sync::Arc;

use crate::foundation::error::{AcuityError, AcuityResult};

/// The immutable source raster shared by every render.
///
/// Pixels are premultiplied RGBA8 behind an [`Arc`], so cloning a `SourceImage` never copies
/// pixel data. Width and height are always non-zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, `width * height * 4` long.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Build from straight (non-premultiplied) RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> AcuityResult<Self> {
        if width == 0 || height == 0 {
            return Err(AcuityError::validation(format!(
                "source image must have non-zero dimensions, got {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| AcuityError::validation("source image size overflow"))?;
        if rgba.len() != expected {
            return Err(AcuityError::validation(format!(
                "source image expects {expected} rgba8 bytes, got {}",
                rgba.len()
            )));
        }

        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Build from an [`image::RgbaImage`].
    pub fn from_rgba_image(img: image::RgbaImage) -> AcuityResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgba8(width, height, img.into_raw())
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
