use std::ops::Range;

use crate::{
    assets::source::SourceImage,
    foundation::error::{AcuityError, AcuityResult},
};

/// A render target: premultiplied RGBA8 pixels, tightly packed, row-major.
///
/// A fresh surface is 0x0. Renders resize it to the source image's dimensions and fully
/// overwrite its contents, so a surface never carries state from one render to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Surface {
    /// Create an empty (0x0) surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transparent surface of the given size.
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut s = Self::new();
        s.resize(width, height);
        s
    }

    /// Resize to `width x height` and clear every pixel to transparent black.
    pub fn resize(&mut self, width: u32, height: u32) {
        let len = (width as usize) * (height as usize) * 4;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, 0);
    }

    /// Clear every pixel to transparent black without changing the size.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Whether the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        (self.width as usize) * 4
    }

    /// Draw `image` at the origin, replacing the current contents.
    ///
    /// The surface must already have the image's dimensions.
    pub fn draw_image(&mut self, image: &SourceImage) -> AcuityResult<()> {
        if self.width != image.width || self.height != image.height {
            return Err(AcuityError::evaluation(format!(
                "draw_image expects a {}x{} surface, got {}x{}",
                image.width, image.height, self.width, self.height
            )));
        }
        self.data.copy_from_slice(image.rgba8_premul.as_slice());
        Ok(())
    }

    /// Bytes of the given row range.
    pub fn rows(&self, rows: Range<u32>) -> &[u8] {
        let stride = self.stride();
        &self.data[rows.start as usize * stride..rows.end as usize * stride]
    }

    /// Premultiplied RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Convert to straight (non-premultiplied) RGBA8, e.g. for PNG export.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}
