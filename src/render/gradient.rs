use std::{collections::HashMap, ops::Range};

use rayon::prelude::*;

use crate::{
    assets::source::SourceImage,
    effects::{
        blur::{MAX_BLUR_SIGMA, blur_rgba8_premul, kernel_radius},
        composite::over_in_place,
    },
    foundation::core::Surface,
    foundation::error::{AcuityError, AcuityResult},
};

/// Number of horizontal bands an image is split into.
pub const STEPS: u32 = 10;

/// Which way the blur radius grows across the bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurDirection {
    /// Top band is blurriest, bottom band nearly sharp (nearsighted profile).
    BottomToTop,
    /// Top band is sharp, bottom band blurriest (farsighted profile).
    TopToBottom,
    /// No blur at all.
    None,
}

impl BlurDirection {
    /// Direction for a signed diopter-like value: `<= 0` is bottom-to-top, `> 0` top-to-bottom.
    pub fn from_signed(value: f64) -> Self {
        if value <= 0.0 {
            Self::BottomToTop
        } else {
            Self::TopToBottom
        }
    }
}

/// Split a signed value into `(magnitude, direction)`.
pub fn split_signed(value: f64) -> (f64, BlurDirection) {
    (value.abs(), BlurDirection::from_signed(value))
}

/// How band scratch images are produced. Every strategy yields identical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandStrategy {
    /// Blur the whole image once per band, then keep that band's rows.
    FullFrame,
    /// Blur the whole image once per distinct radius and share it between bands.
    #[default]
    PerRadius,
    /// Blur only the band's rows plus one kernel radius of margin on each side.
    Cropped,
}

/// Options for [`render_gradient_blur`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GradientOpts {
    /// How band scratch images are produced.
    pub strategy: BandStrategy,
    /// Compute bands on the current rayon pool.
    pub parallel: bool,
}

/// One horizontal slice of the image and its blur radius.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    /// Band number, `0` is the top band.
    pub index: u32,
    /// Rows covered, end exclusive. May be empty when the image is shorter than [`STEPS`].
    pub rows: Range<u32>,
    /// Gaussian standard deviation in pixels; 0 means the band is drawn unfiltered.
    pub blur: f64,
}

/// What a render call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Target or source image missing; nothing was drawn.
    NotReady,
    /// The target holds the unmodified source image.
    Unblurred,
    /// The gradient was applied.
    Blurred {
        /// Number of blur filter invocations.
        blur_passes: u32,
    },
}

/// Rows of band `index` for an image of `height` rows: `floor(i*H/STEPS) .. floor((i+1)*H/STEPS)`.
pub fn band_rows(index: u32, height: u32) -> Range<u32> {
    let h = u64::from(height);
    let steps = u64::from(STEPS);
    let start = u64::from(index) * h / steps;
    let end = (u64::from(index) + 1) * h / steps;
    start as u32..end as u32
}

/// Blur radius of band `index` for the given maximum and direction.
pub fn band_blur(index: u32, max_blur: f64, direction: BlurDirection) -> f64 {
    let steps = f64::from(STEPS);
    match direction {
        BlurDirection::BottomToTop => (f64::from(STEPS - index) / steps) * max_blur,
        BlurDirection::TopToBottom => (f64::from(index) / steps) * max_blur,
        BlurDirection::None => 0.0,
    }
}

/// The full band partition of an image of `height` rows.
pub fn plan_bands(height: u32, max_blur: f64, direction: BlurDirection) -> Vec<Band> {
    (0..STEPS)
        .map(|index| Band {
            index,
            rows: band_rows(index, height),
            blur: band_blur(index, max_blur, direction),
        })
        .collect()
}

/// Render `source` into `target` with a band-quantized gradient blur.
///
/// The target is resized to the source's dimensions and fully overwritten. A missing target
/// or source is not an error: the call does nothing and returns [`RenderOutcome::NotReady`].
/// `max_blur == 0` or [`BlurDirection::None`] leaves the target equal to the source.
/// `max_blur` above [`MAX_BLUR_SIGMA`] is rejected before the target is touched.
#[tracing::instrument(level = "debug", skip(target, source, opts), fields(strategy = ?opts.strategy))]
pub fn render_gradient_blur(
    target: Option<&mut Surface>,
    source: Option<&SourceImage>,
    max_blur: f64,
    direction: BlurDirection,
    opts: &GradientOpts,
) -> AcuityResult<RenderOutcome> {
    let (Some(target), Some(source)) = (target, source) else {
        tracing::debug!("render skipped: target or source image not ready");
        return Ok(RenderOutcome::NotReady);
    };
    if !max_blur.is_finite() || !(0.0..=MAX_BLUR_SIGMA).contains(&max_blur) {
        return Err(AcuityError::validation(format!(
            "max_blur must be finite and within 0..={MAX_BLUR_SIGMA}, got {max_blur}"
        )));
    }

    target.resize(source.width, source.height);
    target.draw_image(source)?;

    if max_blur == 0.0 || direction == BlurDirection::None {
        return Ok(RenderOutcome::Unblurred);
    }

    let bands = plan_bands(source.height, max_blur, direction);
    let stride = target.stride();
    let strips = split_band_rows(&mut target.data, &bands, stride);

    let blur_passes = match opts.strategy {
        BandStrategy::FullFrame => {
            for_each_band(&bands, strips, opts.parallel, |band, strip| {
                let scratch = scratch_layer(
                    source.rgba8_premul.as_slice(),
                    source.width,
                    source.height,
                    band.blur,
                )?;
                strip.copy_from_slice(&scratch[band_byte_range(band, stride)]);
                Ok(())
            })?;
            count_filtered(&bands)
        }
        BandStrategy::PerRadius => {
            let layers = layers_per_radius(source, &bands, opts.parallel)?;
            for_each_band(&bands, strips, opts.parallel, |band, strip| {
                let layer = layers.get(&band.blur.to_bits()).ok_or_else(|| {
                    AcuityError::evaluation("internal error: missing blur layer for band")
                })?;
                strip.copy_from_slice(&layer[band_byte_range(band, stride)]);
                Ok(())
            })?;
            layers
                .keys()
                .filter(|&&bits| f64::from_bits(bits) > 0.0)
                .count() as u32
        }
        BandStrategy::Cropped => {
            for_each_band(&bands, strips, opts.parallel, |band, strip| {
                cropped_band(source, band, strip)
            })?;
            count_filtered(&bands)
        }
    };

    tracing::debug!(blur_passes, "gradient blur rendered");
    Ok(RenderOutcome::Blurred { blur_passes })
}

/// The scratch image for one radius: the source, with its blurred copy drawn over it.
fn scratch_layer(src: &[u8], width: u32, height: u32, blur: f64) -> AcuityResult<Vec<u8>> {
    let mut layer = src.to_vec();
    if blur > 0.0 {
        let blurred = blur_rgba8_premul(src, width, height, blur)?;
        over_in_place(&mut layer, &blurred)?;
    }
    Ok(layer)
}

fn layers_per_radius(
    source: &SourceImage,
    bands: &[Band],
    parallel: bool,
) -> AcuityResult<HashMap<u64, Vec<u8>>> {
    let mut radii = Vec::<f64>::new();
    for band in bands.iter().filter(|b| !b.rows.is_empty()) {
        if !radii.iter().any(|r| r.to_bits() == band.blur.to_bits()) {
            radii.push(band.blur);
        }
    }

    let build = |blur: &f64| -> AcuityResult<(u64, Vec<u8>)> {
        let layer = scratch_layer(
            source.rgba8_premul.as_slice(),
            source.width,
            source.height,
            *blur,
        )?;
        Ok((blur.to_bits(), layer))
    };

    if parallel {
        radii.par_iter().map(build).collect()
    } else {
        radii.iter().map(build).collect()
    }
}

fn cropped_band(source: &SourceImage, band: &Band, strip: &mut [u8]) -> AcuityResult<()> {
    let stride = source.width as usize * 4;
    let src = source.rgba8_premul.as_slice();
    if band.blur <= 0.0 {
        strip.copy_from_slice(&src[band_byte_range(band, stride)]);
        return Ok(());
    }

    // With one kernel radius of margin the vertical pass never reads past the crop except
    // at the image edges, where both clamp to the same row.
    let margin = kernel_radius(band.blur);
    let top = band.rows.start.saturating_sub(margin);
    let bottom = band.rows.end.saturating_add(margin).min(source.height);
    let crop = &src[top as usize * stride..bottom as usize * stride];

    let layer = scratch_layer(crop, source.width, bottom - top, band.blur)?;
    let offset = (band.rows.start - top) as usize * stride;
    strip.copy_from_slice(&layer[offset..offset + strip.len()]);
    Ok(())
}

fn for_each_band<F>(
    bands: &[Band],
    strips: Vec<&mut [u8]>,
    parallel: bool,
    f: F,
) -> AcuityResult<()>
where
    F: Fn(&Band, &mut [u8]) -> AcuityResult<()> + Sync,
{
    let work = bands
        .iter()
        .zip(strips)
        .filter(|(band, _)| !band.rows.is_empty());
    if parallel {
        work.collect::<Vec<_>>()
            .into_par_iter()
            .try_for_each(|(band, strip)| f(band, strip))
    } else {
        for (band, strip) in work {
            f(band, strip)?;
        }
        Ok(())
    }
}

/// Split the target bytes into one disjoint mutable strip per band, in band order.
fn split_band_rows<'a>(mut data: &'a mut [u8], bands: &[Band], stride: usize) -> Vec<&'a mut [u8]> {
    let mut strips = Vec::with_capacity(bands.len());
    for band in bands {
        let len = band.rows.len() * stride;
        let (head, tail) = std::mem::take(&mut data).split_at_mut(len);
        strips.push(head);
        data = tail;
    }
    strips
}

fn band_byte_range(band: &Band, stride: usize) -> Range<usize> {
    band.rows.start as usize * stride..band.rows.end as usize * stride
}

fn count_filtered(bands: &[Band]) -> u32 {
    bands
        .iter()
        .filter(|b| b.blur > 0.0 && !b.rows.is_empty())
        .count() as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
