use crate::foundation::error::{AcuityError, AcuityResult};

/// Largest accepted Gaussian standard deviation, in pixels.
///
/// Larger values are rejected with [`AcuityError::Validation`]; the kernel for this sigma
/// already spans [`kernel_radius`]`(MAX_BLUR_SIGMA)` pixels on each side.
pub const MAX_BLUR_SIGMA: f64 = 256.0;

const Q16_ONE: u32 = 1 << 16;

/// Kernel half-width, in pixels, used for a Gaussian of standard deviation `sigma`.
///
/// This is `ceil(3 * sigma)`. `sigma <= 0` (or non-finite) maps to 0, and sigma is capped at
/// [`MAX_BLUR_SIGMA`], so the result never exceeds `kernel_radius(MAX_BLUR_SIGMA)`.
pub fn kernel_radius(sigma: f64) -> u32 {
    if sigma.is_finite() && sigma > 0.0 {
        (3.0 * sigma.min(MAX_BLUR_SIGMA)).ceil() as u32
    } else {
        0
    }
}

/// Check that `sigma` is usable as a blur standard deviation.
fn validate_sigma(sigma: f64) -> AcuityResult<()> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(AcuityError::validation(format!(
            "blur sigma must be finite and >= 0, got {sigma}"
        )));
    }
    if sigma > MAX_BLUR_SIGMA {
        return Err(AcuityError::validation(format!(
            "blur sigma {sigma} exceeds the maximum of {MAX_BLUR_SIGMA}px"
        )));
    }
    Ok(())
}

/// Separable Gaussian blur over premultiplied RGBA8 with clamped edges.
///
/// `sigma` is the standard deviation in pixels and must lie in `0..=MAX_BLUR_SIGMA`.
/// `sigma == 0` returns a copy of `src`. The result is fully deterministic (fixed-point Q16
/// kernel), so two calls with the same inputs always produce identical bytes.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f64) -> AcuityResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| AcuityError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(AcuityError::evaluation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    validate_sigma(sigma)?;

    let kernel = GaussianKernel::new(sigma);
    if kernel.is_identity() || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let (w, h) = (width as usize, height as usize);
    let mut rows_done = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    convolve(src, &mut rows_done, w, h, &kernel, Axis::Horizontal);
    convolve(&rows_done, &mut out, w, h, &kernel, Axis::Vertical);
    Ok(out)
}

/// Symmetric 1-D Gaussian in Q16 fixed point. Weights always sum to exactly `1 << 16`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GaussianKernel {
    radius: usize,
    /// `2 * radius + 1` taps, index `radius` is the center.
    weights: Vec<u32>,
}

impl GaussianKernel {
    /// Kernel for standard deviation `sigma`; a non-positive sigma yields the identity kernel.
    pub(crate) fn new(sigma: f64) -> Self {
        let radius = kernel_radius(sigma) as usize;
        if radius == 0 {
            return Self {
                radius: 0,
                weights: vec![Q16_ONE],
            };
        }
        let sigma = sigma.min(MAX_BLUR_SIGMA);

        let falloff = |d: usize| {
            let d = d as f64;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        };
        let total: f64 = 1.0 + 2.0 * (1..=radius).map(falloff).sum::<f64>();

        // Side taps are floored so they can never sum past one; the center absorbs the rest.
        let side: Vec<u32> = (1..=radius)
            .map(|d| (falloff(d) / total * f64::from(Q16_ONE)).floor() as u32)
            .collect();
        let side_sum: u32 = side.iter().sum();
        let center = Q16_ONE - 2 * side_sum;

        let mut weights = Vec::with_capacity(2 * radius + 1);
        weights.extend(side.iter().rev());
        weights.push(center);
        weights.extend(side.iter());
        Self { radius, weights }
    }

    fn is_identity(&self) -> bool {
        self.radius == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One 1-D pass of `kernel` along `axis`, reading `src` and writing every pixel of `dst`.
///
/// Samples past either end of a row (or column) repeat the edge pixel.
fn convolve(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    kernel: &GaussianKernel,
    axis: Axis,
) {
    let (len, step) = match axis {
        Axis::Horizontal => (width, 4),
        Axis::Vertical => (height, width * 4),
    };
    let last = len as i64 - 1;
    let radius = kernel.radius as i64;

    for (i, out) in dst.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        let (pos, line_start) = match axis {
            Axis::Horizontal => (x, y * width * 4),
            Axis::Vertical => (y, x * 4),
        };

        let mut acc = [0u64; 4];
        for (k, &w) in kernel.weights.iter().enumerate() {
            let s = (pos as i64 + k as i64 - radius).clamp(0, last) as usize;
            let px = &src[line_start + s * step..][..4];
            for (a, &c) in acc.iter_mut().zip(px) {
                *a += u64::from(w) * u64::from(c);
            }
        }
        for (o, a) in out.iter_mut().zip(acc) {
            *o = round_q16(a);
        }
    }
}

fn round_q16(acc: u64) -> u8 {
    ((acc + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
