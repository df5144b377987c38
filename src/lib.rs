//! Acuity renders side-by-side simulations of blurred vision.
//!
//! Given a source image and two signed, diopter-like inputs (a prescription and a correction),
//! Acuity produces three views: what the viewer sees uncorrected, what they see with the
//! correction applied, and an unblurred reference.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: encoded bytes -> [`SourceImage`] (premultiplied RGBA8, shared via `Arc`)
//! 2. **Derive**: `(prescription, correction)` -> three [`ViewParams`] via [`derive_views`]
//! 3. **Render**: each view through [`render_gradient_blur`], which splits the image into
//!    [`STEPS`] horizontal bands and blurs each band with its own radius
//!
//! [`ViewOrchestrator`] ties these together: it gates rendering on the image being ready and
//! re-renders every view whenever an input changes.
//!
//! The blur is a deterministic fixed-point Gaussian, so every [`BandStrategy`] (and the
//! parallel band path) yields byte-identical surfaces.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod config;
mod controls;
mod effects;
mod foundation;
mod render;

pub use assets::decode::{decode_image, load_image};
pub use assets::source::SourceImage;
pub use config::{AcuityConfig, RenderConfig};
pub use controls::{Control, ControlSpec};
pub use effects::blur::{MAX_BLUR_SIGMA, blur_rgba8_premul, kernel_radius};
pub use effects::composite::{over, over_in_place};
pub use foundation::core::Surface;
pub use foundation::error::{AcuityError, AcuityResult};
pub use render::gradient::{
    Band, BandStrategy, BlurDirection, GradientOpts, RenderOutcome, STEPS, band_blur, band_rows,
    plan_bands, render_gradient_blur, split_signed,
};
pub use render::views::{
    Event, RenderStats, ViewKind, ViewObserver, ViewOrchestrator, ViewParams, VisionProfile,
    derive_views,
};
