use std::sync::Arc;

use crate::{
    assets::source::SourceImage,
    config::AcuityConfig,
    controls::{Control, ControlSpec},
    foundation::core::Surface,
    foundation::error::{AcuityError, AcuityResult},
    render::gradient::{BlurDirection, GradientOpts, render_gradient_blur, split_signed},
};

/// The three rendered views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// What the viewer sees with their prescription and no correction.
    Uncorrected,
    /// What the viewer sees with the correction applied.
    Corrected,
    /// Unblurred reference.
    Normal,
}

impl ViewKind {
    /// Every view, in display order.
    pub const ALL: [ViewKind; 3] = [ViewKind::Uncorrected, ViewKind::Corrected, ViewKind::Normal];

    /// Position of this view in [`ViewKind::ALL`] and in [`derive_views`]'s output.
    pub fn index(self) -> usize {
        match self {
            ViewKind::Uncorrected => 0,
            ViewKind::Corrected => 1,
            ViewKind::Normal => 2,
        }
    }

    /// Heading shown above the view.
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Uncorrected => "What you currently see",
            ViewKind::Corrected => "What you see after correction",
            ViewKind::Normal => "Normal person vision",
        }
    }

    /// File stem used when views are written to disk.
    pub fn slug(self) -> &'static str {
        match self {
            ViewKind::Uncorrected => "uncorrected",
            ViewKind::Corrected => "corrected",
            ViewKind::Normal => "normal",
        }
    }
}

/// Renderer inputs for one view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    /// Blur of the blurriest band, in pixels.
    pub max_blur: f64,
    /// Which end of the image is blurriest.
    pub direction: BlurDirection,
}

/// Compute the per-view renderer inputs for a `(prescription, correction)` pair.
///
/// Indexed by [`ViewKind::index`].
pub fn derive_views(prescription: f64, correction: f64) -> [ViewParams; 3] {
    let (max_blur, direction) = split_signed(prescription);
    let uncorrected = ViewParams {
        max_blur,
        direction,
    };

    let (max_blur, direction) = split_signed(prescription + correction);
    let corrected = ViewParams {
        max_blur,
        direction,
    };

    let normal = ViewParams {
        max_blur: 0.0,
        direction: BlurDirection::None,
    };

    [uncorrected, corrected, normal]
}

/// Which kind of refractive error a prescription describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisionProfile {
    /// Prescription `<= 0`: distant objects (top of the image) blur.
    Nearsighted,
    /// Prescription `> 0`: near objects (bottom of the image) blur.
    Farsighted,
}

impl VisionProfile {
    /// Classify a signed prescription.
    pub fn from_prescription(prescription: f64) -> Self {
        if prescription > 0.0 {
            Self::Farsighted
        } else {
            Self::Nearsighted
        }
    }

    /// One-line explanation for display.
    pub fn description(self) -> &'static str {
        match self {
            Self::Nearsighted => "Nearsighted: you see far objects blurry",
            Self::Farsighted => "Farsighted: you see near objects blurry",
        }
    }
}

/// Inputs the orchestrator reacts to.
#[derive(Clone, Debug)]
pub enum Event {
    /// The source image finished loading. Only the first one is honored.
    ImageReady(Arc<SourceImage>),
    /// The prescription control moved to a new value.
    PrescriptionChanged(f64),
    /// The correction control moved to a new value.
    CorrectionChanged(f64),
}

/// Notified after every render pass, once per view.
pub trait ViewObserver {
    /// Called with the freshly rendered surface of `kind` and the inputs it was rendered from.
    fn on_view_rendered(&mut self, kind: ViewKind, params: ViewParams, surface: &Surface);
}

/// Orchestrator counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Full passes over the three views.
    pub passes: u64,
    /// Individual view renders.
    pub views_rendered: u64,
    /// Input events that arrived before the image was ready.
    pub skipped_not_ready: u64,
    /// Repeated `ImageReady` events that were ignored.
    pub duplicate_image_ready: u64,
}

/// Holds the two controls, the image-ready gate and the three render targets, and re-renders
/// every view synchronously whenever an input changes.
pub struct ViewOrchestrator {
    prescription: Control,
    correction: Control,
    image: Option<Arc<SourceImage>>,
    targets: [Surface; 3],
    params: [ViewParams; 3],
    opts: GradientOpts,
    pool: Option<rayon::ThreadPool>,
    observers: Vec<Box<dyn ViewObserver>>,
    stats: RenderStats,
}

impl ViewOrchestrator {
    /// Build an orchestrator with the given control ranges. Nothing renders until the image is
    /// ready.
    pub fn new(
        prescription: ControlSpec,
        correction: ControlSpec,
        opts: GradientOpts,
    ) -> AcuityResult<Self> {
        let prescription = Control::new(prescription)?;
        let correction = Control::new(correction)?;
        let params = derive_views(prescription.value(), correction.value());
        Ok(Self {
            prescription,
            correction,
            image: None,
            targets: Default::default(),
            params,
            opts,
            pool: None,
            observers: Vec::new(),
            stats: RenderStats::default(),
        })
    }

    /// Build from a validated [`AcuityConfig`], with a dedicated thread pool when the config
    /// asks for parallel bands on a fixed number of threads.
    pub fn from_config(cfg: &AcuityConfig) -> AcuityResult<Self> {
        cfg.validate()?;
        let mut o = Self::new(cfg.prescription, cfg.correction, cfg.gradient_opts())?;
        if cfg.render.parallel && cfg.render.threads.is_some() {
            o.pool = Some(build_thread_pool(cfg.render.threads)?);
        }
        Ok(o)
    }

    /// Register an observer for every subsequent render pass.
    pub fn subscribe(&mut self, observer: Box<dyn ViewObserver>) {
        self.observers.push(observer);
    }

    /// Apply one event, re-rendering all views when it changes anything and the image is ready.
    pub fn handle(&mut self, event: Event) -> AcuityResult<()> {
        match event {
            Event::ImageReady(image) => {
                if self.image.is_some() {
                    tracing::warn!("ignoring repeated image-ready notification");
                    self.stats.duplicate_image_ready += 1;
                    return Ok(());
                }
                tracing::debug!(
                    width = image.width,
                    height = image.height,
                    "source image ready"
                );
                self.image = Some(image);
                self.render_all()
            }
            Event::PrescriptionChanged(v) => {
                let changed = self.prescription.set(v)?;
                self.after_input_change(changed)
            }
            Event::CorrectionChanged(v) => {
                let changed = self.correction.set(v)?;
                self.after_input_change(changed)
            }
        }
    }

    /// Shorthand for [`Event::ImageReady`].
    pub fn image_ready(&mut self, image: Arc<SourceImage>) -> AcuityResult<()> {
        self.handle(Event::ImageReady(image))
    }

    /// Shorthand for [`Event::PrescriptionChanged`].
    pub fn set_prescription(&mut self, value: f64) -> AcuityResult<()> {
        self.handle(Event::PrescriptionChanged(value))
    }

    /// Shorthand for [`Event::CorrectionChanged`].
    pub fn set_correction(&mut self, value: f64) -> AcuityResult<()> {
        self.handle(Event::CorrectionChanged(value))
    }

    /// Whether the source image has arrived.
    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }

    /// Current (snapped) prescription.
    pub fn prescription(&self) -> f64 {
        self.prescription.value()
    }

    /// Current (snapped) correction.
    pub fn correction(&self) -> f64 {
        self.correction.value()
    }

    /// Vision profile of the current prescription.
    pub fn profile(&self) -> VisionProfile {
        VisionProfile::from_prescription(self.prescription.value())
    }

    /// Last rendered surface of `kind`; 0x0 before the first render.
    pub fn view(&self, kind: ViewKind) -> &Surface {
        &self.targets[kind.index()]
    }

    /// Renderer inputs of `kind` for the current control values.
    pub fn params(&self, kind: ViewKind) -> ViewParams {
        self.params[kind.index()]
    }

    /// Counters since construction.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn after_input_change(&mut self, changed: bool) -> AcuityResult<()> {
        self.params = derive_views(self.prescription.value(), self.correction.value());
        if !self.is_ready() {
            self.stats.skipped_not_ready += 1;
            tracing::debug!("input changed before image ready; render deferred");
            return Ok(());
        }
        if !changed {
            return Ok(());
        }
        self.render_all()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn render_all(&mut self) -> AcuityResult<()> {
        let Some(image) = self.image.as_deref() else {
            return Ok(());
        };
        tracing::debug!(
            prescription = self.prescription.value(),
            correction = self.correction.value(),
            "rendering views"
        );

        for kind in ViewKind::ALL {
            let ViewParams {
                max_blur,
                direction,
            } = self.params[kind.index()];
            let target = &mut self.targets[kind.index()];
            let opts = &self.opts;
            let mut render =
                || render_gradient_blur(Some(target), Some(image), max_blur, direction, opts);
            match &self.pool {
                Some(pool) => pool.install(render)?,
                None => render()?,
            };
            self.stats.views_rendered += 1;
        }
        self.stats.passes += 1;

        for observer in &mut self.observers {
            for kind in ViewKind::ALL {
                observer.on_view_rendered(
                    kind,
                    self.params[kind.index()],
                    &self.targets[kind.index()],
                );
            }
        }
        Ok(())
    }
}

fn build_thread_pool(threads: Option<usize>) -> AcuityResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AcuityError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AcuityError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/views.rs"]
mod tests;
