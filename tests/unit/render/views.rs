use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::render::gradient::BandStrategy;

fn gradient_image(width: u32, height: u32) -> Arc<SourceImage> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let stripe = if x % 3 == 0 { 250 } else { 10 };
            rgba.extend_from_slice(&[stripe, (y * 255 / height) as u8, 90, 255]);
        }
    }
    Arc::new(SourceImage::from_rgba8(width, height, rgba).unwrap())
}

fn orchestrator() -> ViewOrchestrator {
    ViewOrchestrator::new(
        ControlSpec::default(),
        ControlSpec::default(),
        GradientOpts::default(),
    )
    .unwrap()
}

#[derive(Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<(ViewKind, ViewParams, u32, u32)>>>,
}

impl ViewObserver for Recorder {
    fn on_view_rendered(&mut self, kind: ViewKind, params: ViewParams, surface: &Surface) {
        self.calls
            .borrow_mut()
            .push((kind, params, surface.width, surface.height));
    }
}

#[test]
fn derived_blur_is_absolute_value() {
    for p in [-10.0, -6.0, -0.01, 0.0, 0.01, 2.5, 10.0] {
        for c in [-10.0, -3.0, 0.0, 4.25, 10.0] {
            let [u, k, n] = derive_views(p, c);
            assert_eq!(u.max_blur, f64::abs(p));
            assert_eq!(k.max_blur, f64::abs(p + c));
            assert!(u.max_blur >= 0.0 && k.max_blur >= 0.0);
            assert_eq!(n.max_blur, 0.0);
            assert_eq!(n.direction, BlurDirection::None);
        }
    }
}

#[test]
fn full_correction_cancels_blur() {
    let [u, k, _] = derive_views(3.0, -3.0);
    assert_eq!(u.direction, BlurDirection::TopToBottom);
    assert_eq!(u.max_blur, 3.0);
    assert_eq!(k.direction, BlurDirection::BottomToTop);
    assert_eq!(k.max_blur, 0.0);
}

#[test]
fn full_correction_renders_like_normal_view() {
    let mut o = orchestrator();
    o.set_prescription(3.0).unwrap();
    o.set_correction(-3.0).unwrap();
    o.image_ready(gradient_image(12, 30)).unwrap();

    assert_eq!(o.params(ViewKind::Corrected).max_blur, 0.0);
    assert_eq!(o.view(ViewKind::Corrected), o.view(ViewKind::Normal));
    assert_ne!(o.view(ViewKind::Uncorrected), o.view(ViewKind::Normal));
}

#[test]
fn view_titles() {
    assert_eq!(ViewKind::Uncorrected.title(), "What you currently see");
    assert_eq!(ViewKind::Corrected.title(), "What you see after correction");
    assert_eq!(ViewKind::Normal.title(), "Normal person vision");
}

#[test]
fn zero_correction_matches_uncorrected() {
    let [u, k, _] = derive_views(-4.0, 0.0);
    assert_eq!(u, k);
    assert_eq!(u.direction, BlurDirection::BottomToTop);
    assert_eq!(u.max_blur, 4.0);
}

#[test]
fn vision_profile_follows_prescription_sign() {
    assert_eq!(VisionProfile::from_prescription(0.0), VisionProfile::Nearsighted);
    assert_eq!(VisionProfile::from_prescription(-2.0), VisionProfile::Nearsighted);
    assert_eq!(VisionProfile::from_prescription(1.5), VisionProfile::Farsighted);
    assert!(VisionProfile::Farsighted.description().contains("near objects"));
}

#[test]
fn nothing_renders_before_image_ready() {
    let mut o = orchestrator();
    o.set_prescription(-2.0).unwrap();
    o.set_correction(1.0).unwrap();

    assert!(!o.is_ready());
    assert_eq!(o.stats().passes, 0);
    assert_eq!(o.stats().skipped_not_ready, 2);
    for kind in ViewKind::ALL {
        assert!(o.view(kind).is_empty());
    }
    assert_eq!(o.params(ViewKind::Corrected).max_blur, 1.0);
}

#[test]
fn image_ready_renders_all_views_with_latest_inputs() {
    let img = gradient_image(12, 40);
    let mut o = orchestrator();
    o.set_prescription(3.0).unwrap();
    o.set_correction(-3.0).unwrap();
    o.image_ready(img.clone()).unwrap();

    let stats = o.stats();
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.views_rendered, 3);

    let normal = o.view(ViewKind::Normal);
    assert_eq!((normal.width, normal.height), (12, 40));
    assert_eq!(normal.data, *img.rgba8_premul);
    assert_eq!(o.view(ViewKind::Corrected), normal);
    assert_ne!(o.view(ViewKind::Uncorrected), normal);
}

#[test]
fn unchanged_input_does_not_rerender() {
    let mut o = orchestrator();
    o.image_ready(gradient_image(6, 20)).unwrap();
    o.set_prescription(0.0).unwrap();
    assert_eq!(o.stats().passes, 1);

    o.set_prescription(-1.5).unwrap();
    assert_eq!(o.stats().passes, 2);
    o.set_correction(0.75).unwrap();
    assert_eq!(o.stats().passes, 3);
}

#[test]
fn repeated_image_ready_is_ignored() {
    let first = gradient_image(6, 20);
    let mut o = orchestrator();
    o.image_ready(first.clone()).unwrap();
    o.image_ready(gradient_image(8, 8)).unwrap();

    assert_eq!(o.stats().passes, 1);
    assert_eq!(o.stats().duplicate_image_ready, 1);
    assert_eq!(o.view(ViewKind::Normal).width, 6);
}

#[test]
fn inputs_are_clamped_and_rejected_when_not_finite() {
    let mut o = orchestrator();
    o.set_prescription(25.0).unwrap();
    assert_eq!(o.prescription(), 10.0);
    assert!(o.set_correction(f64::NAN).is_err());
    assert_eq!(o.correction(), 0.0);
}

#[test]
fn observers_see_every_view_of_every_pass() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut o = orchestrator();
    o.subscribe(Box::new(Recorder {
        calls: calls.clone(),
    }));

    o.set_prescription(-1.0).unwrap();
    assert!(calls.borrow().is_empty());

    o.image_ready(gradient_image(5, 10)).unwrap();
    o.set_correction(2.0).unwrap();

    let calls = calls.borrow();
    assert_eq!(calls.len(), 6);
    let kinds: Vec<_> = calls.iter().map(|c| c.0).collect();
    assert_eq!(&kinds[..3], &ViewKind::ALL);
    let (_, params, w, h) = calls[4];
    assert_eq!((w, h), (5, 10));
    assert_eq!(params.max_blur, 1.0);
    assert_eq!(params.direction, BlurDirection::TopToBottom);
}

#[test]
fn threaded_config_matches_sequential_output() {
    let img = gradient_image(10, 30);

    let mut seq = orchestrator();
    seq.set_prescription(-2.5).unwrap();
    seq.image_ready(img.clone()).unwrap();

    let mut cfg = AcuityConfig::default();
    cfg.render.strategy = BandStrategy::Cropped;
    cfg.render.parallel = true;
    cfg.render.threads = Some(2);
    let mut par = ViewOrchestrator::from_config(&cfg).unwrap();
    par.set_prescription(-2.5).unwrap();
    par.image_ready(img).unwrap();

    for kind in ViewKind::ALL {
        assert_eq!(seq.view(kind), par.view(kind));
    }
}
