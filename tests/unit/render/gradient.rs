use super::*;

fn checker(width: u32, height: u32) -> SourceImage {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / 2 + y / 2) % 2 == 0 { 230 } else { 20 };
            rgba.extend_from_slice(&[v, 255 - v, (x * 7 % 256) as u8, 255]);
        }
    }
    SourceImage::from_rgba8(width, height, rgba).unwrap()
}

#[test]
fn bands_tile_the_full_height() {
    for height in (0..=64).chain([99, 100, 101, 719, 1080]) {
        let mut next = 0;
        for i in 0..STEPS {
            let rows = band_rows(i, height);
            assert_eq!(rows.start, next, "gap before band {i} at height {height}");
            assert!(rows.end >= rows.start);
            next = rows.end;
        }
        assert_eq!(next, height);
    }
}

#[test]
fn band_rows_match_floor_formula() {
    let rows: Vec<_> = (0..STEPS).map(|i| band_rows(i, 25)).collect();
    assert_eq!(rows[0], 0..2);
    assert_eq!(rows[1], 2..5);
    assert_eq!(rows[9], 22..25);
}

#[test]
fn band_blur_profiles_are_monotonic() {
    let max = 3.7;
    for i in 1..STEPS {
        assert!(
            band_blur(i, max, BlurDirection::BottomToTop)
                < band_blur(i - 1, max, BlurDirection::BottomToTop)
        );
        assert!(
            band_blur(i, max, BlurDirection::TopToBottom)
                > band_blur(i - 1, max, BlurDirection::TopToBottom)
        );
        assert_eq!(band_blur(i, max, BlurDirection::None), 0.0);
    }
    assert_eq!(band_blur(0, max, BlurDirection::BottomToTop), max);
    assert_eq!(band_blur(0, max, BlurDirection::TopToBottom), 0.0);
}

#[test]
fn top_to_bottom_100px_scenario() {
    let bands = plan_bands(100, 5.0, BlurDirection::TopToBottom);
    assert_eq!(bands.len(), STEPS as usize);
    assert_eq!(bands[0].rows, 0..10);
    assert_eq!(bands[0].blur, 0.0);
    assert_eq!(bands[9].rows, 90..100);
    assert!((bands[9].blur - 4.5).abs() < 1e-12);
}

#[test]
fn direction_boundary_is_closed_at_zero() {
    assert_eq!(BlurDirection::from_signed(0.0), BlurDirection::BottomToTop);
    assert_eq!(BlurDirection::from_signed(-0.0), BlurDirection::BottomToTop);
    assert_eq!(BlurDirection::from_signed(-0.01), BlurDirection::BottomToTop);
    assert_eq!(BlurDirection::from_signed(0.01), BlurDirection::TopToBottom);
    assert_eq!(split_signed(-4.0), (4.0, BlurDirection::BottomToTop));
    assert_eq!(split_signed(2.5), (2.5, BlurDirection::TopToBottom));
}

#[test]
fn missing_target_or_source_is_a_noop() {
    let src = checker(4, 4);
    let opts = GradientOpts::default();

    let out = render_gradient_blur(None, Some(&src), 2.0, BlurDirection::TopToBottom, &opts);
    assert_eq!(out.unwrap(), RenderOutcome::NotReady);

    let mut target = Surface::with_size(1, 1);
    target.data.fill(9);
    let out = render_gradient_blur(
        Some(&mut target),
        None,
        2.0,
        BlurDirection::TopToBottom,
        &opts,
    );
    assert_eq!(out.unwrap(), RenderOutcome::NotReady);
    assert_eq!(target.data, vec![9u8; 4]);
}

#[test]
fn negative_or_nan_blur_is_rejected() {
    let src = checker(4, 4);
    let mut target = Surface::new();
    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        let err = render_gradient_blur(
            Some(&mut target),
            Some(&src),
            bad,
            BlurDirection::BottomToTop,
            &GradientOpts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcuityError::Validation(_)));
    }
}

#[test]
fn zero_blur_or_no_direction_copies_source() {
    let src = checker(12, 20);
    let mut target = Surface::with_size(3, 3);
    target.data.fill(200);

    let out = render_gradient_blur(
        Some(&mut target),
        Some(&src),
        0.0,
        BlurDirection::TopToBottom,
        &GradientOpts::default(),
    )
    .unwrap();
    assert_eq!(out, RenderOutcome::Unblurred);
    assert_eq!((target.width, target.height), (12, 20));
    assert_eq!(target.data, *src.rgba8_premul);

    let out = render_gradient_blur(
        Some(&mut target),
        Some(&src),
        6.0,
        BlurDirection::None,
        &GradientOpts::default(),
    )
    .unwrap();
    assert_eq!(out, RenderOutcome::Unblurred);
    assert_eq!(target.data, *src.rgba8_premul);
}

#[test]
fn unblurred_band_keeps_source_rows() {
    let src = checker(16, 30);
    let mut target = Surface::new();
    render_gradient_blur(
        Some(&mut target),
        Some(&src),
        3.0,
        BlurDirection::TopToBottom,
        &GradientOpts::default(),
    )
    .unwrap();

    let first = band_rows(0, 30);
    let last = band_rows(STEPS - 1, 30);
    let stride = target.stride();
    let src_bytes = src.rgba8_premul.as_slice();
    assert_eq!(
        target.rows(first.clone()),
        &src_bytes[first.start as usize * stride..first.end as usize * stride]
    );
    assert_ne!(
        target.rows(last.clone()),
        &src_bytes[last.start as usize * stride..last.end as usize * stride]
    );
}

#[test]
fn blur_pass_counts_follow_strategy() {
    let src = checker(8, 40);
    let mut target = Surface::new();
    let mut passes = |strategy| {
        let opts = GradientOpts {
            strategy,
            parallel: false,
        };
        render_gradient_blur(
            Some(&mut target),
            Some(&src),
            2.0,
            BlurDirection::TopToBottom,
            &opts,
        )
        .unwrap()
    };

    assert_eq!(
        passes(BandStrategy::FullFrame),
        RenderOutcome::Blurred { blur_passes: 9 }
    );
    assert_eq!(
        passes(BandStrategy::PerRadius),
        RenderOutcome::Blurred { blur_passes: 9 }
    );
    assert_eq!(
        passes(BandStrategy::Cropped),
        RenderOutcome::Blurred { blur_passes: 9 }
    );
}

#[test]
fn short_images_leave_empty_bands_untouched() {
    let src = checker(5, 3);
    let mut target = Surface::new();
    let out = render_gradient_blur(
        Some(&mut target),
        Some(&src),
        1.0,
        BlurDirection::BottomToTop,
        &GradientOpts::default(),
    )
    .unwrap();
    assert_eq!((target.width, target.height), (5, 3));
    assert_eq!(out, RenderOutcome::Blurred { blur_passes: 3 });
}

#[test]
fn oversized_blur_is_rejected_without_touching_target() {
    let src = checker(6, 12);
    let mut target = Surface::with_size(2, 2);
    target.data.fill(42);
    for huge in [MAX_BLUR_SIGMA + 0.5, 1e8, 1e9] {
        let err = render_gradient_blur(
            Some(&mut target),
            Some(&src),
            huge,
            BlurDirection::BottomToTop,
            &GradientOpts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AcuityError::Validation(_)));
        assert_eq!((target.width, target.height), (2, 2));
        assert_eq!(target.data, vec![42u8; 16]);
    }
}

#[test]
fn maximum_blur_renders_identically_across_strategies() {
    let src = checker(5, 20);
    let render = |strategy| {
        let mut target = Surface::new();
        let opts = GradientOpts {
            strategy,
            parallel: false,
        };
        render_gradient_blur(
            Some(&mut target),
            Some(&src),
            MAX_BLUR_SIGMA,
            BlurDirection::TopToBottom,
            &opts,
        )
        .unwrap();
        target
    };

    let reference = render(BandStrategy::FullFrame);
    assert_eq!(render(BandStrategy::PerRadius), reference);
    assert_eq!(render(BandStrategy::Cropped), reference);
}
