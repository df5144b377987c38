use std::time::{Duration, Instant};

use acuity::{BandStrategy, BlurDirection, GradientOpts, SourceImage, Surface};

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    max_blur: f64,
    warmup: u32,
    repeats: u32,
    parallel: bool,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if !args.max_blur.is_finite() || !(0.0..=acuity::MAX_BLUR_SIGMA).contains(&args.max_blur) {
        anyhow::bail!("--blur must be within 0..={}", acuity::MAX_BLUR_SIGMA);
    }
    if args.repeats == 0 {
        anyhow::bail!("--repeats must be >= 1");
    }

    let src = synthetic_image(args.width, args.height)?;
    eprintln!(
        "bench: {}x{} blur={} repeats={} mode={}",
        args.width,
        args.height,
        args.max_blur,
        args.repeats,
        if args.parallel { "parallel" } else { "sequential" }
    );

    let mut reference: Option<Surface> = None;
    for strategy in [
        BandStrategy::FullFrame,
        BandStrategy::PerRadius,
        BandStrategy::Cropped,
    ] {
        let opts = GradientOpts {
            strategy,
            parallel: args.parallel,
        };
        let mut target = Surface::new();
        for _ in 0..args.warmup {
            render_once(&mut target, &src, args.max_blur, &opts)?;
        }

        let mut runs = Vec::<Duration>::with_capacity(args.repeats as usize);
        for _ in 0..args.repeats {
            let t0 = Instant::now();
            render_once(&mut target, &src, args.max_blur, &opts)?;
            runs.push(t0.elapsed());
        }

        if let Some(r) = &reference
            && *r != target
        {
            anyhow::bail!("{strategy:?} output differs from full-frame reference");
        }
        if reference.is_none() {
            reference = Some(target.clone());
        }
        print_summary(strategy, &runs);
    }
    Ok(())
}

fn render_once(
    target: &mut Surface,
    src: &SourceImage,
    max_blur: f64,
    opts: &GradientOpts,
) -> anyhow::Result<()> {
    acuity::render_gradient_blur(
        Some(target),
        Some(src),
        max_blur,
        BlurDirection::BottomToTop,
        opts,
    )?;
    Ok(())
}

fn synthetic_image(width: u32, height: u32) -> anyhow::Result<SourceImage> {
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let check = if (x / 16 + y / 16) % 2 == 0 { 230 } else { 25 };
            rgba.extend_from_slice(&[check, (x % 256) as u8, (y % 256) as u8, 255]);
        }
    }
    Ok(SourceImage::from_rgba8(width, height, rgba)?)
}

fn print_summary(strategy: BandStrategy, runs: &[Duration]) {
    let mut sorted = runs.to_vec();
    sorted.sort();
    let total: Duration = runs.iter().sum();
    let mean = total / runs.len() as u32;
    let p50 = sorted[sorted.len() / 2];
    let max = sorted[sorted.len() - 1];
    println!(
        "{:<10} mean {:>9.3} ms  p50 {:>9.3} ms  max {:>9.3} ms",
        format!("{strategy:?}"),
        mean.as_secs_f64() * 1e3,
        p50.as_secs_f64() * 1e3,
        max.as_secs_f64() * 1e3
    );
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut out = BenchArgs {
        width: 640,
        height: 480,
        max_blur: 6.0,
        warmup: 1,
        repeats: 5,
        parallel: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_num(args.next(), "--width")?,
            "--height" => out.height = parse_num(args.next(), "--height")?,
            "--blur" => out.max_blur = parse_num(args.next(), "--blur")?,
            "--warmup" => out.warmup = parse_num(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_num(args.next(), "--repeats")?,
            "--parallel" => out.parallel = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }
    Ok(out)
}

fn print_help() {
    eprintln!(
        "\
acuity-bench: time gradient blur strategies on a synthetic image

Usage:
  cargo run -q -p acuity-bench -- --width 1280 --height 720 --blur 8
  cargo run -q -p acuity-bench -- --parallel

Flags:
  --width N     (default 640)
  --height N    (default 480)
  --blur X      max blur in px (default 6)
  --warmup N    (default 1)
  --repeats N   (default 5)
  --parallel    compute bands on the rayon pool
"
    );
}

fn parse_num<T: std::str::FromStr>(v: Option<String>, flag: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid value for {flag} '{v}': {e}"))
}
