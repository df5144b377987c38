use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "acuity", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the uncorrected, corrected and normal views of an image as PNGs.
    Render(RenderArgs),
    /// Print the band partition and blur radii for a signed value.
    Bands(BandsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source image (PNG, JPEG, ...).
    #[arg(long)]
    image: PathBuf,

    /// Prescription in diopters; the sign selects the blur direction.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    prescription: f64,

    /// Correction in diopters, added to the prescription for the corrected view.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    correction: f64,

    /// Output directory for `uncorrected.png`, `corrected.png` and `normal.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Optional JSON config (control ranges, render strategy).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured band strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyChoice>,

    /// Compute bands in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel mode.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct BandsArgs {
    /// Image height in pixels.
    #[arg(long)]
    height: u32,

    /// Signed blur value (prescription or prescription + correction).
    #[arg(long, allow_negative_numbers = true)]
    blur: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    FullFrame,
    PerRadius,
    Cropped,
}

impl From<StrategyChoice> for acuity::BandStrategy {
    fn from(c: StrategyChoice) -> Self {
        match c {
            StrategyChoice::FullFrame => acuity::BandStrategy::FullFrame,
            StrategyChoice::PerRadius => acuity::BandStrategy::PerRadius,
            StrategyChoice::Cropped => acuity::BandStrategy::Cropped,
        }
    }
}

/// Prints a one-line summary of every rendered view.
struct ViewSummary;

impl acuity::ViewObserver for ViewSummary {
    fn on_view_rendered(
        &mut self,
        kind: acuity::ViewKind,
        params: acuity::ViewParams,
        surface: &acuity::Surface,
    ) {
        eprintln!(
            "  {:<30} blur {:>5.2}px  {:?}  ({}x{})",
            kind.title(),
            params.max_blur,
            params.direction,
            surface.width,
            surface.height
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Bands(args) => cmd_bands(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RenderArgs) -> anyhow::Result<acuity::AcuityConfig> {
    let mut cfg = match &args.config {
        Some(path) => acuity::AcuityConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => acuity::AcuityConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        cfg.render.strategy = strategy.into();
    }
    if args.parallel {
        cfg.render.parallel = true;
    }
    if args.threads.is_some() {
        cfg.render.threads = args.threads;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let mut views = acuity::ViewOrchestrator::from_config(&cfg)?;
    views.subscribe(Box::new(ViewSummary));

    views.set_prescription(args.prescription)?;
    views.set_correction(args.correction)?;
    eprintln!("{}", views.profile().description());

    let image = acuity::load_image(&args.image)
        .with_context(|| format!("load image '{}'", args.image.display()))?;
    views.image_ready(Arc::new(image))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for kind in acuity::ViewKind::ALL {
        let path = args.out_dir.join(format!("{}.png", kind.slug()));
        write_png(&path, views.view(kind))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_bands(args: BandsArgs) -> anyhow::Result<()> {
    if !args.blur.is_finite() || args.blur.abs() > acuity::MAX_BLUR_SIGMA {
        anyhow::bail!(
            "--blur must be finite and within ±{}",
            acuity::MAX_BLUR_SIGMA
        );
    }
    let (max_blur, direction) = acuity::split_signed(args.blur);
    println!("direction: {direction:?}  max blur: {max_blur:.2}px");
    for band in acuity::plan_bands(args.height, max_blur, direction) {
        println!(
            "band {:>2}  rows {:>5}..{:<5}  blur {:>6.3}px  kernel radius {}",
            band.index,
            band.rows.start,
            band.rows.end,
            band.blur,
            acuity::kernel_radius(band.blur)
        );
    }
    Ok(())
}

fn write_png(path: &Path, surface: &acuity::Surface) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &surface.to_straight_rgba8(),
        surface.width,
        surface.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
