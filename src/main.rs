use std::path::{Path, PathBuf};

use acuity_blur_rs::image_pipeline::{
    BlurConfig, BlurPipeline, DisplayGeometry, FilterMode, FoveationConfig, OutputFormat,
    StandardImageReader, StandardImageWriter, TiffCompression,
};
use acuity_blur_rs::logger;
use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "acuity-blur", version, about = "Blur images to a visual acuity limit")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Low-pass filter one image at a cycles-per-degree cutoff.
    Filter(FilterArgs),
    /// Write a progressive-blur stack ending at the cutoff.
    Batch(BatchArgs),
    /// Composite a blur stack around a fixation point.
    Foveate(FoveateArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Cutoff in cycles per degree of visual angle.
    cycles_per_degree: f64,
    /// Source image.
    source: PathBuf,
    /// Destination file, or a directory to place the result in.
    destination: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    cycles_per_degree: f64,
    source: PathBuf,
    /// Directory for the stack; created if missing.
    dest_dir: PathBuf,

    /// Levels before the target cutoff.
    #[arg(long, default_value_t = 7)]
    samples: usize,

    /// Output format. Defaults to the source's format, or PNG.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct FoveateArgs {
    cycles_per_degree: f64,
    source: PathBuf,
    destination: PathBuf,

    /// Fixation point in pixels, as X,Y.
    #[arg(long, value_parser = parse_point)]
    at: (usize, usize),

    /// Radius in pixels of the outermost sharp ring.
    #[arg(long, default_value_t = 300)]
    radius: usize,

    /// Width in pixels of each blur ring.
    #[arg(long, default_value_t = 2)]
    ring_step: usize,

    #[arg(long, default_value_t = 7)]
    samples: usize,

    #[command(flatten)]
    common: CommonArgs,
}

/// Display geometry and execution flags shared by every subcommand.
#[derive(Args, Debug)]
struct CommonArgs {
    /// Display resolution in pixels, as WxH.
    #[arg(long, value_parser = parse_resolution, default_value = "1024x768")]
    resolution: (u32, u32),

    /// Physical display size, as WxH, in the same unit as the viewing distance.
    #[arg(long, value_parser = parse_size, default_value = "36x27")]
    display_size: (f64, f64),

    #[arg(long, default_value_t = 61.0)]
    viewing_distance: f64,

    /// Filter colour channels concurrently.
    #[arg(short, long)]
    concurrent: bool,

    /// Worker threads for concurrent filtering.
    #[arg(long)]
    threads: Option<usize>,

    /// Fail instead of filtering sequentially when concurrency is unavailable.
    #[arg(long)]
    no_fallback: bool,

    /// Compression for TIFF output.
    #[arg(long, value_enum, default_value_t = CompressionChoice::None)]
    compression: CompressionChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompressionChoice {
    None,
    Lzw,
    Deflate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
}

impl From<CompressionChoice> for TiffCompression {
    fn from(choice: CompressionChoice) -> Self {
        match choice {
            CompressionChoice::None => TiffCompression::None,
            CompressionChoice::Lzw => TiffCompression::Lzw,
            CompressionChoice::Deflate => TiffCompression::Deflate,
        }
    }
}

impl From<FormatChoice> for OutputFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Png => OutputFormat::Png,
            FormatChoice::Jpeg => OutputFormat::Jpeg,
            FormatChoice::Bmp => OutputFormat::Bmp,
            FormatChoice::Gif => OutputFormat::Gif,
            FormatChoice::Tiff => OutputFormat::Tiff,
        }
    }
}

impl CommonArgs {
    fn config(&self) -> BlurConfig {
        let mode = if self.concurrent {
            FilterMode::Parallel
        } else {
            FilterMode::Sequential
        };
        BlurConfig::builder()
            .geometry(DisplayGeometry::new(
                self.resolution,
                self.display_size,
                self.viewing_distance,
            ))
            .mode(mode)
            .threads(self.threads)
            .allow_fallback(!self.no_fallback)
            .compression(self.compression.into())
            .build()
    }
}

fn parse_pair<T: std::str::FromStr>(s: &str, sep: char) -> Result<(T, T), String> {
    let (a, b) = s
        .split_once(sep)
        .ok_or_else(|| format!("expected two values separated by '{sep}', got '{s}'"))?;
    let a = a.trim().parse().map_err(|_| format!("invalid value '{a}'"))?;
    let b = b.trim().parse().map_err(|_| format!("invalid value '{b}'"))?;
    Ok((a, b))
}

fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    parse_pair(&s.to_ascii_lowercase(), 'x')
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    parse_pair(&s.to_ascii_lowercase(), 'x')
}

fn parse_point(s: &str) -> Result<(usize, usize), String> {
    parse_pair(s, ',')
}

/// An existing directory, or a path with no extension, receives the source's
/// file name; the directory is created when missing.
fn resolve_destination(source: &Path, destination: &Path) -> anyhow::Result<PathBuf> {
    if !destination.is_dir() && destination.extension().is_some() {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        return Ok(destination.to_path_buf());
    }

    std::fs::create_dir_all(destination)
        .with_context(|| format!("create output dir '{}'", destination.display()))?;
    let file_name = source
        .file_name()
        .with_context(|| format!("source '{}' has no file name", source.display()))?;
    Ok(destination.join(file_name))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(logger::level_for_verbosity(cli.verbose));

    match cli.cmd {
        Command::Filter(args) => cmd_filter(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Foveate(args) => cmd_foveate(args),
    }
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let destination = resolve_destination(&args.source, &args.destination)?;
    let config = args.common.config();
    let pipeline = BlurPipeline::for_output(&destination, config)
        .with_context(|| format!("choose encoder for '{}'", destination.display()))?;

    info!("Mode: {}", pipeline.config().mode);
    let timings = pipeline
        .blur_file(&args.source, args.cycles_per_degree, &destination)
        .with_context(|| format!("blur '{}'", args.source.display()))?;
    timings.log_summary();

    info!("Saved {}", destination.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let format = match args.format {
        Some(choice) => choice.into(),
        None => OutputFormat::from_path(&args.source).unwrap_or(OutputFormat::Png),
    };
    let pipeline = BlurPipeline::with_custom(
        StandardImageReader::default(),
        StandardImageWriter::new(format),
        args.common.config(),
    );

    let written = pipeline
        .batch_to_dir(&args.source, args.cycles_per_degree, args.samples, &args.dest_dir)
        .with_context(|| format!("batch '{}'", args.source.display()))?;

    info!("Wrote {} images to {}", written.len(), args.dest_dir.display());
    Ok(())
}

fn cmd_foveate(args: FoveateArgs) -> anyhow::Result<()> {
    let destination = resolve_destination(&args.source, &args.destination)?;
    let mut config = args.common.config();
    config.foveation = FoveationConfig {
        window_radius: args.radius,
        ring_step: args.ring_step,
    };
    let pipeline = BlurPipeline::for_output(&destination, config)
        .with_context(|| format!("choose encoder for '{}'", destination.display()))?;

    pipeline
        .foveate_file(
            &args.source,
            args.cycles_per_degree,
            args.samples,
            args.at,
            &destination,
        )
        .with_context(|| format!("foveate '{}'", args.source.display()))?;

    info!("Saved {}", destination.display());
    Ok(())
}
