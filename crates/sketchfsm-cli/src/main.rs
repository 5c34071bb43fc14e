//! sketchfsm CLI — extract state-machine graphs from photos of hand-drawn
//! diagrams.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sketchfsm::{ExtractConfig, Extractor, RenderStyle, Viewport, render};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sketchfsm")]
#[command(about = "Extract a finite-automaton graph from a photo of a hand-drawn diagram")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the automaton from an image.
    Detect(CliDetectArgs),
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the input photograph.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the extraction report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional path to render the extracted graph (PNG).
    #[arg(long)]
    render: Option<PathBuf>,

    /// Viewport width for rendering (pixels).
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height for rendering (pixels).
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// Minimum circle search radius (pixels).
    #[arg(long, default_value = "30.0")]
    circle_r_min: f32,

    /// Maximum circle search radius (pixels).
    #[arg(long, default_value = "70.0")]
    circle_r_max: f32,

    /// Minimum accumulator votes for an accepted circle center.
    #[arg(long, default_value = "40.0")]
    circle_votes: f32,

    /// Minimum accumulator votes for a candidate line.
    #[arg(long, default_value = "50")]
    line_votes: u32,

    /// Minimum accepted stroke length (pixels).
    #[arg(long, default_value = "50.0")]
    min_line_length: f32,

    /// Maximum gap tolerated inside one stroke (pixels).
    #[arg(long, default_value = "10.0")]
    max_line_gap: f32,

    /// Skip node labels even when a system font is available.
    #[arg(long)]
    no_labels: bool,
}

impl CliDetectArgs {
    fn to_config(&self) -> ExtractConfig {
        let mut config = ExtractConfig::default();
        config.circles.r_min = self.circle_r_min;
        config.circles.r_max = self.circle_r_max;
        config.circles.vote_threshold = self.circle_votes;
        config.segments.vote_threshold = self.line_votes;
        config.segments.min_length = self.min_line_length;
        config.segments.max_gap = self.max_line_gap;
        config
    }
}

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    let extractor = Extractor::with_config(args.to_config());
    let result = extractor.extract_file(&args.image)?;

    println!(
        "detected {} states, {} transitions",
        result.automaton.nodes().len(),
        result.automaton.transitions().len()
    );

    let report = serde_json::to_string_pretty(&result)?;
    std::fs::write(&args.out, report)?;
    println!("report written to {}", args.out.display());

    if let Some(path) = &args.render {
        let style = if args.no_labels {
            RenderStyle::default()
        } else {
            RenderStyle::with_system_font()
        };
        let viewport = Viewport::new(args.viewport_width, args.viewport_height);
        let canvas = render(&result.automaton, viewport, &style);
        canvas.save(path)?;
        println!("rendering written to {}", path.display());
    }

    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
    }
}
