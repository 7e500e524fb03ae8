use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nodefield::{FieldConfig, Pointer, RunSpec, SurfaceSize, Trace};

/// Headless runner for the nodefield particle animation.
#[derive(Parser)]
#[command(name = "nodefield")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the field without a display and print a summary
    Simulate {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run the field and write sampled node positions as JSON
    Trace {
        #[command(flatten)]
        run: RunArgs,

        /// Output trace file
        #[arg(short, long)]
        out: PathBuf,

        /// Sample every N frames
        #[arg(long, default_value = "100")]
        every: u64,
    },
    /// Replay a recorded trace and compare against it
    Check {
        /// Golden trace file written by `trace`
        #[arg(short, long)]
        golden: PathBuf,

        /// Largest allowed per-coordinate position difference
        #[arg(long, default_value = "0")]
        tolerance: f64,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// RNG seed for node placement
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of frames to run
    #[arg(long, default_value = "1000")]
    frames: u64,

    /// Surface width in pixels
    #[arg(long, default_value = "800")]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value = "600")]
    height: f64,

    /// Field config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hold the pointer at X,Y for the whole run
    #[arg(long, value_parser = parse_pointer)]
    pointer: Option<Pointer>,
}

impl RunArgs {
    fn to_spec(&self, every: u64) -> anyhow::Result<RunSpec> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => FieldConfig::default(),
        };
        Ok(RunSpec {
            seed: self.seed,
            frames: self.frames,
            every,
            surface: SurfaceSize::new(self.width, self.height),
            pointer: self.pointer,
            config,
        })
    }
}

fn parse_pointer(value: &str) -> Result<Pointer, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Pointer::new(x, y))
}

fn load_config(path: &Path) -> anyhow::Result<FieldConfig> {
    FieldConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(spec: &RunSpec) -> String {
    let mut in_bounds = true;
    let mut last_links = 0;
    let driver = spec.run(|driver, stats| {
        in_bounds &= driver.state().all_in_bounds();
        last_links = stats.links_drawn;
    });
    format!(
        "frames={} nodes={} links={} speed_sum={:.6} in_bounds={}",
        driver.frames(),
        driver.state().nodes.len(),
        last_links,
        driver.state().total_speed(),
        in_bounds
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate { run } => {
            let spec = run.to_spec(1)?;
            tracing::info!(seed = spec.seed, frames = spec.frames, "simulating");
            println!("{}", simulate(&spec));
        }
        Commands::Trace { run, out, every } => {
            let trace = run.to_spec(every)?.record();
            trace
                .save(&out)
                .with_context(|| format!("writing trace {}", out.display()))?;
            println!(
                "Wrote {} samples of {} frames to {}",
                trace.frames.len(),
                trace.run.frames,
                out.display()
            );
        }
        Commands::Check { golden, tolerance } => {
            let expected = Trace::load(&golden)
                .with_context(|| format!("reading trace {}", golden.display()))?;
            let actual = expected.replay();
            if let Some(divergence) = expected.compare(&actual, tolerance) {
                anyhow::bail!("trace {} diverged: {divergence}", golden.display());
            }
            println!(
                "Trace {} matches ({} samples)",
                golden.display(),
                expected.frames.len()
            );
        }
    }

    Ok(())
}
