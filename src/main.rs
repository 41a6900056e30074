//! tonewood CLI: resonance peak reports for one recording or a whole batch.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tonewood::{
    run_batch, run_job, AnalysisJob, AnalysisSettings, BatchConfig, ConditionConfig,
    FailurePolicy, PeakSearch, SampleScale, SpectrumPlot, TextReport,
};

#[derive(Parser)]
#[command(name = "tonewood")]
#[command(version, about = "Acoustic spectrum peak analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single recording
    Analyze(AnalyzeArgs),

    /// Analyse every job listed in a TOML batch file
    Batch(BatchArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// WAV recording to analyse
    recording: PathBuf,

    /// Background noise recording to subtract
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Title for the report (defaults to the file name)
    #[arg(short, long)]
    label: Option<String>,

    /// Seconds to drop from the start of the recording
    #[arg(long, default_value_t = 0.0)]
    trim: f64,

    /// High-pass cutoff in Hz
    #[arg(long, default_value_t = 4000.0)]
    cutoff: f64,

    /// High-pass filter order
    #[arg(long, default_value_t = 5)]
    order: usize,

    /// Lowest frequency a peak may sit at, in Hz
    #[arg(long, default_value_t = 100.0)]
    min_peak: f64,

    /// Error bar as a fraction of the peak values
    #[arg(long, default_value_t = 0.05)]
    error_rate: f64,

    /// Reject peaks weaker than this fraction of the strongest bin (0 disables)
    #[arg(long, default_value_t = 1e-3)]
    noise_floor: f64,

    /// Scale integer PCM to [-1, 1) instead of keeping raw values
    #[arg(long)]
    normalize: bool,

    /// Open a plot window after printing the report
    #[arg(long)]
    plot: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// TOML batch file
    config: PathBuf,

    /// Stop at the first failing job instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Open a plot window after all jobs ran
    #[arg(long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze(args),
        Commands::Batch(args) => batch(args),
    }
}

fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let label = args.label.clone().unwrap_or_else(|| {
        args.recording
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.recording.display().to_string())
    });
    let settings = AnalysisSettings {
        scale: if args.normalize {
            SampleScale::FullScale
        } else {
            SampleScale::Raw
        },
        conditioning: ConditionConfig::default()
            .with_trim_start(args.trim)
            .with_highpass(args.cutoff, args.order),
        peak: PeakSearch::default()
            .with_min_peak_freq(args.min_peak)
            .with_error_rate(args.error_rate)
            .with_noise_floor_ratio(args.noise_floor),
    };

    let job = AnalysisJob::new(label, &args.recording);
    let analysis = run_job(&job, args.background.as_deref(), &settings)
        .with_context(|| format!("analysing {}", args.recording.display()))?;

    let mut text = TextReport::stdout();
    if args.plot {
        let mut plot = SpectrumPlot::new();
        analysis.report_to(&mut (&mut text, &mut plot))?;
        plot.show()?;
    } else {
        analysis.report_to(&mut text)?;
    }
    Ok(())
}

fn batch(args: BatchArgs) -> anyhow::Result<()> {
    let config = BatchConfig::load(&args.config)
        .with_context(|| format!("loading batch file {}", args.config.display()))?;
    if config.jobs.is_empty() {
        bail!("{} lists no jobs", args.config.display());
    }
    let policy = if args.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Skip
    };

    let mut text = TextReport::stdout();
    let mut plot = SpectrumPlot::new();
    let summary = if args.plot {
        run_batch(&config, policy, &mut (&mut text, &mut plot))?
    } else {
        run_batch(&config, policy, &mut text)?
    };

    if args.plot {
        plot.show()?;
    }
    for (label, err) in &summary.failed {
        eprintln!("{label}: {err}");
    }
    if !summary.is_success() {
        let failed = summary.failed.len();
        bail!("{failed} of {} jobs failed", config.jobs.len());
    }
    Ok(())
}
