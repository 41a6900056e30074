use tonewood::{run_batch, AnalysisJob, BatchConfig, FailurePolicy, SpectrumPlot, TextReport};

// cargo run -r --example plot-spectrum -- "Beech quarter (6).wav" "Background Final.wav"
fn main() -> anyhow::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let mut args = std::env::args().skip(1);
    let recording = args.next().unwrap_or_else(|| "sin440.wav".to_string());
    let background = args.next();

    let mut config = BatchConfig::new().with_job(AnalysisJob::new("Spectrum", &recording));
    if let Some(background) = background {
        config = config.with_background(background);
    }

    let mut text = TextReport::stdout();
    let mut plot = SpectrumPlot::new();
    run_batch(&config, FailurePolicy::Abort, &mut (&mut text, &mut plot))?;
    plot.show()?;
    Ok(())
}
