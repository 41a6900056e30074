use std::f64::consts::PI;

use smallvec::smallvec as svec;
use tonewood::{analyze, condition, find_peak, ConditionConfig, PeakSearch, ReportSink, TextReport};

// cargo run -r --example tone-report
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rate = 44100;
    let step = 2.0 * PI * 5000.0 / rate as f64;
    let tone: Vec<f64> = (0..rate).map(|i| (step * i as f64).sin()).collect();

    let conditioned = condition(svec![tone], rate, None, &ConditionConfig::default())?;
    let spectrum = analyze(conditioned, rate)?;
    let magnitudes = spectrum.magnitudes();

    let mut report = TextReport::stdout();
    for min_peak_freq in [100.0, 20000.0] {
        let search = PeakSearch::default().with_min_peak_freq(min_peak_freq);
        match find_peak(&spectrum, &search) {
            Ok(peak) => report.report("5 kHz tone", spectrum.frequencies(), &magnitudes, &peak)?,
            Err(err) => println!("min_peak_freq = {min_peak_freq} Hz: {err}"),
        }
    }
    Ok(())
}
