//! Interactive spectrum plots.
//!
//! [`SpectrumPlot`] collects a figure per report and opens a single window
//! with one tab per figure once [`SpectrumPlot::show`] is called.

use eframe::egui;
use egui::plot::{Arrows, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};
use egui::{Align2, Color32};

use crate::error::{Error, Result};
use crate::peak::PeakResult;
use crate::report::ReportSink;

/// Frequency window plotted by default, in Hz.
pub const DEFAULT_DISPLAY_RANGE: (f64, f64) = (2000.0, 16000.0);

struct Figure {
    title: String,
    points: Vec<[f64; 2]>,
    peak: PeakResult,
}

pub struct SpectrumPlot {
    display_range: (f64, f64),
    figures: Vec<Figure>,
}

impl Default for SpectrumPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumPlot {
    pub fn new() -> Self {
        Self {
            display_range: DEFAULT_DISPLAY_RANGE,
            figures: Vec::new(),
        }
    }

    /// Only bins inside `[low, high]` Hz are drawn.
    pub fn with_display_range(mut self, low: f64, high: f64) -> Self {
        self.display_range = (low.min(high), low.max(high));
        self
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// Block until the plot window is closed.
    pub fn show(self) -> Result<()> {
        if self.figures.is_empty() {
            log::warn!("nothing to plot");
            return Ok(());
        }
        let options = eframe::NativeOptions {
            initial_window_size: Some(egui::vec2(900.0, 600.0)),
            ..Default::default()
        };
        eframe::run_native(
            "tonewood",
            options,
            Box::new(move |_cc| Box::new(PlotSpectrumApp::new(self.figures))),
        )
        .map_err(|e| Error::Plot(e.to_string()))
    }
}

impl ReportSink for SpectrumPlot {
    fn report(
        &mut self,
        label: &str,
        frequencies: &[f64],
        magnitudes: &[f64],
        peak: &PeakResult,
    ) -> Result<()> {
        let (low, high) = self.display_range;
        let mut points: Vec<[f64; 2]> = frequencies
            .iter()
            .zip(magnitudes)
            .filter(|(f, _)| (low..=high).contains(*f))
            .map(|(&f, &m)| [f, m])
            .collect();
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));

        self.figures.push(Figure {
            title: label.to_string(),
            points,
            peak: *peak,
        });
        Ok(())
    }
}

struct PlotSpectrumApp {
    figures: Vec<Figure>,
    selected: usize,
}

impl PlotSpectrumApp {
    fn new(figures: Vec<Figure>) -> Self {
        Self {
            figures,
            selected: 0,
        }
    }
}

impl eframe::App for PlotSpectrumApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("figures").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (i, figure) in self.figures.iter().enumerate() {
                    ui.selectable_value(&mut self.selected, i, figure.title.as_str());
                }
            });
        });

        let figure = &self.figures[self.selected];
        let peak = figure.peak;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(figure.title.as_str());
            ui.label("Frequency (Hz) against magnitude");
            Plot::new(("spectrum", self.selected))
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::new(figure.points.clone())).name("magnitude"),
                    );

                    let red = Color32::RED;
                    plot_ui.line(
                        Line::new(PlotPoints::new(vec![
                            [peak.frequency - peak.frequency_error, peak.magnitude],
                            [peak.frequency + peak.frequency_error, peak.magnitude],
                        ]))
                        .color(red),
                    );
                    plot_ui.line(
                        Line::new(PlotPoints::new(vec![
                            [peak.frequency, peak.magnitude - peak.magnitude_error],
                            [peak.frequency, peak.magnitude + peak.magnitude_error],
                        ]))
                        .color(red),
                    );
                    plot_ui.points(
                        Points::new(vec![[peak.frequency, peak.magnitude]])
                            .shape(MarkerShape::Circle)
                            .radius(4.)
                            .color(red)
                            .name("peak"),
                    );

                    let label_at = [peak.frequency + 1000.0, 0.7 * peak.magnitude];
                    plot_ui.arrows(Arrows::new(
                        vec![label_at],
                        vec![[peak.frequency, peak.magnitude]],
                    ));
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(label_at[0], label_at[1]),
                            format!(
                                "Peak: {:.2} ± {:.2} Hz\nMagnitude: {:.2} ± {:.2}",
                                peak.frequency,
                                peak.frequency_error,
                                peak.magnitude,
                                peak.magnitude_error
                            ),
                        )
                        .anchor(Align2::LEFT_TOP),
                    );
                });
        });
    }
}
