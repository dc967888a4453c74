// src/gui.rs
use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{HLine, Legend, Line, LineStyle, Plot, PlotBounds, PlotPoints};

use crate::drivers::{Axis, DisplaySink, Frame, TimeWindow, Trace};
use crate::engine::Session;
use crate::types::{ChannelMode, DecodeStats};

// Per-click knob factors for V/div and T/div
const DIV_UP: f64 = 1.2;
const DIV_DOWN: f64 = 0.8;

// Trace colours, oscilloscope style
const TRACE_COLORS: [Color32; 3] = [Color32::GREEN, Color32::from_rgb(0, 255, 255), Color32::YELLOW];

/// Last frame converted to plot lines.
struct PlotView {
    window: TimeWindow,
    traces: Vec<Trace>,
    stats: DecodeStats,
}

impl DisplaySink for PlotView {
    fn redraw(&mut self, frame: &Frame) {
        self.window = frame.window;
        self.traces = frame.series.traces();
        self.stats = frame.stats;
    }
}

// Button presses collected during layout, applied afterwards
enum Control {
    TogglePause,
    Scale(Axis, f64),
}

pub struct ScopeApp {
    session: Session,
    view: PlotView,
    source_label: String,
    frame_interval: Duration,
    last_tick: Instant,
}

impl ScopeApp {
    pub fn new(session: Session, source_label: String, frame_interval: Duration) -> Self {
        let frame = session.frame();
        let view = PlotView {
            window: frame.window,
            traces: frame.series.traces(),
            stats: frame.stats,
        };
        Self {
            session,
            view,
            source_label,
            frame_interval,
            last_tick: Instant::now(),
        }
    }

    fn title(&self) -> &'static str {
        match self.session.mode() {
            ChannelMode::Single => "Live Oscilloscope - Single Signal (0V to 3.3V)",
            ChannelMode::Dual => "Live Oscilloscope - Signal 1, Signal 2 and Difference",
        }
    }

    fn controls(&self, ui: &mut egui::Ui, pending: &mut Vec<Control>) {
        ui.add_space(10.0);
        let pause_txt = if self.session.is_paused() { "Resume" } else { "Pause" };
        let buttons = [
            (pause_txt, Control::TogglePause),
            ("+V/div", Control::Scale(Axis::Voltage, DIV_UP)),
            ("-V/div", Control::Scale(Axis::Voltage, DIV_DOWN)),
            ("+T/div", Control::Scale(Axis::Time, DIV_UP)),
            ("-T/div", Control::Scale(Axis::Time, DIV_DOWN)),
        ];
        for (label, control) in buttons {
            let button = egui::Button::new(RichText::new(label).color(Color32::BLACK))
                .fill(Color32::GREEN)
                .min_size(egui::vec2(90.0, 28.0));
            if ui.add(button).clicked() {
                pending.push(control);
            }
            ui.add_space(4.0);
        }
    }

    fn status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Source: {}", self.source_label));
            ui.separator();
            ui.label(format!(
                "accepted {} | dropped {} (malformed {}, out of range {})",
                self.view.stats.accepted,
                self.view.stats.dropped(),
                self.view.stats.malformed,
                self.view.stats.out_of_range
            ));
            ui.separator();
            ui.label(format!(
                "window {:.0} ms | buffered {} | queued {}",
                self.session.window_width() * 1000.0,
                self.session.buffered(),
                self.session.queued_lines()
            ));
            if !self.session.reader_running() {
                ui.separator();
                ui.label(RichText::new("source stopped").color(Color32::RED));
            }
            if self.session.is_paused() {
                ui.separator();
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            }
        });
    }

    fn plots(&self, ui: &mut egui::Ui) {
        let ranges = &self.session.display_scale().y_ranges;
        let count = self.view.traces.len().max(1);
        let height = (ui.available_height() / count as f32 - 8.0).max(80.0);
        // A single sample gives a zero-width window; keep the axis usable.
        let lower = self.view.window.lower;
        let upper = self.view.window.upper.max(lower + 1e-3);
        for (idx, trace) in self.view.traces.iter().enumerate() {
            let (y_min, y_max) = ranges.get(idx).copied().unwrap_or((-1.0, 1.0));
            let color = TRACE_COLORS[idx % TRACE_COLORS.len()];
            let points = PlotPoints::new(trace.points.clone());
            let is_last = idx + 1 == self.view.traces.len();
            let plot = Plot::new(format!("trace-{idx}"))
                .height(height)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .legend(Legend::default())
                .y_axis_label(format!("{} (V)", trace.label));
            let plot = if is_last { plot.x_axis_label("Time (s)") } else { plot };
            plot.show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([lower, y_min], [upper, y_max]));
                plot_ui.hline(
                    HLine::new(0.0)
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_loose()),
                );
                plot_ui.line(Line::new(points).color(color).name(trace.label));
            });
        }
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. Frame consumer on the UI thread
        if self.last_tick.elapsed() >= self.frame_interval {
            self.last_tick = Instant::now();
            self.view.redraw(self.session.tick());
        }

        // 2. Layout
        ctx.set_visuals(egui::Visuals::dark());
        let mut pending = Vec::new();
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.heading(self.title());
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status(ui));
        egui::SidePanel::right("controls")
            .resizable(false)
            .min_width(110.0)
            .show(ctx, |ui| self.controls(ui, &mut pending));
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::BLACK))
            .show(ctx, |ui| self.plots(ui));

        // 3. Controls; a time rescale moves the window even while paused
        let changed = !pending.is_empty();
        for control in pending {
            match control {
                Control::TogglePause => {
                    self.session.toggle_pause();
                }
                Control::Scale(axis, factor) => self.session.scale(axis, factor),
            }
        }
        if changed {
            self.view.redraw(self.session.frame());
        }

        ctx.request_repaint_after(self.frame_interval);
    }
}
