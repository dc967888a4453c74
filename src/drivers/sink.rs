use crate::types::{ChannelMode, DecodeStats, DualSample, Sample};
/// Visible span of the time axis, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub lower: f64,
    pub upper: f64,
}
impl TimeWindow {
    /// Window ending at the newest sample: `[max(0, latest - width), latest]`.
    /// Without data the window starts at zero.
    pub fn trailing(latest: Option<f64>, width: f64) -> Self {
        match latest {
            Some(latest) => Self {
                lower: (latest - width).max(0.0),
                upper: latest,
            },
            None => Self {
                lower: 0.0,
                upper: width,
            },
        }
    }
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}
/// Ordered copy of the ring buffer contents at frame time.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameSeries {
    Single(Vec<Sample>),
    Dual(Vec<DualSample>),
}
impl FrameSeries {
    pub fn len(&self) -> usize {
        match self {
            FrameSeries::Single(s) => s.len(),
            FrameSeries::Dual(s) => s.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn latest_time(&self) -> Option<f64> {
        match self {
            FrameSeries::Single(s) => s.last().map(|s| s.time),
            FrameSeries::Dual(s) => s.last().map(|s| s.time),
        }
    }
    /// Plot-ready `[time, volts]` polylines, one per displayed trace.
    pub fn traces(&self) -> Vec<Trace> {
        match self {
            FrameSeries::Single(samples) => vec![Trace {
                label: "Signal",
                points: samples.iter().map(|s| [s.time, s.voltage]).collect(),
            }],
            FrameSeries::Dual(samples) => vec![
                Trace {
                    label: "Signal 1",
                    points: samples.iter().map(|s| [s.time, s.voltage1]).collect(),
                },
                Trace {
                    label: "Signal 2",
                    points: samples.iter().map(|s| [s.time, s.voltage2]).collect(),
                },
                Trace {
                    label: "Difference",
                    points: samples.iter().map(|s| [s.time, s.difference()]).collect(),
                },
            ],
        }
    }
}
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub label: &'static str,
    pub points: Vec<[f64; 2]>,
}
/// Everything a display needs to redraw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub window: TimeWindow,
    pub series: FrameSeries,
    pub stats: DecodeStats,
}
/// Passive consumer of frames (GUI plot, log reporter, test recorder).
pub trait DisplaySink {
    fn redraw(&mut self, frame: &Frame);
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Voltage,
    Time,
}
/// Vertical range of every plot, in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayScale {
    pub y_ranges: Vec<(f64, f64)>,
}
impl DisplayScale {
    pub fn for_mode(mode: ChannelMode) -> Self {
        let y_ranges = match mode {
            // 0 V .. 3.3 V signal with some headroom.
            ChannelMode::Single => vec![(-0.5, 3.8)],
            ChannelMode::Dual => vec![(-1.5, 1.5), (-1.5, 1.5), (-2.5, 2.5)],
        };
        Self { y_ranges }
    }
    /// Stretches every range about zero, like a V/div knob.
    pub fn scale_voltage(&mut self, factor: f64) {
        for (lo, hi) in &mut self.y_ranges {
            *lo *= factor;
            *hi *= factor;
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn window_clamps_at_zero() {
        let w = TimeWindow::trailing(Some(0.05), 0.1);
        assert_eq!(w.lower, 0.0);
        assert_eq!(w.upper, 0.05);
        let w = TimeWindow::trailing(Some(0.25), 0.1);
        assert!((w.lower - 0.15).abs() < 1e-12);
        assert!((w.width() - 0.1).abs() < 1e-12);
    }
    #[test]
    fn empty_window_starts_at_zero() {
        assert_eq!(
            TimeWindow::trailing(None, 0.1),
            TimeWindow {
                lower: 0.0,
                upper: 0.1
            }
        );
    }
    #[test]
    fn dual_series_yields_three_traces() {
        let series = FrameSeries::Dual(vec![
            DualSample::new(0.0, 1.0, 0.25),
            DualSample::new(0.001, -1.0, 0.5),
        ]);
        let traces = series.traces();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[2].label, "Difference");
        assert_eq!(traces[2].points, vec![[0.0, 0.75], [0.001, -1.5]]);
        assert_eq!(series.latest_time(), Some(0.001));
    }
    #[test]
    fn voltage_scale_stretches_all_plots() {
        let mut scale = DisplayScale::for_mode(ChannelMode::Dual);
        scale.scale_voltage(1.2);
        assert!((scale.y_ranges[2].1 - 3.0).abs() < 1e-12);
        assert!((scale.y_ranges[0].0 + 1.8).abs() < 1e-12);
    }
}
