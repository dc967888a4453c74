// src/headless.rs
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::drivers::{DisplaySink, Frame, FrameSeries};
use crate::engine::Session;

/// Display stand-in that reports through the logger.
pub struct LogSink {
    frames: u64,
    report_every: u64,
}

impl LogSink {
    /// Reports roughly once per second of frames.
    pub fn new(frame_interval: Duration) -> Self {
        let per_second = Duration::from_secs(1).as_nanos() / frame_interval.as_nanos().max(1);
        Self {
            frames: 0,
            report_every: (per_second as u64).max(1),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplaySink for LogSink {
    fn redraw(&mut self, frame: &Frame) {
        self.frames += 1;
        if self.frames % self.report_every != 0 {
            return;
        }
        let window = format!("{:.3}..{:.3} s", frame.window.lower, frame.window.upper);
        match &frame.series {
            FrameSeries::Single(samples) => match samples.last() {
                Some(s) => info!("{window} | {} samples | last {:.3} V", samples.len(), s.voltage),
                None => info!("{window} | waiting for data"),
            },
            FrameSeries::Dual(samples) => match samples.last() {
                Some(s) => info!(
                    "{window} | {} samples | ch1 {:.3} V ch2 {:.3} V diff {:.3} V",
                    samples.len(),
                    s.voltage1,
                    s.voltage2,
                    s.difference()
                ),
                None => info!("{window} | waiting for data"),
            },
        }
        debug!(
            "accepted {} dropped {}",
            frame.stats.accepted,
            frame.stats.dropped()
        );
    }
}

/// Drives the frame consumer from a fixed-rate timer loop until `limit`
/// elapses or the source is exhausted.
pub fn run(
    mut session: Session,
    sink: &mut dyn DisplaySink,
    frame_interval: Duration,
    limit: Option<Duration>,
) {
    let started = Instant::now();
    let mut next = started;
    loop {
        sink.redraw(session.tick());
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            info!("run time limit reached");
            break;
        }
        if session.exhausted() {
            info!("source finished; {} samples accepted", session.stats().accepted);
            break;
        }
        next += frame_interval;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            next = now;
        }
    }
    session.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;
    use crate::drivers::ManualSource;

    struct Recorder(Vec<Frame>);
    impl DisplaySink for Recorder {
        fn redraw(&mut self, frame: &Frame) {
            self.0.push(frame.clone());
        }
    }

    #[test]
    fn runs_until_source_is_drained() {
        let lines: Vec<String> = (0..50).map(|i| (i * 80).to_string()).collect();
        let session =
            Session::start(Box::new(ManualSource::new(lines)), &ScopeConfig::default()).unwrap();
        let mut recorder = Recorder(Vec::new());
        run(
            session,
            &mut recorder,
            Duration::from_millis(1),
            Some(Duration::from_secs(5)),
        );
        let last = recorder.0.last().unwrap();
        assert_eq!(last.series.len(), 50);
        assert!((last.window.upper - 0.049).abs() < 1e-9);
    }

    #[test]
    fn log_sink_reports_once_per_second() {
        let sink = LogSink::new(Duration::from_millis(10));
        assert_eq!(sink.report_every, 100);
        assert_eq!(sink.frames(), 0);
    }
}
