use log::{debug, trace, warn};
use crate::config::ScopeConfig;
use crate::drivers::error::{DecodeError, ScopeError};
use crate::drivers::sink::{Frame, FrameSeries, TimeWindow};
use crate::drivers::{IngestQueue, RingBuffer, SampleDecoder, SyntheticClock};
use crate::types::{ChannelMode, DecodeStats, DualSample, Sample};
/// Frames a lone dual-mode line may wait for its partner before we warn.
const STRANDED_WARN_FRAMES: u32 = 100;
enum Traces {
    Single(RingBuffer<Sample>),
    Dual(RingBuffer<DualSample>),
}
impl Traces {
    fn latest_time(&self) -> Option<f64> {
        match self {
            Traces::Single(ring) => ring.last().map(|s| s.time),
            Traces::Dual(ring) => ring.last().map(|s| s.time),
        }
    }
    fn snapshot(&self) -> FrameSeries {
        match self {
            Traces::Single(ring) => FrameSeries::Single(ring.snapshot()),
            Traces::Dual(ring) => FrameSeries::Dual(ring.snapshot()),
        }
    }
    fn len(&self) -> usize {
        match self {
            Traces::Single(ring) => ring.len(),
            Traces::Dual(ring) => ring.len(),
        }
    }
}
/// Per-frame consumer: drains queued lines, decodes them into the ring
/// buffers and exposes a ready-to-plot frame.
///
/// Sole writer of the buffers and the synthetic clock.
pub struct FramePipeline {
    mode: ChannelMode,
    decoder: SampleDecoder,
    traces: Traces,
    clock: SyntheticClock,
    window_width: f64,
    paused: bool,
    stats: DecodeStats,
    last_frame: Frame,
    stranded_frames: u32,
}
impl FramePipeline {
    pub fn new(config: &ScopeConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        let traces = match config.mode {
            ChannelMode::Single => Traces::Single(RingBuffer::with_capacity(config.capacity)?),
            ChannelMode::Dual => Traces::Dual(RingBuffer::with_capacity(config.capacity)?),
        };
        let window_width = config.window_secs();
        let last_frame = Frame {
            window: TimeWindow::trailing(None, window_width),
            series: traces.snapshot(),
            stats: DecodeStats::default(),
        };
        Ok(Self {
            mode: config.mode,
            decoder: SampleDecoder::new(config.calibration),
            traces,
            clock: SyntheticClock::new(config.sample_period()),
            window_width,
            paused: false,
            stats: DecodeStats::default(),
            last_frame,
            stranded_frames: 0,
        })
    }
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
    pub fn window_width(&self) -> f64 {
        self.window_width
    }
    /// Multiplies the window width. The last frame's window is refreshed too
    /// so the change shows while paused.
    pub fn scale_window(&mut self, factor: f64) {
        if !(factor > 0.0) {
            return;
        }
        self.window_width *= factor;
        self.last_frame.window = TimeWindow::trailing(self.traces.latest_time(), self.window_width);
    }
    pub fn clock(&self) -> &SyntheticClock {
        &self.clock
    }
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }
    pub fn buffered(&self) -> usize {
        self.traces.len()
    }
    pub fn last_frame(&self) -> &Frame {
        &self.last_frame
    }
    /// One consumer invocation. While paused this is a no-op returning the
    /// previous frame.
    pub fn tick(&mut self, queue: &IngestQueue) -> &Frame {
        if self.paused {
            return &self.last_frame;
        }
        // Only what is queued now; lines arriving mid-drain wait for the next frame.
        let available = queue.len();
        match self.mode {
            ChannelMode::Single => {
                for _ in 0..available {
                    let Some(line) = queue.try_pop() else { break };
                    self.ingest_single(&line);
                }
            }
            ChannelMode::Dual => {
                for _ in 0..available / 2 {
                    let Some((first, second)) = queue.try_pop_pair() else { break };
                    self.ingest_pair(&first, &second);
                }
                self.watch_stranded(queue.len());
            }
        }
        self.last_frame = Frame {
            window: TimeWindow::trailing(self.traces.latest_time(), self.window_width),
            series: self.traces.snapshot(),
            stats: self.stats,
        };
        &self.last_frame
    }
    fn ingest_single(&mut self, line: &str) {
        trace!("line {line:?}");
        match self.decoder.decode_single(line) {
            Ok(voltage) => {
                let sample = Sample {
                    time: self.clock.now(),
                    voltage,
                };
                if let Traces::Single(ring) = &mut self.traces {
                    ring.append(sample);
                }
                self.accept();
            }
            Err(err) => self.reject(err),
        }
    }
    fn ingest_pair(&mut self, first: &str, second: &str) {
        trace!("pair {first:?}, {second:?}");
        match self.decoder.decode_pair(first, second) {
            Ok((voltage1, voltage2)) => {
                let sample = DualSample::new(self.clock.now(), voltage1, voltage2);
                if let Traces::Dual(ring) = &mut self.traces {
                    ring.append(sample);
                }
                self.accept();
            }
            Err(err) => self.reject(err),
        }
    }
    fn accept(&mut self) {
        self.clock.advance();
        self.stats.accepted += 1;
    }
    fn reject(&mut self, err: DecodeError) {
        match err {
            DecodeError::OutOfRange { .. } => {
                self.stats.out_of_range += 1;
                trace!("dropped: {err}");
            }
            _ => {
                self.stats.malformed += 1;
                debug!("dropped: {err}");
            }
        }
    }
    fn watch_stranded(&mut self, remaining: usize) {
        if remaining == 1 {
            self.stranded_frames = self.stranded_frames.saturating_add(1);
            if self.stranded_frames == STRANDED_WARN_FRAMES {
                warn!(
                    "one line has waited {STRANDED_WARN_FRAMES} frames for its pair; \
                     the channels may be out of step"
                );
            }
        } else {
            self.stranded_frames = 0;
        }
    }
}
