// src/engine.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use log::{error, info, trace, warn};

use crate::config::ScopeConfig;
use crate::drivers::{
    Axis, DisplayScale, Frame, FramePipeline, IngestQueue, LineSource, ScopeError,
};
use crate::types::{ChannelMode, DecodeStats};

struct ReaderHandle {
    cancel: Arc<AtomicBool>,
    // The thread hands the source back so the connection is closed here, after the join.
    handle: JoinHandle<Box<dyn LineSource>>,
}

/// One acquisition run: owns the ingest queue, the reader thread and the
/// frame pipeline (buffers, clock, pause flag).
pub struct Session {
    queue: IngestQueue,
    pipeline: FramePipeline,
    scale: DisplayScale,
    reader: Option<ReaderHandle>,
}

impl Session {
    /// Builds the pipeline, then starts reading from `source` on a background thread.
    pub fn start(source: Box<dyn LineSource>, config: &ScopeConfig) -> Result<Self, ScopeError> {
        let pipeline = FramePipeline::new(config)?;
        let queue = IngestQueue::new();
        let cancel = Arc::new(AtomicBool::new(false));
        let tx = queue.sender();
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("line-reader".into())
            .spawn(move || run_reader(source, tx, flag))
            .map_err(ScopeError::Spawn)?;
        Ok(Self {
            queue,
            pipeline,
            scale: DisplayScale::for_mode(config.mode),
            reader: Some(ReaderHandle { cancel, handle }),
        })
    }

    /// Frame consumer entry point, called once per frame interval.
    pub fn tick(&mut self) -> &Frame {
        self.pipeline.tick(&self.queue)
    }

    pub fn frame(&self) -> &Frame {
        self.pipeline.last_frame()
    }

    pub fn mode(&self) -> ChannelMode {
        self.pipeline.mode()
    }

    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.pipeline.toggle_pause();
        info!("{}", if paused { "paused" } else { "resumed" });
        paused
    }

    pub fn is_paused(&self) -> bool {
        self.pipeline.is_paused()
    }

    pub fn scale(&mut self, axis: Axis, factor: f64) {
        match axis {
            Axis::Voltage => self.scale.scale_voltage(factor),
            Axis::Time => self.pipeline.scale_window(factor),
        }
    }

    pub fn display_scale(&self) -> &DisplayScale {
        &self.scale
    }

    pub fn stats(&self) -> DecodeStats {
        self.pipeline.stats()
    }

    /// Current trailing window width in seconds.
    pub fn window_width(&self) -> f64 {
        self.pipeline.window_width()
    }

    pub fn buffered(&self) -> usize {
        self.pipeline.buffered()
    }

    pub fn queued_lines(&self) -> usize {
        self.queue.len()
    }

    pub fn reader_running(&self) -> bool {
        self.reader
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    /// True once no further samples can arrive: the reader has ended and too
    /// few lines remain for another record.
    pub fn exhausted(&self) -> bool {
        !self.reader_running() && self.queue.len() < self.mode().lines_per_record()
    }

    /// Stops the reader, waits for it, then releases the connection. Safe to
    /// call more than once; only the first call does anything.
    pub fn shutdown(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        reader.cancel.store(true, Ordering::Relaxed);
        match reader.handle.join() {
            Ok(source) => {
                info!("closing {}", source.name());
                drop(source);
            }
            Err(_) => error!("reader thread panicked"),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Reader loop: bridges the blocking source to the queue until the source
/// fails or closes, or cancellation is requested.
fn run_reader(
    mut source: Box<dyn LineSource>,
    tx: Sender<String>,
    cancel: Arc<AtomicBool>,
) -> Box<dyn LineSource> {
    info!("reading from {}", source.name());
    while !cancel.load(Ordering::Relaxed) {
        match source.read_line() {
            Ok(Some(line)) if !line.is_empty() => {
                trace!("queued {line:?}");
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(ScopeError::SourceClosed) => {
                warn!("{} closed", source.name());
                break;
            }
            Err(err) => {
                error!("{}: {err}", source.name());
                break;
            }
        }
    }
    info!("reader for {} stopped", source.name());
    source
}
