// src/drivers/mod.rs
// Acquisition pipeline: line sources, ingest queue, decoding, ring buffers and framing.
pub mod buffer;
pub mod clock;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod sink;
pub mod source;
// Re-exports so callers do not need the module paths
pub use buffer::RingBuffer;
pub use clock::SyntheticClock;
pub use decoder::SampleDecoder;
pub use error::{DecodeError, ScopeError};
pub use pipeline::FramePipeline;
pub use queue::IngestQueue;
pub use sink::{Axis, DisplayScale, DisplaySink, Frame, FrameSeries, TimeWindow, Trace};
pub use source::{open_serial, LineSource, ManualSource, SimulatedSource};
