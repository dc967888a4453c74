use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::io::{self, BufRead, BufReader};
use std::thread;
use std::time::{Duration, Instant};
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serialport::SerialPort;
use crate::config::Calibration;
use crate::drivers::ScopeError;
use crate::types::ChannelMode;
/// Blocking, line-oriented input.
///
/// `Ok(None)` means the read timed out without a complete line; the caller
/// simply tries again. End of stream is reported as [`ScopeError::SourceClosed`].
pub trait LineSource: Send {
    fn read_line(&mut self) -> Result<Option<String>, ScopeError>;
    fn name(&self) -> &str;
}
/// Splits any buffered byte stream into trimmed text lines.
///
/// Bytes read before a timeout are kept and completed on the next call, so a
/// line straddling the read timeout is never split in two.
pub struct LineReader<R> {
    name: String,
    reader: R,
    pending: Vec<u8>,
}
impl<R: BufRead + Send> LineReader<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            pending: Vec::with_capacity(64),
        }
    }
    fn take_line(&mut self) -> Option<String> {
        match String::from_utf8(std::mem::take(&mut self.pending)) {
            Ok(text) => Some(text.trim().to_owned()),
            Err(err) => {
                warn!("{}: dropping line that is not UTF-8: {err}", self.name);
                None
            }
        }
    }
}
impl<R: BufRead + Send> LineSource for LineReader<R> {
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => Err(ScopeError::SourceClosed),
            // Either a full line or the unterminated tail before EOF.
            Ok(_) => Ok(self.take_line()),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(ScopeError::Read(err)),
        }
    }
    fn name(&self) -> &str {
        &self.name
    }
}
pub type SerialLineSource = LineReader<BufReader<Box<dyn SerialPort>>>;
/// Opens the serial device. Failure here is fatal for the session.
pub fn open_serial(
    port_name: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<SerialLineSource, ScopeError> {
    let port = serialport::new(port_name, baud_rate)
        .timeout(timeout)
        .open()
        .map_err(|source| ScopeError::Connection {
            port: port_name.to_owned(),
            source,
        })?;
    info!("serial port {port_name} opened at {baud_rate} baud");
    Ok(LineReader::new(port_name, BufReader::new(port)))
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    lines: VecDeque<String>,
    failure: Option<io::ErrorKind>,
}
impl ManualSource {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }
    /// Fail with an I/O error instead of closing once the lines run out.
    pub fn then_fail(mut self, kind: io::ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }
}
impl LineSource for ManualSource {
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        match self.failure {
            Some(kind) => Err(ScopeError::Read(io::Error::new(kind, "scripted failure"))),
            None => Err(ScopeError::SourceClosed),
        }
    }
    fn name(&self) -> &str {
        "manual"
    }
}
/// Synthetic device speaking the same line protocol as the firmware.
///
/// Channel 1 is a 50 Hz sine, channel 2 a 20 Hz sine, both with a little
/// noise. Output is paced at one sample per `period`.
pub struct SimulatedSource {
    mode: ChannelMode,
    adc_max: f64,
    period: Duration,
    next_due: Instant,
    time_secs: f64,
    queued_second: Option<String>,
    rng: StdRng,
}
impl SimulatedSource {
    pub fn new(mode: ChannelMode, calibration: Calibration, period: Duration) -> Self {
        Self::with_rng(mode, calibration, period, StdRng::from_entropy())
    }
    pub fn with_seed(
        mode: ChannelMode,
        calibration: Calibration,
        period: Duration,
        seed: u64,
    ) -> Self {
        Self::with_rng(mode, calibration, period, StdRng::seed_from_u64(seed))
    }
    fn with_rng(mode: ChannelMode, calibration: Calibration, period: Duration, rng: StdRng) -> Self {
        Self {
            mode,
            adc_max: calibration.adc_max as f64,
            period,
            next_due: Instant::now(),
            time_secs: 0.0,
            queued_second: None,
            rng,
        }
    }
    fn code(&mut self, freq_hz: f64, amplitude: f64) -> u32 {
        let mid = self.adc_max / 2.0;
        let noise = self.rng.gen_range(-0.01..0.01) * self.adc_max;
        let value = mid + amplitude * mid * (TAU * freq_hz * self.time_secs).sin() + noise;
        value.round().clamp(0.0, self.adc_max) as u32
    }
    fn pace(&mut self) {
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        self.next_due += self.period;
        self.time_secs += self.period.as_secs_f64();
    }
}
impl LineSource for SimulatedSource {
    fn read_line(&mut self) -> Result<Option<String>, ScopeError> {
        if let Some(second) = self.queued_second.take() {
            return Ok(Some(second));
        }
        self.pace();
        let line = match self.mode {
            ChannelMode::Single => self.code(50.0, 0.8).to_string(),
            ChannelMode::Dual => {
                let first = self.code(50.0, 0.5);
                let second = self.code(20.0, 0.3);
                self.queued_second = Some(format!("Received: {second}"));
                format!("Received: {first}")
            }
        };
        Ok(Some(line))
    }
    fn name(&self) -> &str {
        "simulator"
    }
}
