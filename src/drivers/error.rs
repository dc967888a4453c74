use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("failed to open serial port {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("line source closed")]
    SourceClosed,
    #[error("failed to spawn reader thread: {0}")]
    Spawn(std::io::Error),
    #[error("ring buffer capacity must be greater than zero")]
    InvalidCapacity,
    #[error("invalid configuration: {0}")]
    Config(String),
}
/// Line-level decode failure. Always recoverable: the line (or pair) is dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not an integer: {0:?}")]
    Malformed(String),
    #[error("ADC code {code} outside 0..={max}")]
    OutOfRange { code: i64, max: u16 },
    #[error("missing \": \" separator in {0:?}")]
    MissingSeparator(String),
}
