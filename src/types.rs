// src/types.rs
use serde::{Deserialize, Serialize};

/// Raw ADC code as sent by the device.
pub type AdcCode = u16;

// Line layout of the serial protocol
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// One bare integer per line.
    #[default]
    Single,
    /// Two `Received: <int>` lines per sample, channel 1 then channel 2.
    Dual,
}

impl ChannelMode {
    /// Number of raw lines that make up one record.
    pub fn lines_per_record(self) -> usize {
        match self {
            ChannelMode::Single => 1,
            ChannelMode::Dual => 2,
        }
    }
}

// Single-channel sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
}

/// Paired sample of both channels at one synthetic time slot.
///
/// The differential is derived on demand so it can never drift from the two
/// channel voltages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualSample {
    pub time: f64,
    pub voltage1: f64,
    pub voltage2: f64,
}

impl DualSample {
    pub fn new(time: f64, voltage1: f64, voltage2: f64) -> Self {
        Self {
            time,
            voltage1,
            voltage2,
        }
    }

    pub fn difference(&self) -> f64 {
        self.voltage1 - self.voltage2
    }
}

// Per-session decode counters shown in the status bar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub accepted: u64,
    pub malformed: u64,
    pub out_of_range: u64,
}

impl DecodeStats {
    pub fn dropped(&self) -> u64 {
        self.malformed + self.out_of_range
    }
}
