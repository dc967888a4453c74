use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::ScopeError;
use crate::types::{AdcCode, ChannelMode};

/// Fixed linear calibration from ADC code to volts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Voltage represented by `adc_max`.
    pub full_scale_volts: f64,
    /// Largest valid ADC code; codes above it are dropped.
    pub adc_max: AdcCode,
    /// Subtracted from both channels in dual mode to recenter around 0 V.
    pub dual_offset_volts: f64,
}

impl Calibration {
    pub fn volts_per_code(&self) -> f64 {
        self.full_scale_volts / self.adc_max as f64
    }
}

impl Default for Calibration {
    fn default() -> Self {
        // 12-bit ADC on a 3.3 V reference.
        Self {
            full_scale_volts: 3.3,
            adc_max: 4095,
            dual_offset_volts: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub port: String,
    pub baud_rate: u32,
    pub timeout_ms: u64,
    pub mode: ChannelMode,
    /// Ring buffer capacity in samples.
    pub capacity: usize,
    /// Width of the visible time window.
    pub window_ms: f64,
    /// Period of the frame consumer.
    pub frame_interval_ms: u64,
    /// Synthetic clock quantum per accepted sample.
    pub sample_period_ms: f64,
    pub calibration: Calibration,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_owned(),
            baud_rate: 115_200,
            timeout_ms: 1_000,
            mode: ChannelMode::Single,
            capacity: 1_000,
            window_ms: 100.0,
            frame_interval_ms: 10,
            sample_period_ms: 1.0,
            calibration: Calibration::default(),
        }
    }
}

impl ScopeConfig {
    /// Reads a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ScopeError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ScopeError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
            .map_err(|e| ScopeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_json(text: &str) -> Result<Self, ScopeError> {
        serde_json::from_str(text).map_err(|e| ScopeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.capacity == 0 {
            return Err(ScopeError::InvalidCapacity);
        }
        if self.baud_rate == 0 {
            return Err(ScopeError::Config("baud rate must be greater than zero".into()));
        }
        if self.frame_interval_ms == 0 {
            return Err(ScopeError::Config(
                "frame interval must be greater than zero".into(),
            ));
        }
        if !(self.window_ms > 0.0) {
            return Err(ScopeError::Config("window width must be positive".into()));
        }
        if !(self.sample_period_ms > 0.0) {
            return Err(ScopeError::Config("sample period must be positive".into()));
        }
        if self.calibration.adc_max == 0 || !(self.calibration.full_scale_volts > 0.0) {
            return Err(ScopeError::Config(
                "calibration needs a positive full scale and adc_max".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(self.sample_period_ms / 1_000.0)
    }

    pub fn window_secs(&self) -> f64 {
        self.window_ms / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_firmware() {
        let config = ScopeConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.capacity, 1_000);
        assert!((config.window_secs() - 0.1).abs() < 1e-12);
        assert_eq!(config.frame_interval(), Duration::from_millis(10));
        assert_eq!(config.sample_period(), Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ScopeConfig::from_json(r#"{ "port": "COM4", "mode": "dual", "capacity": 64 }"#)
                .unwrap();
        assert_eq!(config.port, "COM4");
        assert_eq!(config.mode, ChannelMode::Dual);
        assert_eq!(config.capacity, 64);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.calibration, Calibration::default());
    }

    #[test]
    fn rejects_bad_values() {
        let zero_capacity = ScopeConfig {
            capacity: 0,
            ..ScopeConfig::default()
        };
        assert!(matches!(
            zero_capacity.validate(),
            Err(ScopeError::InvalidCapacity)
        ));
        let no_window = ScopeConfig {
            window_ms: 0.0,
            ..ScopeConfig::default()
        };
        assert!(matches!(no_window.validate(), Err(ScopeError::Config(_))));
        assert!(ScopeConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn volts_per_code_spans_reference() {
        let cal = Calibration::default();
        assert!((cal.volts_per_code() * 4095.0 - 3.3).abs() < 1e-12);
    }
}
