use crate::config::Calibration;
use crate::drivers::DecodeError;
use crate::types::AdcCode;
/// Separator between the label and the value in dual-channel lines.
pub const PAIR_SEPARATOR: &str = ": ";
/// Turns raw protocol lines into calibrated voltages. Stateless.
#[derive(Clone, Copy, Debug)]
pub struct SampleDecoder {
    calibration: Calibration,
}
impl SampleDecoder {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }
    /// Single-channel line: a bare integer, converted without offset.
    pub fn decode_single(&self, line: &str) -> Result<f64, DecodeError> {
        let code = parse_code(line, self.calibration.adc_max)?;
        Ok(code as f64 * self.calibration.volts_per_code())
    }
    /// Dual-channel pair. Either line failing rejects the whole pair so the
    /// two channels never fall out of step.
    pub fn decode_pair(&self, first: &str, second: &str) -> Result<(f64, f64), DecodeError> {
        let code1 = parse_code(payload(first)?, self.calibration.adc_max)?;
        let code2 = parse_code(payload(second)?, self.calibration.adc_max)?;
        Ok((self.recentered(code1), self.recentered(code2)))
    }
    fn recentered(&self, code: AdcCode) -> f64 {
        code as f64 * self.calibration.volts_per_code() - self.calibration.dual_offset_volts
    }
}
/// Everything after the first `": "`, e.g. `"1234"` from `"Received: 1234"`.
pub fn payload(line: &str) -> Result<&str, DecodeError> {
    line.split_once(PAIR_SEPARATOR)
        .map(|(_, value)| value)
        .ok_or_else(|| DecodeError::MissingSeparator(line.to_owned()))
}
/// Parses a decimal ADC code and checks it against `0..=adc_max`.
/// Out-of-range codes are reported, never clamped.
pub fn parse_code(text: &str, adc_max: AdcCode) -> Result<AdcCode, DecodeError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| DecodeError::Malformed(text.to_owned()))?;
    if (0..=adc_max as i64).contains(&value) {
        Ok(value as AdcCode)
    } else {
        Err(DecodeError::OutOfRange {
            code: value,
            max: adc_max,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn decoder() -> SampleDecoder {
        SampleDecoder::new(Calibration::default())
    }
    #[test]
    fn single_channel_spans_reference() {
        let d = decoder();
        assert!(d.decode_single("0").unwrap().abs() < 1e-12);
        assert!((d.decode_single("4095").unwrap() - 3.3).abs() < 1e-9);
        assert!((d.decode_single("2048").unwrap() - 1.65).abs() < 1e-3);
    }
    #[test]
    fn single_channel_is_monotonic() {
        let d = decoder();
        let mut prev = f64::MIN;
        for code in 0..=4095 {
            let v = d.decode_single(&code.to_string()).unwrap();
            assert!((v - code as f64 * (3.3 / 4095.0)).abs() < 1e-12);
            assert!(v >= prev);
            prev = v;
        }
    }
    #[test]
    fn rejects_malformed_and_out_of_range() {
        let d = decoder();
        assert_eq!(
            d.decode_single("abc"),
            Err(DecodeError::Malformed("abc".into()))
        );
        assert_eq!(
            d.decode_single("5000"),
            Err(DecodeError::OutOfRange {
                code: 5000,
                max: 4095
            })
        );
        assert!(matches!(
            d.decode_single("-1"),
            Err(DecodeError::OutOfRange { code: -1, .. })
        ));
        assert!(matches!(d.decode_single(""), Err(DecodeError::Malformed(_))));
    }
    #[test]
    fn tolerates_padding_around_digits() {
        assert_eq!(parse_code(" 17 ", 4095), Ok(17));
    }
    #[test]
    fn pair_recenters_and_differs() {
        let (v1, v2) = decoder()
            .decode_pair("Received: 4095", "Received: 0")
            .unwrap();
        assert!((v1 - 1.8).abs() < 1e-9);
        assert!((v2 + 1.5).abs() < 1e-9);
        assert!(((v1 - v2) - 3.3).abs() < 1e-9);
    }
    #[test]
    fn pair_difference_matches_formula() {
        let d = decoder();
        let scale = 3.3 / 4095.0;
        for (c1, c2) in [(0, 0), (1, 4094), (2048, 1024), (4095, 4095), (300, 3000)] {
            let (v1, v2) = d
                .decode_pair(&format!("Received: {c1}"), &format!("Received: {c2}"))
                .unwrap();
            let expected = (c1 as f64 * scale - 1.5) - (c2 as f64 * scale - 1.5);
            assert!(((v1 - v2) - expected).abs() < 1e-9);
        }
    }
    #[test]
    fn pair_fails_as_a_unit() {
        let d = decoder();
        assert!(matches!(
            d.decode_pair("Received: 10", "Received 20"),
            Err(DecodeError::MissingSeparator(_))
        ));
        assert!(matches!(
            d.decode_pair("Received: x", "Received: 20"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            d.decode_pair("Received: 10", "Received: 9999"),
            Err(DecodeError::OutOfRange { code: 9999, .. })
        ));
    }
    #[test]
    fn payload_splits_on_first_separator() {
        assert_eq!(payload("Received: 12"), Ok("12"));
        assert_eq!(payload("a: b: c"), Ok("b: c"));
        assert!(payload("12").is_err());
    }
}
