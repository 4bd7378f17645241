//! Human-readable byte counts.
//!
//! Sizes are `u64` bytes everywhere; floating point only appears at the
//! formatting boundary. Output is locale independent.

use serde::Deserialize;

const UNITS: [&str; 7] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB"];

pub const MAX_FRACTION_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnits {
    /// Powers of 1000.
    Decimal,
    /// Powers of 1024, labelled with the short forms (KB, MB, ...).
    Binary,
}

impl SizeUnits {
    pub fn base(self) -> f64 {
        match self {
            Self::Decimal => 1000.0,
            Self::Binary => 1024.0,
        }
    }

    /// Apple platforms report file sizes in decimal units, everything else in binary.
    pub fn platform_default() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Decimal
        } else {
            Self::Binary
        }
    }
}

impl Default for SizeUnits {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Formats byte counts with a fixed number of zero-padded fraction digits.
///
/// Counts below one unit are printed as whole bytes (`"0 bytes"`, `"1 byte"`,
/// `"512 bytes"`); everything else carries exactly `fraction_digits` digits
/// (`"1.00 MB"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteFormatter {
    units: SizeUnits,
    fraction_digits: usize,
}

impl Default for ByteFormatter {
    fn default() -> Self {
        Self::new(SizeUnits::default(), 2)
    }
}

impl ByteFormatter {
    pub fn new(units: SizeUnits, fraction_digits: usize) -> Self {
        Self {
            units,
            fraction_digits: fraction_digits.min(MAX_FRACTION_DIGITS),
        }
    }

    pub fn format(&self, bytes: u64) -> String {
        let base = self.units.base();
        if (bytes as f64) < base {
            return if bytes == 1 {
                "1 byte".to_string()
            } else {
                format!("{bytes} bytes")
            };
        }

        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= base && unit < UNITS.len() - 1 {
            value /= base;
            unit += 1;
        }

        // 1023.999 KB must not print as "1024.00 KB".
        let scale = 10_f64.powi(self.fraction_digits as i32);
        if (value * scale).round() / scale >= base && unit < UNITS.len() - 1 {
            value /= base;
            unit += 1;
        }

        format!("{value:.prec$} {}", UNITS[unit], prec = self.fraction_digits)
    }
}
