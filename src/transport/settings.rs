//! Serial line settings.
//!
//! Defaults match the device firmware: 9600 baud, 8 data bits, no parity,
//! one stop bit (8N1).
//!
//! # Example
//!
//! ```
//! use pointlink::transport::{Parity, SerialSettings};
//!
//! let settings = SerialSettings::new()
//!     .with_port("/dev/ttyUSB0")
//!     .with_baud_rate(115_200)
//!     .with_parity(Parity::Even);
//!
//! assert!(settings.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{DataBits, Parity as SpParity, StopBits};

use super::PortId;

// ============================================================================
// Constants
// ============================================================================

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-read timeout handed to the driver.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

// ============================================================================
// Parity
// ============================================================================

/// Parity setting for serial port configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

impl Parity {
    /// Returns the single-letter code used in `8N1` style summaries.
    #[inline]
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
        }
    }
}

// ============================================================================
// SerialSettings
// ============================================================================

/// Serial port configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Port to open. `None` picks the first detected port.
    pub port: Option<PortId>,

    /// Line speed in bits per second.
    pub baud_rate: u32,

    /// Parity mode.
    pub parity: Parity,

    /// Data bits per character (5–8).
    pub data_bits: u8,

    /// Stop bits (1 or 2).
    pub stop_bits: u8,

    /// Driver-level read timeout. Timeouts are retried, not reported.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SerialSettings {
    /// Creates 9600 8N1 settings with automatic port selection.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            data_bits: 8,
            stop_bits: 1,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SerialSettings {
    /// Pins the port to open.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: impl Into<PortId>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Sets the baud rate.
    #[inline]
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Sets the parity mode.
    #[inline]
    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Sets data bits per character.
    #[inline]
    #[must_use]
    pub fn with_data_bits(mut self, data_bits: u8) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Sets the number of stop bits.
    #[inline]
    #[must_use]
    pub fn with_stop_bits(mut self, stop_bits: u8) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Sets the driver-level read timeout.
    #[inline]
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

// ============================================================================
// Validation and Conversion
// ============================================================================

impl SerialSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.baud_rate == 0 {
            return Err("Baud rate must be greater than zero".to_string());
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(format!("Unsupported data bits: {}", self.data_bits));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(format!("Unsupported stop bits: {}", self.stop_bits));
        }
        if self.read_timeout.is_zero() {
            return Err("Read timeout must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Returns a `9600 8N1` style summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.code(),
            self.stop_bits
        )
    }

    /// Converts parity to the `serialport` type.
    #[must_use]
    pub(crate) fn serialport_parity(&self) -> SpParity {
        match self.parity {
            Parity::None => SpParity::None,
            Parity::Odd => SpParity::Odd,
            Parity::Even => SpParity::Even,
        }
    }

    /// Converts data bits to the `serialport` type.
    #[must_use]
    pub(crate) fn serialport_data_bits(&self) -> DataBits {
        match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        }
    }

    /// Converts stop bits to the `serialport` type.
    #[must_use]
    pub(crate) fn serialport_stop_bits(&self) -> StopBits {
        match self.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_9600_8n1() {
        let settings = SerialSettings::new();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.stop_bits, 1);
        assert!(settings.port.is_none());
        assert_eq!(settings.summary(), "9600 8N1");
        assert_eq!(SerialSettings::default(), settings);
    }

    #[test]
    fn test_builder_chain() {
        let settings = SerialSettings::new()
            .with_port("COM5")
            .with_baud_rate(115_200)
            .with_parity(Parity::Odd)
            .with_data_bits(7)
            .with_stop_bits(2);

        assert_eq!(settings.port, Some(PortId::from("COM5")));
        assert_eq!(settings.summary(), "115200 7O2");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SerialSettings::new().validate().is_ok());
        assert!(SerialSettings::new().with_baud_rate(0).validate().is_err());
        assert!(SerialSettings::new().with_data_bits(9).validate().is_err());
        assert!(SerialSettings::new().with_stop_bits(0).validate().is_err());
        assert!(
            SerialSettings::new()
                .with_read_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_parity_serde() {
        let json = serde_json::to_string(&Parity::Even).unwrap();
        assert_eq!(json, "\"even\"");
        assert_eq!(serde_json::from_str::<Parity>("\"none\"").unwrap(), Parity::None);
    }

    #[test]
    fn test_serialport_conversions() {
        let settings = SerialSettings::new().with_parity(Parity::Even).with_data_bits(6).with_stop_bits(2);
        assert!(matches!(settings.serialport_parity(), SpParity::Even));
        assert!(matches!(settings.serialport_data_bits(), DataBits::Six));
        assert!(matches!(settings.serialport_stop_bits(), StopBits::Two));
        assert!(matches!(SerialSettings::new().serialport_data_bits(), DataBits::Eight));
        assert!(matches!(SerialSettings::new().serialport_stop_bits(), StopBits::One));
    }
}
