//! Command tokens accepted by the device
//!
//! The same tokens travel as a plain-text HTTP body or as raw bytes written
//! to the BLE command characteristic.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A mode command for the pyramid unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Day,
    Night,
    Storm,
}

/// Error returned when a token is not one of the fixed command set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command token: {0}")]
pub struct UnknownCommand(pub String);

impl Command {
    /// Wire token as the device firmware expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Day => "DAY",
            Command::Night => "NIGHT",
            Command::Storm => "STORM",
        }
    }

    /// Byte payload for a BLE characteristic write
    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(Command::Day),
            "NIGHT" => Ok(Command::Night),
            "STORM" => Ok(Command::Storm),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match_firmware() {
        assert_eq!(Command::Day.as_str(), "DAY");
        assert_eq!(Command::Night.as_str(), "NIGHT");
        assert_eq!(Command::Storm.as_str(), "STORM");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("day".parse::<Command>().unwrap(), Command::Day);
        assert_eq!(" Storm ".parse::<Command>().unwrap(), Command::Storm);
        assert_eq!("NIGHT".parse::<Command>().unwrap(), Command::Night);
    }

    #[test]
    fn test_unknown_token_rejected() {
        let err = "RAIN".parse::<Command>().unwrap_err();
        assert_eq!(err, UnknownCommand("RAIN".into()));
    }

    #[test]
    fn test_ble_payload_is_token_bytes() {
        assert_eq!(Command::Day.as_bytes(), b"DAY");
    }
}
