//! Giza Remote Shared Protocol Types
//!
//! This crate provides the device protocol shared between the remote
//! controller and the relay proxy: command tokens, the status document
//! schema, the transport link state machine, and the wire constants.

pub mod command;
pub mod link;
pub mod status;

pub use command::{Command, UnknownCommand};
pub use link::{LinkEvent, LinkState, Transition, Transport};
pub use status::{DeviceStatus, Polarity, StatusView};

use std::time::Duration;
use uuid::Uuid;

/// HTTP path on the device that returns the status document
pub const STATUS_PATH: &str = "/status";

/// HTTP path on the device that accepts plain-text command tokens
pub const COMMAND_PATH: &str = "/command";

/// Path prefix under which the proxy forwards to the device
pub const PROXY_PREFIX: &str = "/proxy";

/// Advertised BLE name of the pyramid unit
pub const DEVICE_NAME: &str = "GizaPyramid";

/// GATT service UUID advertised by the device (matches the Arduino sketch)
pub const BLE_SERVICE_UUID: Uuid = Uuid::from_u128(0x4fafc201_1fb5_459e_8fcc_c5c9c331914b);

/// Write-only GATT characteristic that accepts command tokens as bytes
pub const BLE_COMMAND_CHAR_UUID: Uuid = Uuid::from_u128(0xbeb5483e_36e1_4688_b7f5_ea07361b26a8);

/// Fixed interval between auto-refresh status fetches
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(1500);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ble_uuids_match_sketch() {
        assert_eq!(
            BLE_SERVICE_UUID.to_string(),
            "4fafc201-1fb5-459e-8fcc-c5c9c331914b"
        );
        assert_eq!(
            BLE_COMMAND_CHAR_UUID.to_string(),
            "beb5483e-36e1-4688-b7f5-ea07361b26a8"
        );
    }
}
