//! Error taxonomy for the controller
//!
//! Three families: configuration (nothing to dial), connectivity (the dial
//! failed), protocol (the device answered but not usefully). All of them
//! surface as one short message at the call site; none are fatal.

use giza_shared::UnknownCommand;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to determine path to config file")]
    NoConfigPath,

    #[error("failed to read/write config file: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("failed to parse config file: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ControllerError {
    // --- configuration ---
    #[error("no device IP configured; use `ip <addr>` or connect via BLE")]
    NoDeviceIp,

    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- connectivity ---
    #[error("device unreachable: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("bluetooth error: {source}")]
    Ble {
        #[from]
        source: bluer::Error,
    },

    #[error("no BLE device matching name {0:?} or the pyramid service found")]
    DeviceNotFound(String),

    #[error("BLE not connected")]
    NotConnected,

    // --- protocol ---
    #[error("the command characteristic is not available on this device")]
    MissingCharacteristic,

    #[error("device returned HTTP {0}")]
    BadHttpStatus(u16),

    #[error("undecodable status document: {source}")]
    BadStatusDocument {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),
}
