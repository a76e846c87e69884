//! BLE scan for the pyramid unit
//!
//! Matches on the advertised name or the advertised service UUID, since
//! older sketch revisions advertise only one of the two.

use crate::error::ControllerError;
use bluer::{Adapter, AdapterEvent, Address, Device};
use giza_shared::{BLE_SERVICE_UUID, DEVICE_NAME};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Configuration for device discovery
#[derive(Debug, Clone)]
pub struct BleDiscoveryConfig {
    /// How long to scan before giving up
    pub scan_duration: Duration,
    /// Advertised name to match
    pub device_name: String,
}

impl Default for BleDiscoveryConfig {
    fn default() -> Self {
        Self {
            scan_duration: Duration::from_secs(10),
            device_name: DEVICE_NAME.into(),
        }
    }
}

/// BLE device discovery service
pub struct BleDiscovery {
    config: BleDiscoveryConfig,
}

impl BleDiscovery {
    pub fn new(config: BleDiscoveryConfig) -> Self {
        Self { config }
    }

    /// Get the default Bluetooth adapter, powered on
    pub async fn get_adapter() -> Result<Adapter, ControllerError> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        adapter.set_powered(true).await?;
        Ok(adapter)
    }

    /// Find the pyramid unit, checking already-known devices before scanning
    pub async fn find_device(&self, adapter: &Adapter) -> Result<Device, ControllerError> {
        let mut seen: HashSet<Address> = HashSet::new();

        for addr in adapter.device_addresses().await? {
            seen.insert(addr);
            if let Ok(device) = adapter.device(addr) {
                if self.is_pyramid_device(&device).await {
                    debug!("[BLE] Known device {} matches", addr);
                    return Ok(device);
                }
            }
        }

        let discover = adapter.discover_devices().await?;
        tokio::pin!(discover);

        let found = timeout(self.config.scan_duration, async {
            use futures::StreamExt;
            while let Some(evt) = discover.next().await {
                if let AdapterEvent::DeviceAdded(addr) = evt {
                    if !seen.insert(addr) {
                        continue;
                    }
                    if let Ok(device) = adapter.device(addr) {
                        if self.is_pyramid_device(&device).await {
                            return Some(device);
                        }
                    }
                }
            }
            None
        })
        .await;

        match found {
            Ok(Some(device)) => {
                info!("[BLE] Found {} at {}", self.config.device_name, device.address());
                Ok(device)
            }
            _ => Err(ControllerError::DeviceNotFound(
                self.config.device_name.clone(),
            )),
        }
    }

    /// Match by advertised name or by advertised service UUID
    async fn is_pyramid_device(&self, device: &Device) -> bool {
        if let Ok(Some(name)) = device.name().await {
            if name == self.config.device_name {
                return true;
            }
        }

        if let Ok(Some(uuids)) = device.uuids().await {
            if uuids.contains(&BLE_SERVICE_UUID) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BleDiscoveryConfig::default();
        assert_eq!(config.scan_duration, Duration::from_secs(10));
        assert_eq!(config.device_name, DEVICE_NAME);
    }
}
