//! BLE GATT transport
//!
//! Holds the handle set for an established link (device + command
//! characteristic) and a monitor task that reports device-initiated
//! disconnects. Handles exist only while the link is up; dropping the link
//! clears them and stops the monitor.

use crate::controller::ControllerEvent;
use crate::error::ControllerError;
use crate::transport::ble_discovery::{BleDiscovery, BleDiscoveryConfig};
use crate::transport::traits::CommandTransport;
use async_trait::async_trait;
use bluer::gatt::remote::Characteristic;
use bluer::{Device, DeviceEvent, DeviceProperty};
use giza_shared::{Command, BLE_COMMAND_CHAR_UUID, BLE_SERVICE_UUID};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long to wait for GATT service resolution after connecting
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for establishing a BLE link
#[derive(Debug, Clone, Default)]
pub struct BleConfig {
    pub discovery: BleDiscoveryConfig,
}

/// An established GATT link to the pyramid unit
pub struct BleLink {
    device: Device,
    characteristic: Characteristic,
    monitor: JoinHandle<()>,
}

impl BleLink {
    /// Scan, connect, and resolve the command characteristic.
    ///
    /// Device-initiated disconnects are reported on `events` until the link
    /// is torn down.
    pub async fn connect(
        config: &BleConfig,
        events: mpsc::Sender<ControllerEvent>,
    ) -> Result<Self, ControllerError> {
        let adapter = BleDiscovery::get_adapter().await?;
        let discovery = BleDiscovery::new(config.discovery.clone());
        let device = discovery.find_device(&adapter).await?;

        if !device.is_connected().await? {
            info!("[BLE] Connecting to {}", device.address());
            device.connect().await?;
        }

        let characteristic = Self::resolve_characteristic(&device).await?;
        let monitor = Self::spawn_monitor(device.clone(), events);

        info!("[BLE] Link established to {}", device.address());
        Ok(Self {
            device,
            characteristic,
            monitor,
        })
    }

    /// Walk the resolved services looking for the command characteristic
    async fn resolve_characteristic(device: &Device) -> Result<Characteristic, ControllerError> {
        let deadline = tokio::time::Instant::now() + RESOLVE_TIMEOUT;
        while !device.is_services_resolved().await? {
            if tokio::time::Instant::now() >= deadline {
                return Err(ControllerError::MissingCharacteristic);
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        for service in device.services().await? {
            if service.uuid().await? != BLE_SERVICE_UUID {
                continue;
            }
            for characteristic in service.characteristics().await? {
                if characteristic.uuid().await? == BLE_COMMAND_CHAR_UUID {
                    return Ok(characteristic);
                }
            }
        }

        Err(ControllerError::MissingCharacteristic)
    }

    /// Watch the device property stream for a dropped connection
    fn spawn_monitor(device: Device, events: mpsc::Sender<ControllerEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            use futures::StreamExt;

            let mut stream = match device.events().await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!("[BLE] Cannot monitor {}: {}", device.address(), err);
                    return;
                }
            };

            while let Some(event) = stream.next().await {
                if let DeviceEvent::PropertyChanged(DeviceProperty::Connected(false)) = event {
                    debug!("[BLE] {} reported disconnect", device.address());
                    let _ = events
                        .send(ControllerEvent::LinkLost {
                            reason: "device disconnected".into(),
                        })
                        .await;
                    return;
                }
            }
        })
    }

    /// Tear the link down from our side
    pub async fn disconnect(self) -> Result<(), ControllerError> {
        // Stop the monitor first so our own teardown is not reported as a
        // device-initiated drop.
        self.monitor.abort();
        if self.device.is_connected().await? {
            self.device.disconnect().await?;
        }
        info!("[BLE] Link to {} closed", self.device.address());
        Ok(())
    }
}

impl Drop for BleLink {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

#[async_trait]
impl CommandTransport for BleLink {
    async fn send_command(&self, command: Command) -> Result<(), ControllerError> {
        debug!("[BLE] write {:?}", command.as_str());
        self.characteristic.write(command.as_bytes()).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "BLE"
    }
}
