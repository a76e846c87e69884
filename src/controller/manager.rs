//! Device controller owning the connection state
//!
//! All mutations of the link state, the BLE handle set, and the persisted
//! IP funnel through this object; the UI only calls methods and reads the
//! event channel. Invariant: the BLE handles are held iff the active
//! transport is BLE.

use crate::config::{AppConfig, ConfigStore};
use crate::controller::poll::StatusPoller;
use crate::error::ControllerError;
use crate::transport::{BleConfig, BleLink, CommandTransport, HttpTransport};
use giza_shared::{
    Command, DeviceStatus, LinkEvent, LinkState, Polarity, Transport, STATUS_POLL_INTERVAL,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted by the controller's background tasks
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// An auto-refresh cycle fetched a status document
    StatusUpdated(DeviceStatus),
    /// The device dropped the BLE link
    LinkLost { reason: String },
}

pub struct DeviceController {
    link: LinkState,
    ble: Option<BleLink>,
    ble_config: BleConfig,
    http_client: reqwest::Client,
    device_ip: Option<String>,
    polarity: Polarity,
    store: ConfigStore,
    poller: StatusPoller,
    events_tx: mpsc::Sender<ControllerEvent>,
}

impl DeviceController {
    pub fn new(store: ConfigStore, config: AppConfig, events_tx: mpsc::Sender<ControllerEvent>) -> Self {
        Self {
            link: LinkState::new(),
            ble: None,
            ble_config: BleConfig::default(),
            http_client: HttpTransport::build_client(),
            device_ip: config.device_ip,
            polarity: config.polarity,
            store,
            poller: StatusPoller::new(),
            events_tx,
        }
    }

    pub fn transport(&self) -> Transport {
        self.link.transport()
    }

    pub fn device_ip(&self) -> Option<&str> {
        self.device_ip.as_deref()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Whether the disconnect control applies right now
    pub fn can_disconnect(&self) -> bool {
        self.link.can_disconnect()
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.poller.is_running()
    }

    /// Store and persist the device IP
    pub async fn set_device_ip(&mut self, ip: &str) -> Result<(), ControllerError> {
        let ip = ip.trim().to_string();
        self.device_ip = Some(ip);
        self.persist().await?;
        Ok(())
    }

    async fn persist(&self) -> Result<(), ControllerError> {
        let config = AppConfig {
            device_ip: self.device_ip.clone(),
            polarity: self.polarity,
        };
        self.store.save(&config).await?;
        Ok(())
    }

    fn http_transport(&self) -> Result<HttpTransport, ControllerError> {
        let ip = self.device_ip.clone().ok_or(ControllerError::NoDeviceIp)?;
        Ok(HttpTransport::new(self.http_client.clone(), ip))
    }

    /// One-shot status fetch; always HTTP, regardless of transport
    pub async fn fetch_status(&self) -> Result<DeviceStatus, ControllerError> {
        self.http_transport()?.fetch_status().await
    }

    /// Verify Wi-Fi reachability and make it the active transport.
    ///
    /// Reachability is the status fetch itself; on failure the prior
    /// transport stays untouched.
    pub async fn test_wifi(&mut self) -> Result<DeviceStatus, ControllerError> {
        match self.fetch_status().await {
            Ok(status) => {
                self.drop_ble_link().await;
                self.link.process_event(LinkEvent::WifiVerified);
                info!("Transport now {}", self.link.transport());
                Ok(status)
            }
            Err(err) => {
                self.link.process_event(LinkEvent::ConnectFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Scan for the device, connect, and make BLE the active transport
    pub async fn connect_ble(&mut self) -> Result<(), ControllerError> {
        match BleLink::connect(&self.ble_config, self.events_tx.clone()).await {
            Ok(ble) => {
                self.ble = Some(ble);
                self.link.process_event(LinkEvent::BleConnected);
                info!("Transport now {}", self.link.transport());
                Ok(())
            }
            Err(err) => {
                self.link.process_event(LinkEvent::ConnectFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// User-initiated disconnect of whichever transport is active
    pub async fn disconnect(&mut self) -> Result<(), ControllerError> {
        if !self.link.can_disconnect() {
            return Err(ControllerError::NotConnected);
        }
        self.link.process_event(LinkEvent::UserDisconnected);
        self.drop_ble_link().await;
        info!("Transport now {}", self.link.transport());
        Ok(())
    }

    /// React to a device-initiated BLE drop reported by the monitor task
    pub fn on_link_lost(&mut self, reason: &str) {
        self.link.process_event(LinkEvent::BleLinkLost {
            reason: reason.into(),
        });
        // The peer is already gone; just release the handles.
        self.ble = None;
    }

    async fn drop_ble_link(&mut self) {
        if let Some(ble) = self.ble.take() {
            if let Err(err) = ble.disconnect().await {
                warn!("BLE teardown failed: {}", err);
            }
        }
    }

    /// Dispatch one command over the active transport.
    ///
    /// With no BLE link, commands fall back to HTTP against the configured
    /// IP even when no transport was ever verified.
    pub async fn send_command(&self, command: Command) -> Result<(), ControllerError> {
        if self.link.transport() == Transport::Ble {
            let ble = self.ble.as_ref().ok_or(ControllerError::NotConnected)?;
            return ble.send_command(command).await;
        }
        self.http_transport()?.send_command(command).await
    }

    /// Begin auto-refresh; restart-safe
    pub fn start_auto_refresh(&mut self) -> Result<(), ControllerError> {
        let http = self.http_transport()?;
        self.poller.start(
            STATUS_POLL_INTERVAL,
            move || {
                let http = http.clone();
                async move { http.fetch_status().await }
            },
            self.events_tx.clone(),
        );
        Ok(())
    }

    pub fn stop_auto_refresh(&mut self) {
        self.poller.stop();
    }
}
