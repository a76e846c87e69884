//! Transport Link State Machine
//!
//! Defines which command-delivery path is active and how named events move
//! between them. The machine is pure so selection, failure, and disconnect
//! behavior can be tested without a device, a radio, or a timer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The active channel used to reach the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// No verified path; commands fall back to the configured IP
    #[default]
    None,
    /// Wi-Fi HTTP against the stored device IP
    Wifi,
    /// BLE GATT characteristic writes
    Ble,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::None => write!(f, "Wi-Fi/BLE"),
            Transport::Wifi => write!(f, "Wi-Fi"),
            Transport::Ble => write!(f, "BLE"),
        }
    }
}

/// Events that can trigger link transitions
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// A status fetch over Wi-Fi succeeded
    WifiVerified,
    /// BLE scan + GATT connect handshake completed
    BleConnected,
    /// A selection attempt failed before completing
    ConnectFailed { reason: String },
    /// The user tore the link down
    UserDisconnected,
    /// The device dropped the BLE link
    BleLinkLost { reason: String },
}

/// Result of a link transition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The active transport changed
    Changed { from: Transport, to: Transport },
    /// The event was absorbed without changing the transport
    Unchanged,
    /// The event does not apply to the current transport
    Rejected { from: Transport, event: LinkEvent },
}

/// Tracks the single active transport
#[derive(Debug, Default)]
pub struct LinkState {
    transport: Transport,
}

impl LinkState {
    /// Create a new link with no active transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the active transport
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Whether an explicit disconnect action currently applies
    pub fn can_disconnect(&self) -> bool {
        self.transport != Transport::None
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LinkEvent) -> Transition {
        let from = self.transport;

        let to = match &event {
            // A failed selection leaves the prior transport untouched.
            LinkEvent::ConnectFailed { .. } => return Transition::Unchanged,

            LinkEvent::WifiVerified => Transport::Wifi,
            LinkEvent::BleConnected => Transport::Ble,

            LinkEvent::UserDisconnected => {
                if from == Transport::None {
                    return Transition::Rejected { from, event };
                }
                Transport::None
            }

            // Only meaningful while BLE is the active path; a stale drop
            // notification after the user already switched is absorbed.
            LinkEvent::BleLinkLost { .. } => {
                if from != Transport::Ble {
                    return Transition::Unchanged;
                }
                Transport::None
            }
        };

        if to == from {
            return Transition::Unchanged;
        }

        self.transport = to;
        Transition::Changed { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let link = LinkState::new();
        assert_eq!(link.transport(), Transport::None);
        assert!(!link.can_disconnect());
    }

    #[test]
    fn test_wifi_selection() {
        let mut link = LinkState::new();
        let result = link.process_event(LinkEvent::WifiVerified);
        assert_eq!(
            result,
            Transition::Changed {
                from: Transport::None,
                to: Transport::Wifi,
            }
        );
        assert_eq!(link.transport(), Transport::Wifi);
    }

    #[test]
    fn test_ble_takes_over_from_wifi() {
        let mut link = LinkState::new();
        link.process_event(LinkEvent::WifiVerified);

        let result = link.process_event(LinkEvent::BleConnected);
        assert_eq!(
            result,
            Transition::Changed {
                from: Transport::Wifi,
                to: Transport::Ble,
            }
        );
        assert_eq!(link.transport(), Transport::Ble);
    }

    #[test]
    fn test_connect_failure_leaves_prior_transport() {
        let mut link = LinkState::new();
        link.process_event(LinkEvent::WifiVerified);

        let result = link.process_event(LinkEvent::ConnectFailed {
            reason: "scan timed out".into(),
        });
        assert_eq!(result, Transition::Unchanged);
        assert_eq!(link.transport(), Transport::Wifi);
    }

    #[test]
    fn test_device_initiated_drop_resets_to_none() {
        let mut link = LinkState::new();
        link.process_event(LinkEvent::BleConnected);
        assert!(link.can_disconnect());

        let result = link.process_event(LinkEvent::BleLinkLost {
            reason: "device powered off".into(),
        });
        assert_eq!(
            result,
            Transition::Changed {
                from: Transport::Ble,
                to: Transport::None,
            }
        );
        assert!(!link.can_disconnect());
    }

    #[test]
    fn test_stale_drop_after_wifi_switch_is_absorbed() {
        let mut link = LinkState::new();
        link.process_event(LinkEvent::BleConnected);
        link.process_event(LinkEvent::WifiVerified);

        let result = link.process_event(LinkEvent::BleLinkLost {
            reason: "late notification".into(),
        });
        assert_eq!(result, Transition::Unchanged);
        assert_eq!(link.transport(), Transport::Wifi);
    }

    #[test]
    fn test_user_disconnect_requires_active_link() {
        let mut link = LinkState::new();
        let result = link.process_event(LinkEvent::UserDisconnected);
        assert!(matches!(result, Transition::Rejected { .. }));

        link.process_event(LinkEvent::BleConnected);
        let result = link.process_event(LinkEvent::UserDisconnected);
        assert_eq!(
            result,
            Transition::Changed {
                from: Transport::Ble,
                to: Transport::None,
            }
        );
    }
}
