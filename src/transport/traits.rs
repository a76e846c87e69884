//! Transport trait abstraction for the two command-delivery paths

use crate::error::ControllerError;
use async_trait::async_trait;
use giza_shared::Command;

/// A path that can deliver a command token to the device
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Deliver one command; no retry, no queue
    async fn send_command(&self, command: Command) -> Result<(), ControllerError>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
