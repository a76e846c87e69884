//! # giza-proxy
//!
//! CORS-forwarding relay for the Giza pyramid device. Browsers on the same
//! network cannot call the device directly because of same-origin rules;
//! this process accepts their requests, rewrites the `/proxy` prefix away,
//! and relays to `http://<device-ip>/...` with permissive CORS headers on
//! every response.

pub mod routes;

pub use routes::create_router;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Deadline for one relayed request to the device
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared proxy state: the target device address and the relay client.
///
/// The target may be fixed at startup or set at runtime via `/set-ip`.
#[derive(Clone)]
pub struct ProxyState {
    target: Arc<RwLock<Option<String>>>,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(target: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .expect("default reqwest client");
        Self {
            target: Arc::new(RwLock::new(target)),
            client,
        }
    }

    pub async fn target(&self) -> Option<String> {
        self.target.read().await.clone()
    }

    pub async fn set_target(&self, ip: String) {
        *self.target.write().await = Some(ip);
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
