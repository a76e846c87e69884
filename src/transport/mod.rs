pub mod ble;
pub mod ble_discovery;
pub mod http;
pub mod traits;

pub use ble::{BleConfig, BleLink};
pub use ble_discovery::{BleDiscovery, BleDiscoveryConfig};
pub use http::HttpTransport;
pub use traits::CommandTransport;
