pub mod manager;
pub mod poll;

pub use manager::{ControllerEvent, DeviceController};
pub use poll::StatusPoller;
