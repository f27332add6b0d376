mod device_info;
mod logging_udp;
pub mod netif;

pub mod clusters;
pub mod device_types;
pub mod dynamic_handler;
pub mod endpoints;
pub mod events;
pub mod handler_bridge;
pub mod mdns;
pub mod server_node;
pub mod subscription_persistence;
pub mod virtual_device;

// Re-export from endpoints for convenience
pub use endpoints::controls;
pub use endpoints::sensors;

// Re-export virtual device types
pub use virtual_device::{EndpointConfig, VirtualDevice};
