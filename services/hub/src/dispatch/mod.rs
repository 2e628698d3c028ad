//! Per-role frame dispatch. `ws::handle_socket` routes each text frame here
//! once a connection's role is known.

pub mod client;
pub mod device;

pub use client::handle_client_frame;
pub use device::handle_device_frame;
