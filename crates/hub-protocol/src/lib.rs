//! Wire protocol for the device/client routing hub.
//!
//! This crate owns frame splitting, hex canonicalization, and command/
//! message parsing as pure, synchronous functions with no I/O — the same
//! split this workspace uses between `rt-protocol` (wire types) and the
//! `services/*` crates (the stateful server logic that acts on them).

mod command;
mod device_id;
mod frame;

pub use command::{parse_client_command, parse_device_message, ClientCommand, DeviceMessage};
pub use device_id::DeviceId;
pub use frame::split_frames;
