//! Device message dispatch (§4.4): identification and sensor frames.

use hub_protocol::{parse_device_message, DeviceMessage};

use crate::connection::{ConnectionHandle, Role};
use crate::state::Hub;

/// Parses and executes one device frame. `conn` must already be classified
/// as `Role::Device` (classification itself is handled in `ws::handle_socket`
/// before this is called).
pub async fn handle_device_frame(hub: &Hub, conn: &ConnectionHandle, frame: &str) {
    match parse_device_message(frame) {
        Some(DeviceMessage::Identify(device_id)) => {
            hub.set_role(conn.id, Role::Device(device_id)).await;
            hub.claim_device(conn.id, device_id).await;
        }
        Some(DeviceMessage::Sensor { device_id, frame }) => {
            let mut line = frame.to_owned();
            line.push('\n');
            hub.fan_out(device_id, line).await;
        }
        None => {}
    }
}
