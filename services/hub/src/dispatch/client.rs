//! Client command dispatch (§4.3): `L`, `I`, `C<ID>…`, `M<ID>…`, `R<ID>[<FF>]`.

use hub_protocol::{parse_client_command, ClientCommand};

use crate::connection::ConnectionHandle;
use crate::state::Hub;

/// Parses and executes one client frame. Unparseable or unknown frames are
/// dropped silently, per the protocol's failure semantics (§4.6) — this
/// function never produces an error reply.
pub async fn handle_client_frame(hub: &Hub, issuer: &ConnectionHandle, frame: &str) {
    let Some(command) = parse_client_command(frame) else {
        return;
    };
    match command {
        ClientCommand::List => reply_with_device_list(hub, issuer).await,
        ClientCommand::IdentifyAll => identify_all(hub).await,
        ClientCommand::Forward { target, frame } => {
            forward_to_device(hub, target, frame).await;
        }
        ClientCommand::RequestOnce { target, frame } => {
            forward_to_device(hub, target, frame).await;
        }
        ClientCommand::RequestStream {
            target,
            frame,
            subscribe,
        } => {
            forward_to_device(hub, target, frame).await;
            hub.set_subscription(target, issuer.id, subscribe).await;
        }
    }
}

async fn reply_with_device_list(hub: &Hub, issuer: &ConnectionHandle) {
    let ids = hub.list_devices().await;
    let mut reply = String::new();
    for id in ids {
        reply.push_str(&id.to_string());
        reply.push('\n');
    }
    if reply.is_empty() {
        reply.push('\n');
    }
    let _ = issuer.send_line(reply);
}

async fn identify_all(hub: &Hub) {
    for device in hub.all_device_connections().await {
        // Best-effort: a send failure here is not eviction, the device's
        // own receive loop is what drives registry cleanup.
        let _ = device.send_line("I\n");
    }
}

async fn forward_to_device(hub: &Hub, target: hub_protocol::DeviceId, frame: &str) {
    if let Some(device) = hub.device_connection(target).await {
        let mut line = frame.to_owned();
        line.push('\n');
        let _ = device.send_line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Role;
    use hub_protocol::DeviceId;
    use tokio::sync::mpsc;

    fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<axum::extract::ws::Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new("127.0.0.1:1".to_owned(), tx), rx)
    }

    fn recv_text(rx: &mut mpsc::UnboundedReceiver<axum::extract::ws::Message>) -> String {
        match rx.try_recv() {
            Ok(axum::extract::ws::Message::Text(text)) => text,
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_replies_with_empty_newline_when_no_devices() {
        let hub = Hub::new();
        let (client, mut rx) = handle();
        hub.accept(client.clone()).await;

        handle_client_frame(&hub, &client, "L").await;

        assert_eq!(recv_text(&mut rx), "\n");
    }

    #[tokio::test]
    async fn list_replies_with_sorted_ids() {
        let hub = Hub::new();
        let (device_a, _rxa) = handle();
        let (device_b, _rxb) = handle();
        hub.accept(device_a.clone()).await;
        hub.accept(device_b.clone()).await;
        hub.claim_device(device_a.id, DeviceId::parse("FFFF").unwrap()).await;
        hub.claim_device(device_b.id, DeviceId::parse("0001").unwrap()).await;

        let (client, mut rx) = handle();
        hub.accept(client.clone()).await;
        handle_client_frame(&hub, &client, "L").await;

        assert_eq!(recv_text(&mut rx), "0001\nFFFF\n");
    }

    #[tokio::test]
    async fn identify_all_pings_every_registered_device() {
        let hub = Hub::new();
        let (device, mut rx) = handle();
        hub.accept(device.clone()).await;
        hub.claim_device(device.id, DeviceId::parse("A1B2").unwrap()).await;

        let (client, _rxc) = handle();
        handle_client_frame(&hub, &client, "I").await;

        assert_eq!(recv_text(&mut rx), "I\n");
    }

    #[tokio::test]
    async fn configure_forwards_to_known_target_and_drops_for_unknown() {
        let hub = Hub::new();
        let (device, mut rx) = handle();
        hub.accept(device.clone()).await;
        hub.claim_device(device.id, DeviceId::parse("A1B2").unwrap()).await;

        let (client, _rxc) = handle();
        handle_client_frame(&hub, &client, "Ca1b2deadbeef").await;
        assert_eq!(recv_text(&mut rx), "Ca1b2deadbeef\n");

        // Unknown target: no panic, no send.
        handle_client_frame(&hub, &client, "Cffffdeadbeef").await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn request_stream_forwards_and_toggles_subscription() {
        let hub = Hub::new();
        let (device, mut rx_device) = handle();
        hub.accept(device.clone()).await;
        hub.set_role(device.id, Role::Device(DeviceId::parse("A1B2").unwrap())).await;
        hub.claim_device(device.id, DeviceId::parse("A1B2").unwrap()).await;

        let (client, _rxc) = handle();
        hub.accept(client.clone()).await;
        hub.set_role(client.id, Role::Client).await;

        let device_id = DeviceId::parse("A1B2").unwrap();
        handle_client_frame(&hub, &client, "RA1B201").await;
        assert_eq!(recv_text(&mut rx_device), "RA1B201\n");
        assert!(hub.is_subscribed(device_id, client.id).await);

        handle_client_frame(&hub, &client, "RA1B200").await;
        assert_eq!(recv_text(&mut rx_device), "RA1B200\n");
        assert!(!hub.is_subscribed(device_id, client.id).await);
    }

    #[tokio::test]
    async fn request_once_does_not_change_subscription() {
        let hub = Hub::new();
        let (device, mut rx) = handle();
        hub.accept(device.clone()).await;
        hub.claim_device(device.id, DeviceId::parse("A1B2").unwrap()).await;

        let (client, _rxc) = handle();
        handle_client_frame(&hub, &client, "RA1B2").await;

        assert_eq!(recv_text(&mut rx), "RA1B2\n");
    }

    #[tokio::test]
    async fn malformed_frames_are_dropped_silently() {
        let hub = Hub::new();
        let (client, _rxc) = handle();
        handle_client_frame(&hub, &client, "Qwhatever").await;
        handle_client_frame(&hub, &client, "").await;
    }
}
