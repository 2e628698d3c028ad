//! WebSocket upgrade and per-connection socket loop (§4.1).

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use hub_protocol::split_frames;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::connection::{ConnectionHandle, Role};
use crate::dispatch::{handle_client_frame, handle_device_frame};
use crate::state::Hub;

pub async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(hub): State<Hub>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, hub))
}

/// Owns one connection end to end: registers it, spawns its writer task,
/// classifies and dispatches every frame it sends, and cleans it up on exit.
async fn handle_socket(socket: WebSocket, addr: SocketAddr, hub: Hub) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let handle = ConnectionHandle::new(addr.to_string(), tx);
    let conn_id = handle.id;
    hub.accept(handle.clone()).await;
    info!(conn_id = %conn_id, addr = %handle.addr, "connection accepted");

    // The writer task is the sole owner of `sink`; every other task only
    // ever touches `handle`'s sender half.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let _ = handle.send_line("I\n");

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                for frame in split_frames(&text) {
                    dispatch_frame(&hub, &handle, &frame).await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    hub.cleanup(conn_id).await;
    writer.abort();
    info!(conn_id = %conn_id, "connection closed");
}

/// Classifies an `Unknown` connection on its first well-formed frame, then
/// routes every frame (including the classifying one) to the handler for
/// its role (§4.2).
async fn dispatch_frame(hub: &Hub, handle: &ConnectionHandle, frame: &str) {
    let role = match hub.role_of(handle.id).await {
        Some(Role::Unknown) | None => classify(hub, handle, frame).await,
        Some(role) => role,
    };
    match role {
        Role::Device(_) => handle_device_frame(hub, handle, frame).await,
        Role::Client => handle_client_frame(hub, handle, frame).await,
        Role::Unknown => debug!(conn_id = %handle.id, frame, "dropping frame from unclassified connection"),
    }
}

/// A connection becomes a device the moment it sends a 4-char identification
/// frame; it becomes a client the moment its first frame starts with an
/// ASCII letter, whether or not that frame is itself a well-formed command
/// (a malformed command just drops silently once dispatched). A frame that
/// matches neither leaves the connection `Unknown` and is dropped.
async fn classify(hub: &Hub, handle: &ConnectionHandle, frame: &str) -> Role {
    if let Some(hub_protocol::DeviceMessage::Identify(id)) = hub_protocol::parse_device_message(frame) {
        let role = Role::Device(id);
        hub.set_role(handle.id, role).await;
        return role;
    }
    if frame.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        hub.set_role(handle.id, Role::Client).await;
        return Role::Client;
    }
    Role::Unknown
}
