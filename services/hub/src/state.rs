//! The hub's shared routing state: the global connection set, the device
//! registry, the subscription map, and the role map (§3 of the hub spec).
//!
//! Each map is gated by its own `RwLock`, mirroring `services/server`'s
//! `AppState`. Fan-out collects a snapshot of subscriber handles under a
//! read lock, dispatches sends without holding any lock, then takes the
//! write lock once to prune failed targets — so a lock is never held across
//! an await on a socket send.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use hub_protocol::DeviceId;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::connection::{ConnectionHandle, ConnectionId, Role};

#[derive(Clone, Default)]
pub struct Hub {
    connections: Arc<RwLock<HashMap<ConnectionId, ConnectionHandle>>>,
    roles: Arc<RwLock<HashMap<ConnectionId, Role>>>,
    devices: Arc<RwLock<HashMap<DeviceId, ConnectionId>>>,
    subscriptions: Arc<RwLock<HashMap<DeviceId, HashSet<ConnectionId>>>>,
}

impl Hub {
    pub fn new() -> Self {
        Hub::default()
    }

    /// Registers a freshly-accepted connection in role `Unknown`.
    pub async fn accept(&self, handle: ConnectionHandle) {
        let id = handle.id;
        self.connections.write().await.insert(id, handle);
        self.roles.write().await.insert(id, Role::Unknown);
    }

    pub async fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.roles.read().await.get(&id).copied()
    }

    pub async fn set_role(&self, id: ConnectionId, role: Role) {
        self.roles.write().await.insert(id, role);
    }

    async fn handle_of(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Claims `device_id` for connection `id`, evicting and prompting any
    /// previous owner (§4.2/§4.4). Idempotent if `id` already owns
    /// `device_id`.
    pub async fn claim_device(&self, id: ConnectionId, device_id: DeviceId) {
        let previous_owner = {
            let mut devices = self.devices.write().await;
            // A connection owns exactly one registry entry (invariant ii):
            // drop any DeviceID this same connection previously claimed
            // under a different ID before installing the new one.
            devices.retain(|&existing, &mut owner| owner != id || existing == device_id);
            let previous = devices.insert(device_id, id);
            previous.filter(|&prev| prev != id)
        };
        if let Some(previous_id) = previous_owner {
            if let Some(handle) = self.handle_of(previous_id).await {
                warn!(
                    device_id = %device_id,
                    evicted = %previous_id,
                    new_owner = %id,
                    "device id re-claimed by a new connection; evicting previous owner"
                );
                let _ = handle.send_line("I\n");
            }
        }
    }

    /// Returns the registry's device IDs in ascending lexicographic order.
    pub async fn list_devices(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.devices.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn device_connection(&self, device_id: DeviceId) -> Option<ConnectionHandle> {
        let id = *self.devices.read().await.get(&device_id)?;
        self.handle_of(id).await
    }

    pub async fn all_device_connections(&self) -> Vec<ConnectionHandle> {
        let ids: Vec<ConnectionId> = self.devices.read().await.values().copied().collect();
        let mut handles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(handle) = self.handle_of(id).await {
                handles.push(handle);
            }
        }
        handles
    }

    /// Adds or removes `subscriber` from `device_id`'s subscriber set.
    pub async fn set_subscription(&self, device_id: DeviceId, subscriber: ConnectionId, subscribed: bool) {
        let mut subs = self.subscriptions.write().await;
        let set = subs.entry(device_id).or_default();
        if subscribed {
            set.insert(subscriber);
        } else {
            set.remove(&subscriber);
        }
    }

    /// Sends `line` to every current subscriber of `device_id`, then prunes
    /// any subscriber whose send failed. Sends are dispatched concurrently
    /// and all awaited before the prune, per the fan-out-then-prune
    /// invariant (§8 property 6).
    pub async fn fan_out(&self, device_id: DeviceId, line: String) {
        let targets: Vec<ConnectionHandle> = {
            let subs = self.subscriptions.read().await;
            let Some(ids) = subs.get(&device_id) else {
                return;
            };
            if ids.is_empty() {
                return;
            }
            let mut handles = Vec::with_capacity(ids.len());
            {
                let connections = self.connections.read().await;
                for id in ids {
                    if let Some(handle) = connections.get(id) {
                        handles.push(handle.clone());
                    }
                }
            }
            handles
        };

        let stale: Vec<ConnectionId> = targets
            .iter()
            .filter(|handle| handle.send_line(line.clone()).is_err())
            .map(|handle| handle.id)
            .collect();

        if !stale.is_empty() {
            let mut subs = self.subscriptions.write().await;
            if let Some(set) = subs.get_mut(&device_id) {
                for id in &stale {
                    set.remove(id);
                }
            }
        }
    }

    /// Whether `subscriber` is currently in `device_id`'s subscriber set.
    /// Used by dispatch tests; fan-out/cleanup go through the methods
    /// above rather than reading this directly.
    #[cfg(test)]
    pub(crate) async fn is_subscribed(&self, device_id: DeviceId, subscriber: ConnectionId) -> bool {
        self.subscriptions
            .read()
            .await
            .get(&device_id)
            .is_some_and(|set| set.contains(&subscriber))
    }

    /// Runs the full cleanup sequence for a connection that is exiting
    /// (§4.1): drop it from the global set, remove its role entry, and
    /// depending on the role it held, remove it from the device registry or
    /// every subscription set.
    pub async fn cleanup(&self, id: ConnectionId) {
        self.connections.write().await.remove(&id);
        let role = self.roles.write().await.remove(&id);
        match role {
            Some(Role::Client) => {
                let mut subs = self.subscriptions.write().await;
                for set in subs.values_mut() {
                    set.remove(&id);
                }
            }
            Some(Role::Device(_)) => {
                let mut devices = self.devices.write().await;
                devices.retain(|_, owner| *owner != id);
            }
            Some(Role::Unknown) | None => {}
        }
        info!(conn_id = %id, role = ?role, "connection cleaned up");
    }
}
