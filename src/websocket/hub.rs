use crate::types::ServerMessage;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The channel every connected client is implicitly interested in.
pub const LOBBY: &str = "lobby";

/// A client's subscription information.
pub struct ClientSubscription {
    /// Subscribed channel names (lobby, wallet ids, room ids).
    pub channels: HashSet<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::UnboundedSender<String>,
}

/// Fan-out hub for server push events.
pub struct Hub {
    /// Client subscriptions keyed by client ID.
    pub clients: DashMap<Uuid, ClientSubscription>,
    /// Channel name -> set of client IDs.
    channels: DashMap<String, HashSet<Uuid>>,
}

impl Hub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            clients: DashMap::new(),
            channels: DashMap::new(),
        })
    }

    /// Register a new client, subscribed to the lobby by default.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientSubscription {
                channels: HashSet::new(),
                tx,
            },
        );
        self.subscribe(client_id, &[LOBBY.to_string()]);
        client_id
    }

    /// Unregister a client and remove it from all channels.
    pub fn unregister(&self, client_id: Uuid) {
        if let Some((_, subscription)) = self.clients.remove(&client_id) {
            for channel in subscription.channels {
                if let Some(mut members) = self.channels.get_mut(&channel) {
                    members.remove(&client_id);
                }
            }
        }
    }

    /// Subscribe a client to channels. Returns the channels newly added.
    pub fn subscribe(&self, client_id: Uuid, channels: &[String]) -> Vec<String> {
        let mut subscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for channel in channels {
                if client.channels.insert(channel.clone()) {
                    subscribed.push(channel.clone());
                    self.channels
                        .entry(channel.clone())
                        .or_insert_with(HashSet::new)
                        .insert(client_id);
                }
            }
        }

        subscribed
    }

    /// Unsubscribe a client from channels. Returns the channels removed.
    pub fn unsubscribe(&self, client_id: Uuid, channels: &[String]) -> Vec<String> {
        let mut unsubscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for channel in channels {
                if client.channels.remove(channel) {
                    unsubscribed.push(channel.clone());
                    if let Some(mut members) = self.channels.get_mut(channel) {
                        members.remove(&client_id);
                    }
                }
            }
        }

        unsubscribed
    }

    /// Broadcast a message to every client subscribed to `channel`.
    pub fn broadcast(&self, channel: &str, message: &ServerMessage) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(_) => return,
        };

        let client_ids: Vec<Uuid> = self
            .channels
            .get(channel)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();

        for id in client_ids {
            if let Some(client) = self.clients.get(&id) {
                let _ = client.tx.send(json.clone());
            }
        }
    }

    /// Broadcast a message to the lobby plus any extra channels, without
    /// sending duplicates to clients subscribed to several of them.
    pub fn broadcast_event(&self, extra_channels: &[&str], message: &ServerMessage) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(_) => return,
        };

        let mut recipients: HashSet<Uuid> = HashSet::new();
        for channel in std::iter::once(LOBBY).chain(extra_channels.iter().copied()) {
            if let Some(members) = self.channels.get(channel) {
                recipients.extend(members.iter().copied());
            }
        }

        for id in recipients {
            if let Some(client) = self.clients.get(&id) {
                let _ = client.tx.send(json.clone());
            }
        }
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self {
            clients: DashMap::new(),
            channels: DashMap::new(),
        }
    }
}
