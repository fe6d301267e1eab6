use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a client may send over its websocket.
///
/// The wire envelope also carries a `client_id` field, which is ignored
/// during deserialization: the acting identity comes from the connection
/// path and cannot be spoofed per message. SDP and ICE payloads are opaque
/// to the relay and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    GetUsers,
    Offer { target: String, offer: Value },
    Answer { target: String, answer: Value },
    IceCandidate { target: String, candidate: Value },
}

/// Messages the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        client_id: String,
        message: String,
    },
    UserJoined {
        client_id: String,
        users_online: usize,
    },
    UserLeft {
        client_id: String,
        users_online: usize,
    },
    UsersList {
        users: Vec<String>,
        users_online: usize,
    },
    Offer {
        offer: Value,
        sender: String,
    },
    Answer {
        answer: Value,
        sender: String,
    },
    IceCandidate {
        candidate: Value,
        sender: String,
    },
}
