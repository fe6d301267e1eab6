use std::collections::HashMap;

use actix::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::message::ServerMessage;

/// Pushed from the registry to a session actor.
#[derive(Message)]
#[rtype(result = "()")]
pub enum SessionMessage {
    /// Serialize and write to the peer as a text frame.
    Forward(ServerMessage),
    /// Close the underlying websocket and stop the session.
    Close,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: String,
    pub token: Uuid,
    pub addr: Recipient<SessionMessage>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: String,
    pub token: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Broadcast {
    pub message: ServerMessage,
    pub exclude: Option<String>,
}

#[derive(Message)]
#[rtype(result = "bool")]
pub struct SendTo {
    pub target: String,
    pub message: ServerMessage,
}

#[derive(Message)]
#[rtype(result = "Vec<String>")]
pub struct ListIds;

struct Connection {
    /// Generation stamp minted by the session. A disconnect only evicts the
    /// record if the stamp matches, so the leftover session of a replaced
    /// connection cannot remove its successor.
    token: Uuid,
    addr: Recipient<SessionMessage>,
}

/// The single source of truth for who is connected.
///
/// All mutation goes through this actor's mailbox, which serializes the
/// operations below against each other. Sends towards sessions never block:
/// a failed `try_send` is taken as proof of a dead connection and the
/// offender is removed on the spot.
#[derive(Default)]
pub struct Registry {
    clients: HashMap<String, Connection>,
}

impl Registry {
    fn connect(&mut self, id: String, token: Uuid, addr: Recipient<SessionMessage>) {
        if let Some(old) = self.clients.insert(id.clone(), Connection { token, addr }) {
            let _ = old.addr.try_send(SessionMessage::Close);
            info!(client = %id, "replaced an existing connection under the same id");
        } else {
            info!(client = %id, online = self.clients.len(), "connected");
        }

        let ack = ServerMessage::Connected {
            client_id: id.clone(),
            message: "connection established".into(),
        };
        if let Some(conn) = self.clients.get(&id) {
            let _ = conn.addr.try_send(SessionMessage::Forward(ack));
        }

        let joined = ServerMessage::UserJoined {
            client_id: id.clone(),
            users_online: self.clients.len(),
        };
        self.broadcast(joined, Some(id.as_str()));
    }

    fn disconnect(&mut self, id: &str, token: Uuid) {
        if let Some(conn) = self.clients.get(id) {
            if conn.token != token {
                debug!(client = %id, "ignoring disconnect from a replaced session");
                return;
            }
        }
        // Unknown ids fall through on purpose: the user_left broadcast then
        // acts as a count refresh, which the client page tolerates.
        self.drop_client(id);
    }

    fn send_to(&mut self, target: &str, message: ServerMessage) -> bool {
        let sent = match self.clients.get(target) {
            None => return false,
            Some(conn) => conn.addr.try_send(SessionMessage::Forward(message)).is_ok(),
        };
        if !sent {
            debug!(client = %target, "send failed, dropping connection");
            self.drop_client(target);
        }
        sent
    }

    fn broadcast(&mut self, message: ServerMessage, exclude: Option<&str>) {
        let mut dead = Vec::new();
        for (id, conn) in &self.clients {
            if exclude == Some(id.as_str()) {
                continue;
            }
            if conn
                .addr
                .try_send(SessionMessage::Forward(message.clone()))
                .is_err()
            {
                dead.push(id.clone());
            }
        }
        for id in dead {
            debug!(client = %id, "broadcast failed, dropping connection");
            self.drop_client(&id);
        }
    }

    /// Remove a client and tell everyone left about it.
    fn drop_client(&mut self, id: &str) {
        if let Some(conn) = self.clients.remove(id) {
            let _ = conn.addr.try_send(SessionMessage::Close);
            info!(client = %id, online = self.clients.len(), "disconnected");
        }
        let left = ServerMessage::UserLeft {
            client_id: id.to_owned(),
            users_online: self.clients.len(),
        };
        self.broadcast(left, None);
    }
}

impl Actor for Registry {
    type Context = Context<Self>;
}

impl Handler<Connect> for Registry {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        self.connect(msg.id, msg.token, msg.addr);
    }
}

impl Handler<Disconnect> for Registry {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.disconnect(&msg.id, msg.token);
    }
}

impl Handler<Broadcast> for Registry {
    type Result = ();

    fn handle(&mut self, msg: Broadcast, _: &mut Context<Self>) {
        self.broadcast(msg.message, msg.exclude.as_deref());
    }
}

impl Handler<SendTo> for Registry {
    type Result = MessageResult<SendTo>;

    fn handle(&mut self, msg: SendTo, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.send_to(&msg.target, msg.message))
    }
}

impl Handler<ListIds> for Registry {
    type Result = MessageResult<ListIds>;

    fn handle(&mut self, _: ListIds, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.clients.keys().cloned().collect())
    }
}
