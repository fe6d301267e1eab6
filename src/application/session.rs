use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web_actors::ws;
use tracing::{debug, info};
use uuid::Uuid;

use super::registry::{self, Registry, SessionMessage};
use crate::message::{ClientMessage, ServerMessage};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// One websocket connection. Holds no signaling state of its own: every
/// frame is either serviced against the registry or forwarded through it.
pub struct WsSession {
    id: String,
    token: Uuid,
    heartbeat: Instant,
    registry: Addr<Registry>,
}

impl WsSession {
    pub fn new(id: String, registry: Addr<Registry>) -> Self {
        Self {
            id,
            token: Uuid::new_v4(),
            heartbeat: Instant::now(),
            registry,
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.heartbeat) > CLIENT_TIMEOUT {
                info!(client = %act.id, "heartbeat timed out, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// The dispatch table: a membership query is answered directly, routed
    /// types go to their target, everything else is dropped.
    fn route(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(err) => {
                debug!(client = %self.id, %err, "dropping malformed message");
                return;
            }
        };

        match message {
            ClientMessage::GetUsers => {
                self.registry
                    .send(registry::ListIds)
                    .into_actor(self)
                    .then(|res, _act, ctx| {
                        if let Ok(users) = res {
                            let reply = ServerMessage::UsersList {
                                users_online: users.len(),
                                users,
                            };
                            ctx.text(serde_json::to_string(&reply).unwrap());
                        }
                        fut::ready(())
                    })
                    .wait(ctx);
            }
            ClientMessage::Offer { target, offer } => self.forward(
                target,
                ServerMessage::Offer {
                    offer,
                    sender: self.id.clone(),
                },
            ),
            ClientMessage::Answer { target, answer } => self.forward(
                target,
                ServerMessage::Answer {
                    answer,
                    sender: self.id.clone(),
                },
            ),
            ClientMessage::IceCandidate { target, candidate } => self.forward(
                target,
                ServerMessage::IceCandidate {
                    candidate,
                    sender: self.id.clone(),
                },
            ),
        }
    }

    /// Fire-and-forget: a missing target is dropped by the registry and the
    /// sender is never told.
    fn forward(&self, target: String, message: ServerMessage) {
        self.registry.do_send(registry::SendTo { target, message });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        self.registry.do_send(registry::Connect {
            id: self.id.clone(),
            token: self.token,
            addr: ctx.address().recipient(),
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.registry.do_send(registry::Disconnect {
            id: self.id.clone(),
            token: self.token,
        });
        Running::Stop
    }
}

impl Handler<SessionMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: SessionMessage, ctx: &mut Self::Context) {
        match msg {
            SessionMessage::Forward(message) => {
                ctx.text(serde_json::to_string(&message).unwrap());
            }
            SessionMessage::Close => {
                ctx.close(Some(ws::CloseCode::Normal.into()));
                ctx.stop();
            }
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => self.route(&text, ctx),
            Ok(ws::Message::Binary(_)) => {
                debug!(client = %self.id, "dropping unexpected binary frame");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
