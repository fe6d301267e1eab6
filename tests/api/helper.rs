use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use once_cell::sync::Lazy;
use tokio::time::timeout;

use signalhub::{
    application::Application,
    message::ServerMessage,
    settings::{ApplicationSettings, Settings, TlsSettings},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);
    let settings = Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        tls: TlsSettings {
            enabled: false,
            certificate: "cert.pem".into(),
            private_key: "key.pem".into(),
        },
    };
    let app = Application::build(settings, None)
        .await
        .expect("Failed to build application");
    let port = app.port();
    let _ = tokio::spawn(app.run_until_stopped());
    TestApp {
        address: "127.0.0.1".to_string(),
        port,
    }
}

impl TestApp {
    pub fn base_address(&self) -> String {
        format!("http://{}:{}", &self.address, self.port)
    }

    pub fn path(&self, path: &str) -> String {
        format!("{}/{}", &self.base_address(), path)
    }

    pub async fn connect_ws(&self, client_id: &str) -> WsConn {
        let (_res, framed) = awc::Client::new()
            .ws(format!(
                "ws://{}:{}/ws/{}",
                &self.address, self.port, client_id
            ))
            .connect()
            .await
            .expect("Failed to connect websocket");
        WsConn { framed }
    }
}

pub struct WsConn {
    framed: actix_codec::Framed<awc::BoxedSocket, awc::ws::Codec>,
}

impl WsConn {
    pub async fn send_json(&mut self, value: &serde_json::Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.framed
            .send(awc::ws::Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Next decoded server message; heartbeat frames are answered and
    /// skipped. Panics if nothing arrives within two seconds.
    pub async fn next_message(&mut self) -> ServerMessage {
        loop {
            let frame = timeout(Duration::from_secs(2), self.framed.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection closed")
                .expect("websocket protocol error");
            match frame {
                awc::ws::Frame::Text(bytes) => {
                    return serde_json::from_slice(&bytes).expect("unparseable server message")
                }
                awc::ws::Frame::Ping(payload) => {
                    let _ = self.framed.send(awc::ws::Message::Pong(payload)).await;
                }
                awc::ws::Frame::Pong(_) => {}
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Asserts that nothing besides heartbeat traffic arrives for `wait`.
    pub async fn expect_silence(&mut self, wait: Duration) {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            match tokio::time::timeout_at(deadline, self.framed.next()).await {
                Err(_) => return,
                Ok(Some(Ok(awc::ws::Frame::Ping(payload)))) => {
                    let _ = self.framed.send(awc::ws::Message::Pong(payload)).await;
                }
                Ok(Some(Ok(awc::ws::Frame::Pong(_)))) => {}
                Ok(other) => panic!("expected silence, got {other:?}"),
            }
        }
    }

    /// Asserts that the server closes the connection.
    pub async fn expect_close(&mut self) {
        loop {
            match timeout(Duration::from_secs(2), self.framed.next())
                .await
                .expect("timed out waiting for close")
            {
                None | Some(Ok(awc::ws::Frame::Close(_))) => return,
                Some(Ok(awc::ws::Frame::Ping(payload))) => {
                    let _ = self.framed.send(awc::ws::Message::Pong(payload)).await;
                }
                Some(Ok(awc::ws::Frame::Pong(_))) => {}
                other => panic!("expected close, got {other:?}"),
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.framed.send(awc::ws::Message::Close(None)).await;
    }
}
