use std::net::TcpListener;

use actix::Actor;
use actix_web::{dev::Server, web, App, HttpServer};
use tracing::info;

use crate::settings::Settings;

mod registry;
mod services;
mod session;

pub use registry::{Broadcast, Connect, Disconnect, ListIds, Registry, SendTo, SessionMessage};

use services::{health_check, index, join};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(
        configuration: Settings,
        tls: Option<rustls::ServerConfig>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Running on port: {port}");

        let server = create_server(listener, tls)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn create_server(
    listener: TcpListener,
    tls: Option<rustls::ServerConfig>,
) -> Result<Server, anyhow::Error> {
    let registry = web::Data::new(Registry::default().start());
    let factory = move || {
        App::new()
            .app_data(registry.clone())
            .service(health_check)
            .service(index)
            .service(join)
    };
    let server = match tls {
        Some(config) => HttpServer::new(factory)
            .listen_rustls_0_23(listener, config)?
            .run(),
        None => HttpServer::new(factory).listen(listener)?.run(),
    };
    Ok(server)
}
