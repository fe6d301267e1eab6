use tracing_subscriber::EnvFilter;

use signalhub::{application::Application, settings::Settings, tls};

fn setup() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn banner(settings: &Settings) {
    let scheme = if settings.tls.enabled { "https" } else { "http" };
    let port = settings.application.port;
    tracing::info!("video chat signaling relay");
    tracing::info!("local:   {scheme}://localhost:{port}");
    if let Ok(ip) = local_ip_address::local_ip() {
        tracing::info!("network: {scheme}://{ip}:{port}");
    }
    if settings.tls.enabled {
        tracing::info!("the certificate is self-signed; browsers warn once per device");
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    setup();
    let settings = Settings::from_env();
    banner(&settings);

    let tls_config = if settings.tls.enabled {
        Some(tls::load_or_generate(
            &settings.tls.certificate,
            &settings.tls.private_key,
        )?)
    } else {
        None
    };

    Application::build(settings, tls_config)
        .await?
        .run_until_stopped()
        .await?;
    Ok(())
}
