use std::env;
use std::path::PathBuf;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub tls: TlsSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct TlsSettings {
    pub enabled: bool,
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

impl Settings {
    /// Environment-driven configuration. Defaults suit a LAN deployment:
    /// HTTPS on 0.0.0.0:8443 with certificate material in the working
    /// directory. `APP_TLS=0` switches to plain HTTP.
    pub fn from_env() -> Self {
        Self {
            application: ApplicationSettings {
                host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("APP_PORT")
                    .ok()
                    .and_then(|port| port.parse().ok())
                    .unwrap_or(8443),
            },
            tls: TlsSettings {
                enabled: env::var("APP_TLS")
                    .map(|v| v != "0" && v != "false")
                    .unwrap_or(true),
                certificate: env::var("APP_CERT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("cert.pem")),
                private_key: env::var("APP_KEY")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("key.pem")),
            },
        }
    }
}
