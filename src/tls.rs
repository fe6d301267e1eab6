//! Credential provisioning for the encrypted transport.
//!
//! Operator-provided PEM files are used when present; otherwise a
//! self-signed certificate is generated and written back so later starts
//! reuse it. Any failure here is a startup blocker, never a request-time
//! error.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rcgen::{generate_simple_self_signed, CertifiedKey};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("could not read {0}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("could not write {0}")]
    Write(PathBuf, #[source] std::io::Error),
    #[error("{0} contains no usable private key")]
    MissingKey(PathBuf),
    #[error(transparent)]
    Generation(#[from] rcgen::Error),
    #[error(transparent)]
    Tls(#[from] rustls::Error),
}

pub fn load_or_generate(
    cert_path: &Path,
    key_path: &Path,
) -> Result<ServerConfig, CredentialsError> {
    let (certs, key) = if cert_path.exists() && key_path.exists() {
        info!(cert = %cert_path.display(), "using existing certificate");
        load(cert_path, key_path)?
    } else {
        info!(cert = %cert_path.display(), "generating a self-signed certificate");
        generate(cert_path, key_path)?
    };
    Ok(ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?)
}

type Credentials = (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>);

fn load(cert_path: &Path, key_path: &Path) -> Result<Credentials, CredentialsError> {
    let file =
        fs::File::open(cert_path).map_err(|e| CredentialsError::Read(cert_path.to_owned(), e))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CredentialsError::Read(cert_path.to_owned(), e))?;

    let file =
        fs::File::open(key_path).map_err(|e| CredentialsError::Read(key_path.to_owned(), e))?;
    let key = rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|e| CredentialsError::Read(key_path.to_owned(), e))?
        .ok_or_else(|| CredentialsError::MissingKey(key_path.to_owned()))?;

    Ok((certs, key))
}

fn generate(cert_path: &Path, key_path: &Path) -> Result<Credentials, CredentialsError> {
    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])?;

    fs::write(cert_path, cert.pem())
        .map_err(|e| CredentialsError::Write(cert_path.to_owned(), e))?;
    fs::write(key_path, key_pair.serialize_pem())
        .map_err(|e| CredentialsError::Write(key_path.to_owned(), e))?;

    let key = PrivateKeyDer::Pkcs8(key_pair.serialize_der().into());
    Ok((vec![cert.der().clone()], key))
}
