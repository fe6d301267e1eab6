pub mod application;
pub mod message;
pub mod settings;
pub mod tls;
