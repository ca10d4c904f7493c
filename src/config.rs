//! Runtime configuration, read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `POSTS_HOST` | `0.0.0.0` |
//! | `POSTS_PORT` | `5002` |
//! | `CORS_ALLOWED_ORIGINS` | `*` (comma-separated list otherwise) |
//!
//! `RUST_LOG` is read by the log filter in `main`, not here.

use std::net::{IpAddr, SocketAddr};

use crate::error::Error;
use crate::middleware::Cors;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let port = match lookup("POSTS_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("POSTS_PORT must be a port number, got `{raw}`"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup("POSTS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_owned()),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        let ip: IpAddr = self.host.trim().parse().map_err(|_| {
            Error::Config(format!("POSTS_HOST must be an IP address, got `{}`", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn cors(&self) -> Cors {
        Cors::from_list(&self.cors_allowed_origins)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            cors_allowed_origins: "*".to_owned(),
        }
    }
}
