//! Server configuration from the environment.

use anyhow::Context;
use std::net::SocketAddr;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Read `SERVER_ADDR`, falling back to [`DEFAULT_ADDR`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_addr(std::env::var("SERVER_ADDR").ok().as_deref())
    }

    fn from_addr(addr: Option<&str>) -> anyhow::Result<Self> {
        let raw = addr.unwrap_or(DEFAULT_ADDR);
        let addr = raw
            .parse()
            .with_context(|| format!("Invalid SERVER_ADDR: {raw}"))?;
        Ok(Self { addr })
    }
}
