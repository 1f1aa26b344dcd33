//! Runtime configuration read from the environment.
//!
//! Values may also come from a `.env` file in the working directory.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::{Result, SyncError};

/// Default HTTP/WebSocket port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind address (all interfaces, so phones on the LAN can connect).
pub const DEFAULT_HOST: &str = "0.0.0.0";

const HOST_VAR: &str = "STATESYNC_HOST";
const PORT_VAR: &str = "STATESYNC_PORT";
const DB_VAR: &str = "STATESYNC_DB";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = match lookup(HOST_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SyncError::Config(format!("{HOST_VAR} is not an IP address: {raw}")))?,
            None => DEFAULT_HOST
                .parse()
                .map_err(|_| SyncError::Config(format!("bad default host {DEFAULT_HOST}")))?,
        };

        let port: u16 = match lookup(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SyncError::Config(format!("{PORT_VAR} must be a port number: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let db_path = lookup(DB_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        Ok(Self {
            host,
            port,
            db_path,
        })
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Returns `<data_dir>/statesync/state.db`.
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("statesync")
        .join("state.db")
}
