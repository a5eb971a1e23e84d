//! Supernode routing configuration section.
//!
//! ```toml
//! [SupernodeRouting]
//! Servers = ["/memory/1/p2p/12D3KooW..."]
//! ```

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    node::{AddressError, RemoteAddress},
    routing::RoutingOption,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid supernode server address `{addr}`: {source}")]
    InvalidServer {
        addr: String,
        #[source]
        source: AddressError,
    },
}

/// Remote routing servers a client node forwards to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupernodeRoutingConfig {
    /// Server multiaddrs, each ending in `/p2p/<peer-id>`
    #[serde(default)]
    pub servers: Vec<String>,
}

impl SupernodeRoutingConfig {
    pub fn with_servers<I, S>(servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { servers: servers.into_iter().map(Into::into).collect() }
    }

    /// Parsed server addresses, failing on the first malformed entry
    pub fn server_addresses(&self) -> Result<Vec<RemoteAddress>, ConfigError> {
        self.servers
            .iter()
            .map(|addr| {
                addr.parse::<RemoteAddress>()
                    .map_err(|source| ConfigError::InvalidServer { addr: addr.clone(), source })
            })
            .collect()
    }

    /// Client routing option over the configured servers
    pub fn client_option(&self) -> Result<RoutingOption, ConfigError> {
        Ok(RoutingOption::client(self.server_addresses()?))
    }
}

/// Configuration file holding the routing section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfigFile {
    #[serde(rename = "SupernodeRouting", default)]
    pub supernode_routing: SupernodeRoutingConfig,
}

impl RoutingConfigFile {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read a config file from `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Serialize and write the config to `path`, creating parent directories
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let raw = toml::to_string_pretty(self)?;
        let write_error = |source: io::Error| ConfigError::Write { path: path.display().to_string(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, raw).map_err(write_error)
    }
}
