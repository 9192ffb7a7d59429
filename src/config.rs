//! Daemon configuration
//!
//! Loaded from a TOML file with a `[mavlink]` section (and an optional
//! `[gazebo]` section for the simulated camera). Invalid system or
//! component ids are logged and replaced with the defaults; a missing file
//! means built-in defaults throughout.

use std::path::Path;

use serde::Deserialize;
use tracing::error;

pub const DEFAULT_MAVLINK_PORT: u16 = 14550;
pub const DEFAULT_SYSTEM_ID: u8 = 1;
/// MAV_COMP_ID_CAMERA
pub const DEFAULT_COMPONENT_ID: u8 = 100;
pub const DEFAULT_BROADCAST_ADDR: &str = "255.255.255.255";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mavlink: MavlinkConfig,
    pub gazebo: GazeboConfig,
}

impl Config {
    /// Load and sanitize a config file; a nonexistent path yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default().sanitized());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config.sanitized())
    }

    pub fn sanitized(self) -> Config {
        Config {
            mavlink: self.mavlink.sanitized(),
            gazebo: self.gazebo,
        }
    }
}

/// `[mavlink]` section. `system_id`/`component_id` of 0 mean "not set".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MavlinkConfig {
    /// UDP bind port; also the destination port for broadcast traffic.
    pub port: u16,
    system_id: u16,
    component_id: u16,
    /// Address substituted into advertised RTSP URIs.
    pub rtsp_server_addr: Option<String>,
    /// Destination for heartbeats and broadcast replies.
    pub broadcast_addr: String,
}

impl Default for MavlinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_MAVLINK_PORT,
            system_id: 0,
            component_id: 0,
            rtsp_server_addr: None,
            broadcast_addr: DEFAULT_BROADCAST_ADDR.to_string(),
        }
    }
}

impl MavlinkConfig {
    fn sanitized(mut self) -> Self {
        if self.system_id != 0 && !(2..=254).contains(&self.system_id) {
            error!(
                system_id = self.system_id,
                "invalid MAVLink system id, using default {DEFAULT_SYSTEM_ID}"
            );
            self.system_id = 0;
        }
        if self.component_id != 0 && !(2..=254).contains(&self.component_id) {
            error!(
                component_id = self.component_id,
                "invalid MAVLink component id, using default MAV_COMP_ID_CAMERA ({DEFAULT_COMPONENT_ID})"
            );
            self.component_id = 0;
        }
        if self.broadcast_addr.len() > 16 || self.broadcast_addr.parse::<std::net::Ipv4Addr>().is_err()
        {
            error!(
                broadcast_addr = %self.broadcast_addr,
                "invalid broadcast address, using default {DEFAULT_BROADCAST_ADDR}"
            );
            self.broadcast_addr = DEFAULT_BROADCAST_ADDR.to_string();
        }
        self
    }

    pub fn system_id(&self) -> u8 {
        if self.system_id == 0 {
            DEFAULT_SYSTEM_ID
        } else {
            self.system_id as u8
        }
    }

    pub fn component_id(&self) -> u8 {
        if self.component_id == 0 {
            DEFAULT_COMPONENT_ID
        } else {
            self.component_id as u8
        }
    }
}

/// `[gazebo]` section controlling the simulated camera plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GazeboConfig {
    pub enable: bool,
    pub uri: String,
}

impl Default for GazeboConfig {
    fn default() -> Self {
        Self {
            enable: false,
            uri: crate::camera::gazebo::DEFAULT_GAZEBO_URI.to_string(),
        }
    }
}
