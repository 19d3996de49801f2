// Configuration module entry point
// Layered load (defaults, optional TOML file, environment overrides)
// plus the startup validation that makes bad config fatal before the
// listener ever binds.

mod types;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Re-export public types
pub use types::{
    Config, HttpConfig, LoggingConfig, ServerConfig, ShareConfig, TransferConfig, TunnelConfig,
};

/// Fatal configuration problems. These stop startup; once the server is
/// running the config is an immutable value and nothing raises this.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config load failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid listen address {addr}: {reason}")]
    Address { addr: String, reason: String },

    #[error("share root {path}: {reason}")]
    ShareRoot { path: String, reason: String },

    #[error("unknown transfer preset {0:?} (expected maximum, balanced, conservative or custom)")]
    UnknownPreset(String),

    #[error("could not render default config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Config {
    /// Load configuration from the given file path (without extension).
    ///
    /// Missing file is fine; defaults plus `QUICKSERVE_`-prefixed
    /// environment overrides still apply.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("QUICKSERVE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Listen address from host and port.
    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|e| ConfigError::Address {
            addr,
            reason: format!("{e}"),
        })
    }

    /// Check everything that must hold before the server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.transfer.preset.as_str() {
            "maximum" | "balanced" | "conservative" | "custom" => {}
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        }
        self.get_socket_addr()?;
        Ok(())
    }

    /// Make sure the share root is a readable directory, creating it when
    /// configured to, and hand back its path.
    pub fn prepare_share_root(&self) -> Result<PathBuf, ConfigError> {
        let path = Path::new(&self.share.root);

        if !path.exists() {
            if self.share.create_if_missing {
                std::fs::create_dir_all(path).map_err(|e| ConfigError::Io {
                    context: format!("creating share root {}", self.share.root),
                    source: e,
                })?;
            } else {
                return Err(ConfigError::ShareRoot {
                    path: self.share.root.clone(),
                    reason: "does not exist".to_string(),
                });
            }
        }

        let meta = std::fs::metadata(path).map_err(|e| ConfigError::Io {
            context: format!("inspecting share root {}", self.share.root),
            source: e,
        })?;
        if !meta.is_dir() {
            return Err(ConfigError::ShareRoot {
                path: self.share.root.clone(),
                reason: "not a directory".to_string(),
            });
        }

        // Readability probe; an unreadable root should fail now, not on
        // the first request.
        std::fs::read_dir(path).map_err(|e| ConfigError::ShareRoot {
            path: self.share.root.clone(),
            reason: format!("not readable: {e}"),
        })?;

        Ok(path.to_path_buf())
    }

    /// Write a starter config file with every default spelled out.
    pub fn write_default(path: &str) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, rendered).map_err(|e| ConfigError::Io {
            context: format!("writing {path}"),
            source: e,
        })?;
        Ok(())
    }
}
