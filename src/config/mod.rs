// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ForwardConfig, LoggingConfig, PathsConfig, PerformanceConfig, ServerConfig,
    DEFAULT_TARGET_URL,
};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `MEDIA_RELAY_SERVER__PORT=9000`
const ENV_PREFIX: &str = "MEDIA_RELAY";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error, the built-in defaults apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_prefix(config_path, ENV_PREFIX)
    }

    fn load_with_prefix(config_path: &str, env_prefix: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("paths.root", defaults.paths.root.to_string_lossy().into_owned())?
            .set_default("paths.files_dir", defaults.paths.files_dir)?
            .set_default("paths.images_dir", defaults.paths.images_dir)?
            .set_default("paths.poem_dir", defaults.paths.poem_dir)?
            .set_default("paths.music_dir", defaults.paths.music_dir)?
            .set_default("forward.target_url", defaults.forward.target_url)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default("performance.keep_alive", defaults.performance.keep_alive)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would panic the runtime or fail every request
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if self.forward.timeout_secs == Some(0) {
            return Err(config::ConfigError::Message(
                "forward.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
