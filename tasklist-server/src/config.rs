//! Configuration system for the tasklist server.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasklist-server/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use crate::store::sqlite::DEFAULT_MAX_CONNECTIONS;

/// Errors that can occur when loading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure for the server.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerConfigFile {
    server: ServerFileConfig,
    database: DatabaseFileConfig,
    cors: CorsFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
}

/// `[database]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DatabaseFileConfig {
    url: Option<String>,
    max_connections: Option<u32>,
}

/// `[cors]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CorsFileConfig {
    allowed_origins: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the task server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "tasklist REST task service")]
pub struct ServerCliArgs {
    /// Interface to listen on.
    #[arg(long, env = "TASKLIST_HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Database connection string (`sqlite://tasks.db`, `sqlite::memory:`
    /// or `memory://`).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Upper bound on pooled database connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Origin allowed to make cross-origin requests. Repeat or
    /// comma-separate for several.
    #[arg(long = "allow-origin", env = "TASKLIST_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// Path to config file (default: `~/.config/tasklist-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKLIST_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Database connection string.
    pub database_url: String,
    /// Upper bound on pooled database connections.
    pub max_connections: u32,
    /// Origins allowed by the CORS policy.
    pub allowed_origins: Vec<String>,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite://tasklist.db".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            allowed_origins: vec![
                "http://127.0.0.1:5500".to_string(),
                "http://localhost:5500".to_string(),
            ],
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and missing file
    /// is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve a `ServerConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &ServerCliArgs, file: &ServerConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            host: cli
                .host
                .clone()
                .or_else(|| file.server.host.clone())
                .unwrap_or(defaults.host),
            port: cli.port.or(file.server.port).unwrap_or(defaults.port),
            database_url: cli
                .database_url
                .clone()
                .or_else(|| file.database.url.clone())
                .unwrap_or(defaults.database_url),
            max_connections: cli
                .max_connections
                .or(file.database.max_connections)
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_connections),
            allowed_origins: cli
                .allowed_origins
                .clone()
                .or_else(|| file.cors.allowed_origins.clone())
                .unwrap_or(defaults.allowed_origins)
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            log_level: cli.log_level.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the server.
fn load_config_file(
    explicit_path: Option<&std::path::Path>,
) -> Result<ServerConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ServerConfigFile::default());
        };
        config_dir.join("tasklist-server").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://tasklist.db");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn toml_parsing_full() {
        let toml_str = r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
url = "sqlite:///var/lib/tasklist/tasks.db"
max_connections = 8

[cors]
allowed_origins = ["https://todo.example"]
"#;
        let file: ServerConfigFile = toml::from_str(toml_str).unwrap();
        let cli = ServerCliArgs::default();
        let config = ServerConfig::resolve(&cli, &file);

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_url, "sqlite:///var/lib/tasklist/tasks.db");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.allowed_origins, ["https://todo.example"]);
    }

    #[test]
    fn toml_parsing_partial() {
        let toml_str = r"
[server]
port = 4000
";
        let file: ServerConfigFile = toml::from_str(toml_str).unwrap();
        let cli = ServerCliArgs::default();
        let config = ServerConfig::resolve(&cli, &file);

        assert_eq!(config.host, "0.0.0.0"); // default
        assert_eq!(config.port, 4000); // from file
        assert_eq!(config.database_url, "sqlite://tasklist.db"); // default
    }

    #[test]
    fn toml_parsing_empty() {
        let file: ServerConfigFile = toml::from_str("").unwrap();
        let cli = ServerCliArgs::default();
        let config = ServerConfig::resolve(&cli, &file);

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn cli_overrides_file() {
        let toml_str = r#"
[server]
port = 8080

[database]
url = "memory://"
max_connections = 0
"#;
        let file: ServerConfigFile = toml::from_str(toml_str).unwrap();
        let cli = ServerCliArgs {
            port: Some(9090),
            database_url: None, // not set on CLI, falls through to file
            max_connections: None,
            allowed_origins: Some(vec![" https://a.example ".into(), String::new()]),
            ..Default::default()
        };
        let config = ServerConfig::resolve(&cli, &file);

        assert_eq!(config.port, 9090); // from CLI
        assert_eq!(config.database_url, "memory://"); // from file
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS); // zero ignored
        assert_eq!(config.allowed_origins, ["https://a.example"]);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = load_config_file(None);
        assert!(result.is_ok());
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(std::path::Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
