//! Server configuration.
//!
//! Values are layered, later sources winning: built-in defaults, an optional
//! YAML file, then command-line flags (each of which also reads a `QUILL_*`
//! environment variable).
//!
//! ```yaml
//! server:
//!   address: 0.0.0.0
//!   port: 8080
//!   workers: 4
//!   shutdown_grace_secs: 5
//! static_files:
//!   root: ./public
//! log_level: info
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Runtime worker threads; must be at least 1
    pub workers: usize,
    /// How long in-flight connections may drain after a shutdown signal
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root all request paths are resolved against
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: StaticFilesConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            shutdown_grace_secs: 5,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public"),
        }
    }
}

/// Command-line surface of the server binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "quill", version, about = "Minimal HTTP/1.0 static file server")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "QUILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "QUILL_ADDRESS")]
    pub address: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "QUILL_PORT")]
    pub port: Option<u16>,

    /// Document root
    #[arg(short, long, env = "QUILL_ROOT")]
    pub root: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, env = "QUILL_WORKERS")]
    pub workers: Option<usize>,

    /// Log level
    #[arg(long, env = "QUILL_LOG")]
    pub log_level: Option<String>,
}

impl Config {
    /// Builds the effective configuration for a parsed command line.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(address) = &cli.address {
            cfg.server.address = address.clone();
        }
        if let Some(port) = cli.port {
            cfg.server.port = port;
        }
        if let Some(root) = &cli.root {
            cfg.static_files.root = root.clone();
        }
        if let Some(workers) = cli.workers {
            cfg.server.workers = workers;
        }
        if let Some(level) = &cli.log_level {
            cfg.log_level = level.clone();
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(yaml)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.server.workers >= 1, "server.workers must be at least 1");
        ensure!(!self.server.address.is_empty(), "server.address must not be empty");
        self.log_level()?;
        Ok(())
    }

    /// Resolves `address:port` to the first matching socket address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        (self.server.address.as_str(), self.server.port)
            .to_socket_addrs()
            .with_context(|| format!("cannot resolve {}:{}", self.server.address, self.server.port))?
            .next()
            .with_context(|| format!("no address found for {}", self.server.address))
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }
}
