use std::path::Path;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::mixpanel::{Endpoints, HttpSettings};

/// Prefix for environment overrides, e.g. `MIXPANEL_MCP_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "MIXPANEL_MCP";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on (HTTP transport)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind (HTTP transport)
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Transport to serve MCP on
    #[arg(long, value_enum, env = "MCP_TRANSPORT")]
    pub transport: Option<Transport>,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
    Stdio,
}

impl Transport {
    fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Stdio => "stdio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub mixpanel: MixpanelConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub transport: Transport,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MixpanelConfig {
    #[serde(default)]
    pub endpoints: Endpoints,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout for outbound Mixpanel calls; unset keeps the
    /// transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: Some(self.user_agent.clone()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layering, lowest to highest: defaults, config file, `MIXPANEL_MCP_*`
    /// environment, CLI flags (and their env fallbacks).
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.transport", "http")?
            .set_default(
                "http.user_agent",
                concat!("mixpanel-mcp/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("logging.format", "pretty")?;

        // 2. Config file: explicit path must exist, ./config.yaml is optional
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml));
        }

        // 3. Environment, e.g. MIXPANEL_MCP_HTTP__TIMEOUT_SECS=30
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI overrides
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(transport) = cli.transport {
            builder = builder.set_override("server.transport", transport.as_str())?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.as_str())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let config = AppConfig::load_from_args([
            "mixpanel-mcp",
            "--port",
            "8181",
            "--transport",
            "stdio",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_http_settings() {
        let http = HttpConfig {
            timeout_secs: Some(15),
            user_agent: "ua".into(),
        };
        let settings = http.settings();
        assert_eq!(settings.timeout, Some(Duration::from_secs(15)));
        assert_eq!(settings.user_agent.as_deref(), Some("ua"));
    }

    #[test]
    fn test_rejects_unknown_transport() {
        assert!(AppConfig::load_from_args(["mixpanel-mcp", "--transport", "grpc"]).is_err());
    }
}
