use anyhow::Result;
use config as config_loader;
use dotenvy::dotenv;
use serde::Deserialize;
use std::path::Path;

/// Global config structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// RPC related config
#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    pub url: String,
    #[serde(default = "RpcConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RpcConfig {
    fn default_timeout_secs() -> u64 {
        15
    }
}

/// HTTP listener config
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_listen_addr")]
    pub listen_addr: String,
}

impl ServerConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:5051".to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
        }
    }
}

/// Page assembly config
#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerConfig {
    /// Receipts fetched in parallel within one block
    #[serde(default = "ExplorerConfig::default_receipt_concurrency")]
    pub receipt_concurrency: usize,
    /// Upper bound for assembling one home page
    #[serde(default = "ExplorerConfig::default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

impl ExplorerConfig {
    fn default_receipt_concurrency() -> usize {
        4
    }
    fn default_page_timeout_secs() -> u64 {
        30
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            receipt_concurrency: Self::default_receipt_concurrency(),
            page_timeout_secs: Self::default_page_timeout_secs(),
        }
    }
}

/// Logging config
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub to_file: bool,
    #[serde(default = "LoggingConfig::default_file_path")]
    pub file_path: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_file_path() -> String {
        "./logs/explorer.log".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            to_file: false,
            file_path: Self::default_file_path(),
        }
    }
}

/// Metrics config
#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "MetricsConfig::default_prometheus_exporter_port")]
    pub prometheus_exporter_port: u16,
}

impl MetricsConfig {
    fn default_prometheus_exporter_port() -> u16 {
        9100
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable: false,
            prometheus_exporter_port: Self::default_prometheus_exporter_port(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenv().ok(); // Load the .env file

        if !path.as_ref().exists() {
            anyhow::bail!("Config file not found: {:?}", path.as_ref());
        }

        // Use config crate to parse the config file
        let builder = config_loader::Config::builder()
            .add_source(config_loader::File::from(path.as_ref().to_path_buf()))
            .add_source(config_loader::Environment::with_prefix("EXPLORER").separator("__"))
            .build()?;

        Ok(builder.try_deserialize::<AppConfig>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_applies_defaults() -> Result<()> {
        let file = write_config("rpc:\n  url: \"http://127.0.0.1:8545\"\n");
        let cfg = AppConfig::load(file.path())?;

        assert_eq!(cfg.rpc.url, "http://127.0.0.1:8545");
        assert_eq!(cfg.rpc.timeout_secs, 15);
        assert_eq!(cfg.server.listen_addr, "0.0.0.0:5051");
        assert_eq!(cfg.explorer.receipt_concurrency, 4);
        assert_eq!(cfg.explorer.page_timeout_secs, 30);
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.to_file);
        assert!(!cfg.metrics.enable);
        Ok(())
    }

    #[test]
    fn load_reads_explicit_values() -> Result<()> {
        let file = write_config(
            "rpc:\n  url: \"http://node:8545\"\n  timeout_secs: 3\n\
             explorer:\n  receipt_concurrency: 16\n  page_timeout_secs: 5\n\
             logging:\n  level: \"debug\"\n",
        );
        let cfg = AppConfig::load(file.path())?;

        assert_eq!(cfg.rpc.timeout_secs, 3);
        assert_eq!(cfg.explorer.receipt_concurrency, 16);
        assert_eq!(cfg.explorer.page_timeout_secs, 5);
        assert_eq!(cfg.logging.level, "debug");
        Ok(())
    }

    #[test]
    fn load_fails_for_missing_file() {
        let err = AppConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
