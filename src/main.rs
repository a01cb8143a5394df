use std::path::PathBuf;

use clap::Parser;

use http_reflector::config::{load_config, validate_config, ConfigError, ReflectorConfig, TlsConfig};
use http_reflector::observability::logging;

/// Reflect incoming HTTP requests back to the client.
#[derive(Parser)]
#[command(name = "http-reflector", version, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:8080.
    #[arg(short, long)]
    listen: Option<String>,

    /// Request body bytes to capture; zero or negative disables capture.
    #[arg(long, allow_negative_numbers = true)]
    body_limit: Option<i64>,

    /// PEM certificate; enables TLS together with --tls-key.
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<String>,

    /// PEM private key.
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<String>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ReflectorConfig) {
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(limit) = self.body_limit {
            config.capture.body_limit = limit;
        }
        if let (Some(cert_path), Some(key_path)) = (self.tls_cert, self.tls_key) {
            config.listener.tls = Some(TlsConfig { cert_path, key_path });
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReflectorConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        body_limit = config.capture.body_limit,
        request_timeout_secs = config.timeouts.request_secs,
        "http-reflector starting"
    );

    http_reflector::lifecycle::start(config).await?;
    Ok(())
}
