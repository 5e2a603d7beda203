//! toolboard server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), resolves the
//! sheet-service credentials, and serves the JSON API over HTTP. Credential
//! resolution failures are blocking setup errors: the server refuses to
//! start without spreadsheet access, and the error message carries the setup
//! guidance.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use toolboard_api::{AppState, ServerConfig};
use toolboard_core::{
  cache::CatalogCache,
  identity::{DerivedResolver, IdentityResolver, TrustedProxyResolver},
  ledger::VoteLedger,
};
use toolboard_sheets::{CsvSnapshot, ServiceCredentials, SheetsClient, SignupBook};

#[derive(Parser)]
#[command(author, version, about = "toolboard catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TOOLBOARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Resolve credentials and open the sheet client.
  let credentials = ServiceCredentials::resolve(&server_cfg.credentials_path)?;
  let client = SheetsClient::new(&server_cfg.catalog_url, credentials)
    .context("failed to build sheet client")?;

  // Build application state.
  let catalog = Arc::new(CatalogCache::new(
    client.clone(),
    CsvSnapshot::new(&server_cfg.snapshot_path),
    Duration::from_secs(server_cfg.cache_ttl_hours * 3600),
  ));
  let ledger = Arc::new(VoteLedger::new(
    client,
    Duration::from_secs(server_cfg.vote_status_ttl_secs),
    Duration::from_secs(server_cfg.tally_ttl_secs),
  ));
  let signups = Arc::new(SignupBook::new(&server_cfg.signup_path));
  let resolver: Arc<dyn IdentityResolver> = if server_cfg.trust_forwarded_header {
    Arc::new(TrustedProxyResolver::default())
  } else {
    Arc::new(DerivedResolver)
  };

  let state = AppState {
    catalog,
    ledger,
    signups,
    resolver,
    config: Arc::new(server_cfg.clone()),
  };

  let app = toolboard_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
