//! geoclient: live dispatch map client.
//!
//! Polls the geobroker API for units and incidents, keeps a live marker set
//! for each, and reports every change through `tracing`.

mod api;
mod config;
mod poller;
mod session;
mod status;
mod surface;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use livemap::fade::FadeOptions;
use livemap::layer::{DynamicLayer, IncidentKind, UnitKind};
use livemap::live::LiveMap;
use livemap::model::Position;
use livemap::timestamp::{self, TimestampError};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{ApiClient, ApiError};
use crate::config::{Config, ConfigError};
use crate::session::Session;
use crate::surface::TraceSurface;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] TimestampError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("no snapshot received")]
    NoSnapshot,
}

#[derive(Parser, Debug)]
#[command(name = "geoclient", about = "Live dispatch map client")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, env = "GEOCLIENT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Server that relative API URLs are resolved against.
    #[arg(long, env = "GEOCLIENT_SERVER", default_value = "http://127.0.0.1:8080", global = true)]
    server: String,

    /// API base URL; overrides the configuration file.
    #[arg(long, env = "GEOCLIENT_API_URL", global = true)]
    api_url: Option<String>,

    /// Unit id to authenticate as.
    #[arg(long, env = "GEOCLIENT_ID", global = true)]
    id: Option<String>,

    #[arg(long, env = "GEOCLIENT_TOKEN", global = true)]
    token: Option<String>,

    #[arg(long, env = "GEOCLIENT_CENTER_MODE", global = true)]
    center_mode: bool,

    #[arg(long, env = "GEOCLIENT_SEND_LOCATION", global = true)]
    send_location: bool,

    #[arg(long, env = "GEOCLIENT_HIDE_BUSY_UNITS", global = true)]
    hide_busy_units: bool,

    #[arg(long, env = "GEOCLIENT_CLUSTER_UNITS", global = true)]
    cluster_units: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, env = "GEOCLIENT_DEBUG", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the API and keep the live map in sync (default).
    Run,
    /// Fetch and reconcile one snapshot, then print the derived scope as JSON.
    Scope,
    /// Send one own-position update.
    Position {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Accuracy radius in meters.
        #[arg(long)]
        accuracy: Option<f64>,
        #[arg(long)]
        heading: Option<f64>,
        #[arg(long)]
        speed: Option<f64>,
    },
}

impl Cli {
    fn session(&self) -> Session {
        Session {
            id: self.id.clone(),
            token: self.token.clone(),
            center_mode: self.center_mode,
            send_location: self.send_location,
            hide_busy_units: self.hide_busy_units,
            cluster_units: self.cluster_units,
            debug: self.debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let session = cli.session();

    let default_level = if session.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring unreadable .env"),
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config.api_url.clone_from(api_url);
    }
    let client = ApiClient::new(&config.api_url, &cli.server, &session)?;

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, &session, &client).await,
        Command::Scope => print_scope(&config, &session, &client).await,
        Command::Position { lat, lng, accuracy, heading, speed } => {
            let position = Position {
                latitude: lat,
                longitude: lng,
                timestamp: timestamp::format(OffsetDateTime::now_utc())?,
                accuracy,
                heading,
                speed,
            };
            send_position(&client, &position).await
        }
    };
    if let Err(e) = &result {
        error!(error = %e, "geoclient failed");
    }
    result
}

/// Build the live map with log-backed surfaces and the session's layer toggles.
fn build_map(config: &Config, session: &Session) -> LiveMap {
    let now = OffsetDateTime::now_utc();
    let mut units = DynamicLayer::new(UnitKind::new(FadeOptions::default()), Box::new(TraceSurface::new("units")));
    units.set_cluster_surface(Box::new(TraceSurface::new("units-clustered")));
    units.set_hide_busy_units(session.effective_hide_busy_units(), now);
    units.set_cluster_units(session.effective_cluster_units(), now);

    let incidents = DynamicLayer::new(IncidentKind, Box::new(TraceSurface::new("incidents")));
    LiveMap::new(config.scope_settings(session.id().map(ToOwned::to_owned)), units, incidents)
}

async fn run(config: &Config, session: &Session, client: &ApiClient) -> Result<(), CliError> {
    if !session.authenticated() {
        warn!("no unit id and token given; nothing will be fetched");
    }
    info!(
        center = %format!("{},{}", config.initial_position.lat, config.initial_position.lng),
        zoom = config.initial_zoom,
        center_mode = session.center_mode,
        locate = session.do_locate(),
        "starting live map"
    );
    let mut map = build_map(config, session);
    let applied = poller::run(client, &mut map, config.refresh_interval, shutdown_signal()).await;
    info!(applied, connection = ?client.status().state(), "live map stopped");
    Ok(())
}

async fn print_scope(config: &Config, session: &Session, client: &ApiClient) -> Result<(), CliError> {
    if !session.authenticated() {
        return Err(ApiError::NotAuthenticated.into());
    }
    let mut map = build_map(config, session);
    poller::poll_once(client, &mut map).await.ok_or(CliError::NoSnapshot)?;
    println!("{}", serde_json::to_string_pretty(map.data())?);
    Ok(())
}

async fn send_position(client: &ApiClient, position: &Position) -> Result<(), CliError> {
    client.send_position(position).await?;
    info!(lat = position.latitude, lng = position.longitude, "position sent");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for ctrl-c; polling until killed");
        std::future::pending::<()>().await;
    }
}
