//! Command-line client for the civilization map service.
//!
//! # Responsibility
//! - Drive a `MapSession` against the live REST service.
//! - Print the projected markers so the map state can be inspected
//!   without a browser.

use anyhow::{bail, Context, Result};
use civmap_core::{
    connect, core_version, init_default_icons, init_logging, ClientConfig, CivilizationApi,
    DefaultMarkerIcons, DraftEdit, ImagePayload, MapSession, Marker,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "civmap", version, about = "Civilization world map client")]
struct Cli {
    /// Root URL of the civilization REST service.
    #[arg(long, env = "CIVMAP_API_BASE_URL")]
    api_url: Option<String>,
    /// Prefix for relative image references. Defaults to the API URL.
    #[arg(long, env = "CIVMAP_MEDIA_BASE_URL")]
    media_url: Option<String>,
    /// Per-request timeout in seconds. Requests wait indefinitely when unset.
    #[arg(long, env = "CIVMAP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    #[arg(long, env = "CIVMAP_LOG_LEVEL")]
    log_level: Option<String>,
    /// Directory for rotating log files. Logs go to stderr when unset.
    #[arg(long, env = "CIVMAP_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List civilizations as map markers.
    Markers,
    /// Create a civilization.
    Create(CreateArgs),
    /// Edit an existing civilization through its popup editor.
    Update(UpdateArgs),
    /// Delete a civilization.
    Delete { id: i64 },
    /// Print the core version.
    Version,
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Image file uploaded alongside the record.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: i64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
    #[arg(long)]
    image: Option<PathBuf>,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env().context("invalid CIVMAP_* environment")?;
        if let Some(api_url) = &self.api_url {
            let media_base_url = config.media_base_url.clone();
            let inherits_media = config.media_base_url == config.api_base_url;
            config.api_base_url = civmap_core::config::parse_base_url("--api-url", api_url)?;
            config.media_base_url = if inherits_media {
                config.api_base_url.clone()
            } else {
                media_base_url
            };
        }
        if let Some(media_url) = &self.media_url {
            config.media_base_url = civmap_core::config::parse_base_url("--media-url", media_url)?;
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                bail!("--timeout-secs must be positive");
            }
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(level) = &self.log_level {
            config.log.level = civmap_core::logging::normalize_level(level)
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(dir) = &self.log_dir {
            config.log.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Command::Version = cli.command {
        println!("civmap_core version={}", core_version());
        return Ok(());
    }

    let config = cli.client_config()?;
    init_logging(&config.log).map_err(anyhow::Error::msg)?;
    init_default_icons(DefaultMarkerIcons::builtin()).map_err(anyhow::Error::msg)?;
    info!(
        "event=cli_start module=cli status=ok api={}",
        config.api_base_url
    );

    let session = connect(&config).context("failed to build http client")?;
    session.mount().await.context("failed to list civilizations")?;

    match cli.command {
        Command::Markers => print_markers(&session.markers()),
        Command::Create(args) => create(&session, args).await?,
        Command::Update(args) => update(&session, args).await?,
        Command::Delete { id } => {
            session
                .delete(id)
                .await
                .with_context(|| format!("failed to delete civilization {id}"))?;
            print_markers(&session.markers());
        }
        Command::Version => {}
    }
    Ok(())
}

async fn create<A: CivilizationApi>(session: &MapSession<A>, args: CreateArgs) -> Result<()> {
    session.edit_new(DraftEdit::Name(args.name));
    session.edit_new(DraftEdit::Description(args.description));
    session.edit_new(DraftEdit::Latitude(args.lat));
    session.edit_new(DraftEdit::Longitude(args.lon));
    if let Some(path) = args.image {
        session.edit_new(DraftEdit::Image(load_image(&path).await?));
    }
    session
        .submit_new()
        .await
        .context("failed to create civilization")?;
    print_markers(&session.markers());
    Ok(())
}

async fn update<A: CivilizationApi>(session: &MapSession<A>, args: UpdateArgs) -> Result<()> {
    let id = args.id;
    session.open_editor(id)?;
    let mut edits = Vec::new();
    if let Some(name) = args.name {
        edits.push(DraftEdit::Name(name));
    }
    if let Some(description) = args.description {
        edits.push(DraftEdit::Description(description));
    }
    if let Some(lat) = args.lat {
        edits.push(DraftEdit::Latitude(lat));
    }
    if let Some(lon) = args.lon {
        edits.push(DraftEdit::Longitude(lon));
    }
    if let Some(path) = args.image {
        edits.push(DraftEdit::Image(load_image(&path).await?));
    }
    for edit in edits {
        session.edit(id, edit);
    }
    session
        .submit_edit(id)
        .await
        .with_context(|| format!("failed to update civilization {id}"))?;
    print_markers(&session.markers());
    Ok(())
}

async fn load_image(path: &Path) -> Result<ImagePayload> {
    ImagePayload::from_path(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))
}

fn print_markers(markers: &[Marker]) {
    for marker in markers {
        println!(
            "{}\t{:.4}\t{:.4}\t{}\t{}",
            marker.id,
            marker.position.latitude,
            marker.position.longitude,
            marker.popup.title,
            marker.icon.url()
        );
    }
}
