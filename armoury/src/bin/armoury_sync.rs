//! Sync publisher reference data into the local store and inspect results.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use armoury::config::ArmourySettings;
use armoury::domain::ports::LocalStore;
use armoury::domain::{ArmyImportService, ArmyQueryService, SyncService};
use armoury::outbound::persistence::{
    DieselArmyRepository, DieselMetadataRepository, DieselSettingsRepository, SqliteStore,
};
use armoury::outbound::publisher::PublisherHttpSource;
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `armoury-sync` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "armoury-sync",
    about = "Download, store and inspect publisher army reference data",
    version
)]
struct CliArgs {
    /// SQLite database file. Overrides `ARMOURY_DATABASE_PATH`.
    #[arg(long = "database", value_name = "path", global = true)]
    database_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Refresh metadata and every faction army when the weekly gate allows.
    Sync {
        /// Run even if the last attempt was less than seven days ago.
        #[arg(long)]
        force: bool,
    },
    /// Import one faction's army document from a local file.
    ImportArmy {
        /// Faction id the document belongs to.
        #[arg(long = "faction", value_name = "id")]
        faction_id: i64,
        /// Path to the army JSON document.
        #[arg(long = "file", value_name = "path")]
        file: PathBuf,
    },
    /// Print the derived view of one stored unit.
    ShowUnit {
        /// Faction id the unit was imported for.
        #[arg(long = "faction", value_name = "id")]
        faction_id: i64,
        /// Publisher unit id.
        #[arg(long = "unit", value_name = "id")]
        unit_id: i64,
    },
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = ArmourySettings::load_from_iter([OsString::from("armoury-sync")])
        .map_err(|error| io::Error::other(format!("load configuration: {error}")))?;
    let database_path = args
        .database_path
        .clone()
        .unwrap_or_else(|| settings.database_path());

    let store = SqliteStore::open(&database_path);
    store
        .initialize()
        .await
        .map_err(|error| io::Error::other(format!("open local store: {error}")))?;
    let metadata = Arc::new(DieselMetadataRepository::new(store.clone()));
    let armies = Arc::new(DieselArmyRepository::new(store.clone()));
    let preferences = Arc::new(DieselSettingsRepository::new(store.clone()));
    let cancel = CancellationToken::new();

    match args.command {
        Command::Sync { force } => {
            let endpoints = settings.endpoints().map_err(io::Error::other)?;
            let timeout = settings.request_timeout().map_err(io::Error::other)?;
            let source = PublisherHttpSource::new(endpoints, timeout)
                .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
            let service = SyncService::new(
                Arc::new(source),
                metadata,
                armies,
                Arc::new(store),
                preferences,
                Arc::new(DefaultClock),
            );
            let outcome = if force {
                service.run_forced(&cancel).await
            } else {
                service.run(&cancel).await
            }
            .map_err(|error| io::Error::other(format!("sync failed: {error}")))?;
            print_json(&outcome)
        }
        Command::ImportArmy { faction_id, file } => {
            let service = ArmyImportService::new(armies, Arc::new(DefaultClock));
            let summary = service
                .import_faction_army_from_file(faction_id, &file, &cancel)
                .await
                .map_err(|error| io::Error::other(format!("army import failed: {error}")))?;
            print_json(&summary)
        }
        Command::ShowUnit {
            faction_id,
            unit_id,
        } => {
            let service = ArmyQueryService::new(armies, metadata, preferences);
            let view = service
                .unit_view(faction_id, unit_id)
                .await
                .map_err(|error| io::Error::other(format!("show unit failed: {error}")))?;
            print_json(&view)
        }
    }
}

fn render_json<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[expect(clippy::print_stdout, reason = "JSON results are the command's output")]
fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use armoury::domain::DisplayUnits;
    use rstest::rstest;

    #[rstest]
    fn renders_pretty_json() {
        let text = render_json(&serde_json::json!({ "factionId": 10 })).expect("renders");
        assert_eq!(text, "{\n  \"factionId\": 10\n}");
    }

    #[rstest]
    fn renders_enums_in_stored_form() {
        let text = render_json(&DisplayUnits::Centimeters).expect("renders");
        assert_eq!(text, "\"centimeters\"");
    }
}
