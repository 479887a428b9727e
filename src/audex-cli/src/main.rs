use anyhow::{Context, Result};
use audex_bridge::{Bridge, BridgeOptions, ChannelDispatcher, MethodCall, Outcome};
use audex_core::query::{QueryKind, ScopeSelector};
use audex_core::record::Record;
use audex_core::{init_logging, AppDirs, Config};
use clap::{Parser, Subcommand, ValueEnum};
use memory_source::MemorySource;
use serde_json::json;
use std::sync::{mpsc, Arc};

#[derive(Debug, Parser)]
#[command(name = "audex", version, about = "Media index bridge demo")]
struct Cli {
    /// Query the internal volume instead of the external one
    #[arg(long, global = true)]
    internal: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one query against the bundled sample library
    Query(QueryCommand),
    /// List the method names the bridge answers
    Methods,
}

#[derive(Debug, Parser)]
struct QueryCommand {
    /// What to query
    #[arg(value_enum)]
    kind: KindArg,
    /// sortType index (per-kind table; out of range falls back to 0)
    #[arg(long, default_value_t = 0)]
    sort: i64,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Case-sensitive ordering
    #[arg(long)]
    case_sensitive: bool,
    /// Only songs under this directory
    #[arg(long)]
    path: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Songs,
    Albums,
    Artists,
    Playlists,
    Genres,
    Paths,
}

impl KindArg {
    fn method(self) -> &'static str {
        match self {
            KindArg::Songs => "querySongs",
            KindArg::Albums => "queryAlbums",
            KindArg::Artists => "queryArtists",
            KindArg::Playlists => "queryPlaylists",
            KindArg::Genres => "queryGenres",
            KindArg::Paths => "queryAllPath",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover().context("failed to locate application directories")?;
    let config = Config::load_or_default(&dirs).context("failed to load configuration")?;
    let _guard = init_logging(&config.logging, &dirs).context("failed to initialize logging")?;

    match cli.command {
        Command::Methods => {
            for method in [
                "querySongs",
                "queryAlbums",
                "queryArtists",
                "queryPlaylists",
                "queryGenres",
                "queryAllPath",
            ] {
                println!("{method}");
            }
            Ok(())
        }
        Command::Query(query) => run_query(query, cli.internal, &config),
    }
}

fn run_query(query: QueryCommand, internal: bool, config: &Config) -> Result<()> {
    let bridge = Bridge::with_options(Arc::new(sample_library()), BridgeOptions::from(config));

    let mut args = json!({
        "sortType": query.sort,
        "orderType": if query.desc { 1 } else { 0 },
        "ignoreCase": !query.case_sensitive,
        "uri": if internal { 1 } else { 0 },
    });
    if let Some(path) = &query.path {
        args["path"] = json!(path);
    }
    let call = MethodCall::new(query.kind.method(), args.as_object().unwrap().clone());

    let (tx, rx) = mpsc::channel();
    bridge.handle(&call, Arc::new(ChannelDispatcher::new(tx)));

    match rx.recv().context("bridge dropped the reply channel")? {
        Outcome::Success { records } => {
            println!("{}", serde_json::to_string_pretty(&records)?);
            tracing::info!(rows = records.len(), method = %call.method, "query complete");
        }
        Outcome::Failure { code, message, .. } => {
            anyhow::bail!("{code}: {message}");
        }
        Outcome::Unimplemented => {
            anyhow::bail!("method {} is not implemented", call.method);
        }
    }
    Ok(())
}

/// A small built-in library so the demo has something to answer with.
fn sample_library() -> MemorySource {
    fn song(id: i64, title: &str, artist: &str, album: &str, path: &str) -> Record {
        let mut record = Record::new();
        record.insert("_id", id);
        record.insert("title", title);
        record.insert("artist", artist);
        record.insert("album", album);
        record.insert("_data", path);
        record.insert(
            "_display_name",
            path.rsplit('/').next().unwrap_or(path).to_string(),
        );
        record.insert("duration", 180_000 + id * 7_000);
        record
    }

    fn named(id: i64, column: &str, value: &str) -> Record {
        let mut record = Record::new();
        record.insert("_id", id);
        record.insert(column, value);
        record
    }

    let songs = vec![
        song(1, "Northern Lights", "Aurora Drive", "Skyward", "/music/pop/northern_lights.mp3"),
        song(2, "Cold Engine", "The Valves", "Machinery", "/music/rock/cold_engine.flac"),
        song(3, "Afternoon Rain", "Aurora Drive", "Skyward", "/music/pop/afternoon_rain.mp3"),
        song(4, "Brass Monday", "City Horns", "Downtown", "/music/jazz/brass_monday.ogg"),
    ];

    let albums = vec![
        named(10, "album", "Skyward"),
        named(11, "album", "Machinery"),
        named(12, "album", "Downtown"),
    ];
    let artists = vec![
        named(20, "artist", "Aurora Drive"),
        named(21, "artist", "The Valves"),
        named(22, "artist", "City Horns"),
    ];
    let playlists = vec![named(30, "name", "Morning Mix"), named(31, "name", "Late Shift")];
    let genres = vec![
        named(40, "name", "Pop"),
        named(41, "name", "Rock"),
        named(42, "name", "Jazz"),
    ];

    MemorySource::new()
        .with_rows(QueryKind::Songs, ScopeSelector::External, songs.clone())
        .with_rows(QueryKind::PathIndex, ScopeSelector::External, songs)
        .with_rows(QueryKind::Albums, ScopeSelector::External, albums)
        .with_rows(QueryKind::Artists, ScopeSelector::External, artists)
        .with_rows(QueryKind::Playlists, ScopeSelector::External, playlists)
        .with_rows(QueryKind::Genres, ScopeSelector::External, genres)
}
