use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::core::{
    alerts::{
        cache::AssetCache,
        playback::{default_player, TokioDispatcher},
        scheduler::AlertScheduler,
        tts::GoogleTts,
    },
    catalog::{bridge::ListView, model::CatalogModel},
    classifier::{EventClassifier, MonsterTable},
    config::{AlarmPaths, ConfigManager, Settings},
    engine::Engine,
    error::{AlarmError, Result},
    parser::{self, FeedEvent},
    record::store::{ConfigStore, Profile},
};

#[derive(Parser, Debug)]
#[command(
    name = "custom-alarms",
    about = "Text-to-speech alarms for unique monster spawns",
    version
)]
struct Cli {
    /// Folder that holds the [custom_alarms] directory (default: ~/.config)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// JSON object mapping monster ids to names
    #[arg(short, long)]
    monsters: Option<PathBuf>,

    /// JSON-lines event feed; stdin when omitted
    #[arg(short, long)]
    feed: Option<PathBuf>,

    /// Server of the character to load on start
    #[arg(long, requires = "character")]
    server: Option<String>,

    /// Character to load on start
    #[arg(long, requires = "server")]
    character: Option<String>,
}

impl Cli {
    fn initial_profile(&self) -> Option<Profile> {
        match (&self.server, &self.character) {
            (Some(server), Some(character)) => Some(Profile::new(server.as_str(), character.as_str())),
            _ => None,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_monsters(path: Option<&Path>) -> MonsterTable {
    let Some(path) = path else {
        log::warn!("No monster table given, every spawn notice will be skipped");
        return MonsterTable::default();
    };
    match MonsterTable::load(path) {
        Ok(table) => {
            log::info!("Loaded {} monster names from {:?}", table.len(), path);
            table
        }
        Err(e) => {
            log::warn!("Could not read monster table {:?}: {}", path, e);
            MonsterTable::default()
        }
    }
}

async fn forward_lines<R: AsyncBufRead + Unpin>(
    reader: R,
    tx: mpsc::Sender<FeedEvent>,
) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(event) = parser::parse_line(&line) {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    }
    Ok(())
}

async fn read_feed(path: Option<PathBuf>, tx: mpsc::Sender<FeedEvent>) -> Result<()> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            log::info!("Reading events from {:?}", path);
            forward_lines(BufReader::new(file), tx).await
        }
        None => forward_lines(BufReader::new(tokio::io::stdin()), tx).await,
    }
}

/// Owns the engine for the whole run. Every catalog and record mutation
/// happens on this one thread.
fn drive_engine(
    mut rx: mpsc::Receiver<FeedEvent>,
    paths: AlarmPaths,
    settings: Settings,
    monsters: MonsterTable,
    profile: Option<Profile>,
    handle: Handle,
) -> Result<()> {
    let scheduler = AlertScheduler::new(
        settings.cooldown(),
        AssetCache::new(paths.asset_dir().to_path_buf()),
        Box::new(GoogleTts::new(&settings)?),
        default_player(),
        Box::new(TokioDispatcher::new(handle)),
    );
    let catalog = CatalogModel::new(
        ConfigStore::new(paths.config_dir().to_path_buf()),
        ListView::new(),
    );
    let mut engine = Engine::new(catalog, EventClassifier::new(Box::new(monsters)), scheduler);

    if let Some(profile) = profile {
        engine.on_character_loaded(&profile.server, &profile.character);
    }

    while let Some(event) = rx.blocking_recv() {
        match event {
            FeedEvent::CharacterLoaded { server, character } => {
                engine.on_character_loaded(&server, &character)
            }
            FeedEvent::Spawn(spawn) => {
                let report = engine.on_spawn_event(&spawn);
                log::debug!("{:?} -> {:?}", spawn, report);
            }
            FeedEvent::Action(action) => engine.on_user_action(action),
        }
    }

    log::info!(
        "Feed ended. Possible uniques: {:?}. Alarm list: {:?}.",
        engine.catalog().catalog(),
        engine.catalog().alarms()
    );
    Ok(())
}

fn run_with(cli: Cli) -> Result<()> {
    let base_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(AlarmPaths::default_base_dir);
    let paths = AlarmPaths::new(&base_dir);
    paths.ensure()?;

    let settings = ConfigManager::new(paths.config_dir()).load_or_init();
    let monsters = load_monsters(cli.monsters.as_deref());
    let profile = cli.initial_profile();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (tx, rx) = mpsc::channel(32);
        let handle = Handle::current();
        let engine_task = tokio::task::spawn_blocking(move || {
            drive_engine(rx, paths, settings, monsters, profile, handle)
        });

        let fed = read_feed(cli.feed, tx).await;
        let driven = match engine_task.await {
            Ok(result) => result,
            Err(e) => Err(AlarmError::Io(io::Error::new(io::ErrorKind::Other, e))),
        };
        fed.and(driven)
    })
    // Dropping the runtime waits for alarms that are still playing.
}

pub fn run() {
    init_logging();
    let cli = Cli::parse();
    log::info!("[Custom Alarms] v.{} ~ loaded.", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_with(cli) {
        log::error!("[Custom Alarms] stopped: {}", e);
        std::process::exit(1);
    }
}
