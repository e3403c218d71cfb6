#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use pet_tiles::catalog::Catalog;
use pet_tiles::config::AppConfig;
use pet_tiles::gui::run_gui;
use pet_tiles::render::{tiles_to_render, Surface};
use pet_tiles::session::TileSettingsSession;
use pet_tiles::settings::TileSettings;
use pet_tiles::store::{JsonFileKv, LocalStore, Scope};

#[derive(Parser)]
#[command(name = "pet-tiles", version, about = "Configure dashboard tile order and visibility")]
struct Cli {
    /// Include admin-only tiles
    #[arg(long, global = true)]
    privileged: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the configuration window (default)
    Gui,
    /// Print the tiles a surface shows, in order
    List {
        #[arg(long, value_enum, default_value_t = SurfaceArg::Dashboard)]
        surface: SurfaceArg,
        /// Also print hidden tiles
        #[arg(long)]
        all: bool,
    },
    /// Move the given tiles to the front, in the given order
    Order {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show or hide a tile
    Toggle { id: String, state: Switch },
    /// Restore the default order with every tile visible
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum SurfaceArg {
    Dashboard,
    History,
}

impl From<SurfaceArg> for Surface {
    fn from(arg: SurfaceArg) -> Self {
        match arg {
            SurfaceArg::Dashboard => Surface::Dashboard,
            SurfaceArg::History => Surface::History,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn parse_log_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// Given ids first, then every other tile in its current order
fn front_loaded(current: &TileSettings, ids: Vec<String>) -> Vec<String> {
    let rest: Vec<String> = current
        .order
        .iter()
        .filter(|id| !ids.contains(*id))
        .cloned()
        .collect();
    ids.into_iter().chain(rest).collect()
}

fn print_list(settings: &TileSettings, catalog: &Catalog, privileged: bool, surface: Surface, all: bool) {
    if all {
        for (pos, id) in settings.order.iter().enumerate() {
            let mark = if settings.is_visible(id) { 'x' } else { ' ' };
            let title = catalog.get(id).map_or(id.as_str(), |tile| tile.title);
            println!("{:>2}. [{mark}] {title} ({id})", pos + 1);
        }
        return;
    }

    for (pos, entry) in tiles_to_render(settings, catalog, &privileged, surface).iter().enumerate() {
        println!("{:>2}. {} ({})", pos + 1, entry.label, entry.tile.id);
    }
}

fn run(command: Commands, config: AppConfig) -> Result<()> {
    if let Commands::Gui = command {
        info!("Starting tile settings window");
        return run_gui(config);
    }

    let privileged = config.privileged;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to build async runtime")?;

    let catalog = Catalog::builtin();
    let ids = catalog.eligible_ids(privileged);
    let store = LocalStore::new(JsonFileKv::new(JsonFileKv::default_path()));

    runtime.block_on(async {
        let mut session = TileSettingsSession::load(store, Scope::Device, &ids)
            .await
            .context("Failed to load tile settings")?;

        match command {
            Commands::Gui => {}
            Commands::List { surface, all } => {
                print_list(&session.current(), &catalog, privileged, surface.into(), all);
            }
            Commands::Order { ids } => {
                let order = front_loaded(&session.current(), ids);
                let settings = session.reorder(order).await.context("Failed to reorder tiles")?;
                print_list(&settings, &catalog, privileged, Surface::Dashboard, true);
            }
            Commands::Toggle { id, state } => {
                let visible = matches!(state, Switch::On);
                let settings = session
                    .toggle(&id, visible)
                    .await
                    .with_context(|| format!("Failed to toggle tile {id}"))?;
                print_list(&settings, &catalog, privileged, Surface::Dashboard, true);
            }
            Commands::Reset => {
                let settings = session.reset().await.context("Failed to reset tiles")?;
                print_list(&settings, &catalog, privileged, Surface::Dashboard, true);
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// LOG_LEVEL wins over the configured level
fn resolve_log_level(env: Option<String>, configured: Option<String>) -> TraceLevel {
    parse_log_level(&env.or(configured).unwrap_or_else(|| "info".to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subscriber first, so config loading and clamping are logged
    let log_level = resolve_log_level(
        std::env::var("LOG_LEVEL").ok(),
        AppConfig::peek_log_level(&AppConfig::path()),
    );

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load()?;

    let privileged = cli.privileged || config.privileged;
    run(cli.command.unwrap_or(Commands::Gui), AppConfig { privileged, ..config })
}
