use anyhow::Context;
use clap::{Parser, Subcommand};
use stacklimit::events::{HostEvent, ItemSpawnEvent, MemoryEventBus, PlayerJoinEvent};
use stacklimit::host::ItemRegistry;
use stacklimit::host::memory::{ConsoleSender, MemoryItemEntity, MemoryItemRegistry, MemoryPlayer};
use stacklimit::models::inventory::ItemStack;
use stacklimit::models::player::PlayerRole;
use stacklimit::store::YamlFileStore;
use stacklimit::{StackLimit, config, process_command};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

// cargo run -- check --json --config plugins/StackLimit/config.yml

#[derive(Debug, Parser)]
#[command(name = "stacklimit", version, about = "Per-item max stack size enforcement")]
struct Args {
    /// Plugin config file (overrides STACKLIMIT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TOML settings file (if omitted, use env)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Load the config once and print the effective limits and clip notices
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Interactive console driving an in-memory host
    Console,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.settings {
        Some(path) => config::Config::load(path)?,
        None => config::Config::from_env(),
    };
    if let Some(path) = &args.config {
        cfg.config_path = path.clone();
    }

    init_tracing(&cfg.log_filter)?;

    let items = Arc::new(MemoryItemRegistry::vanilla());
    let store = Arc::new(YamlFileStore::new(&cfg.config_path));
    let plugin = Arc::new(StackLimit::new(store, items.clone()));
    let mut bus = MemoryEventBus::new();
    plugin
        .enable(&mut bus)
        .with_context(|| format!("loading {}", cfg.config_path.display()))?;

    match args.command {
        Cmd::Check { json } => print_check(&plugin, &*items, json)?,
        Cmd::Console => run_console(plugin.clone(), items, bus).await?,
    }

    plugin.disable();
    Ok(())
}

fn named_limits(plugin: &StackLimit, items: &dyn ItemRegistry) -> BTreeMap<String, i32> {
    plugin
        .snapshot()
        .table
        .iter()
        .map(|(id, max)| (items.key_of(id).unwrap_or_else(|| id.to_string()), max))
        .collect()
}

fn print_check(plugin: &StackLimit, items: &dyn ItemRegistry, json: bool) -> anyhow::Result<()> {
    let limits = named_limits(plugin, items);
    let notices = plugin.notices();

    if json {
        let out = serde_json::json!({
            "limits": limits,
            "notices": notices,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} limit(s)", limits.len());
    for (key, max) in &limits {
        println!("  {key:<32} {max}");
    }
    for notice in &notices {
        println!("! {notice}");
    }
    Ok(())
}

async fn run_console(
    plugin: Arc<StackLimit>,
    items: Arc<MemoryItemRegistry>,
    bus: MemoryEventBus,
) -> anyhow::Result<()> {
    let mut players: HashMap<String, MemoryPlayer> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("StackLimit console. Commands: stacklimit reload | join <name> [op] | spawn <item> <n> | limits | quit");

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["stop"] => break,
            ["limits"] => {
                for (key, max) in named_limits(&plugin, &*items) {
                    println!("  {key:<32} {max}");
                }
            }
            ["join", name, rest @ ..] => {
                let role = if rest.first().is_some_and(|r| r.eq_ignore_ascii_case("op")) {
                    PlayerRole::Operator
                } else {
                    PlayerRole::Player
                };
                let player = players
                    .entry(name.to_string())
                    .or_insert_with(|| MemoryPlayer::new(*name, role));
                player.role = role;
                bus.dispatch(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut *player }));
                for msg in player.take_inbox() {
                    println!("[to {name}] {msg}");
                }
            }
            ["spawn", item, amount] => {
                let Some(item_type) = items.match_item(item) else {
                    println!("unknown item: {item}");
                    continue;
                };
                let Ok(amount) = amount.parse::<i32>() else {
                    println!("not a number: {amount}");
                    continue;
                };
                let mut entity = MemoryItemEntity::new(ItemStack::new(item_type, amount));
                bus.dispatch(&mut HostEvent::ItemSpawn(ItemSpawnEvent { entity: &mut entity }));
                println!(
                    "spawned {item} x{} (max {:?})",
                    entity.stack.amount,
                    entity.stack.max_stack_override().ok().flatten()
                );
            }
            _ => {
                let mut console = ConsoleSender::default();
                if !process_command(&plugin, &mut console, &line) {
                    println!("Unknown command.");
                }
                for msg in console.lines {
                    println!("{msg}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!(e))?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();
    Ok(())
}
