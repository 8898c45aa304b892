use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rivalry_tracker::api::{build_router, state::AppState};
use rivalry_tracker::calculate::{aggregate, leaderboard, standings};
use rivalry_tracker::config::AppConfig;
use rivalry_tracker::ingest::{convert_battle_log, merge_matches, BattleLogEntry};
use rivalry_tracker::models::{
    H2HRecord, Leaderboard, LeaderboardCategory, PerOpponentSummary, PlayerTag, RivalEntry,
};
use rivalry_tracker::storage::{
    list_rosters, read_matches, read_roster, write_matches, write_roster, StorageConfig,
};

#[derive(Parser)]
#[command(name = "rivalry-tracker")]
#[command(about = "Head-to-head rivalry tracker for friendly battles")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a player tag
    NormalizeTag { raw: String },

    /// Head-to-head standings against every tracked rival
    Standings {
        /// Player whose rivalries to show
        tag: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Nemesis / rivals / domination buckets
    Leaderboard {
        /// Player whose rivalries to classify
        tag: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List players that track at least one rival
    Players,

    /// Track a new rival for a player
    AddRival {
        /// Player who tracks the rival
        #[arg(long)]
        owner: String,

        /// Rival's tag
        #[arg(long)]
        tag: String,

        /// Rival's display name
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Merge a battle-log JSON file into the match snapshot
    Ingest {
        /// Path to a JSON array of battle-log entries
        path: PathBuf,

        /// Convert and report, but don't write
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting rivalry-tracker v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::NormalizeTag { raw } => {
            let tag = PlayerTag::normalize(&raw)?;
            println!("{}", tag);
        }
        Commands::Standings { tag, json } => {
            let tag = PlayerTag::normalize(&tag)?;
            let records = load_records(&storage, &tag, config.engine.streak_window)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_standings(&tag, &records);
            }
        }
        Commands::Leaderboard { tag, json } => {
            let tag = PlayerTag::normalize(&tag)?;
            let matches = read_matches(&storage)?;
            let roster = read_roster(&storage, &tag)?;
            let records = aggregate(&matches, &roster, &tag, config.engine.streak_window)?;
            let board = leaderboard(&records, &config.leaderboard);

            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print_leaderboard(&tag, &board);
            }
        }
        Commands::Players => {
            let players = list_rosters(&storage)?;
            if players.is_empty() {
                println!("No rosters in {:?}", storage.rosters_dir());
            }
            for player in players {
                let roster = read_roster(&storage, &player)?;
                println!("{:<12} {} rivals", player.as_str(), roster.len());
            }
        }
        Commands::AddRival { owner, tag, name } => {
            let owner = PlayerTag::normalize(&owner)?;
            let rival = PlayerTag::normalize(&tag)?;
            if rival == owner {
                bail!("Cannot add {} as their own rival", owner);
            }

            let mut roster = read_roster(&storage, &owner)?;
            if roster.iter().any(|r| r.tag().is_ok_and(|t| t == rival)) {
                println!("{} already tracks {}", owner, rival);
                return Ok(());
            }

            roster.push(RivalEntry::new(rival.to_string(), name));
            write_roster(&storage, &owner, &roster)?;
            println!("{} now tracks {} ({} rivals)", owner, rival, roster.len());
        }
        Commands::Ingest { path, dry_run } => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read battle log {:?}", path))?;
            let entries: Vec<BattleLogEntry> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse battle log {:?}", path))?;

            let converted = convert_battle_log(&entries);
            let mut matches = read_matches(&storage)?;
            let added = merge_matches(&mut matches, converted);

            println!("\n=== Ingest Results ===");
            println!("Entries read:     {}", entries.len());
            println!("New matches:      {}", added);
            println!("Total matches:    {}", matches.len());

            if dry_run {
                println!("\n(dry run - no data written to disk)");
            } else if added > 0 {
                write_matches(&storage, &mut matches)?;
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let app = build_router(AppState::new(config));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn load_records(
    storage: &StorageConfig,
    tag: &PlayerTag,
    streak_window: usize,
) -> Result<Vec<H2HRecord>> {
    let matches = read_matches(storage)?;
    let roster = read_roster(storage, tag)?;
    tracing::info!(
        "Loaded {} matches and {} rivals for {}",
        matches.len(),
        roster.len(),
        tag
    );

    let records = aggregate(&matches, &roster, tag, streak_window)?;
    Ok(standings(records.into_values()))
}

fn print_standings(tag: &PlayerTag, records: &[H2HRecord]) {
    println!("\n=== H2H Standings for {} ===", tag);
    if records.is_empty() {
        println!("Add rivals to see standings");
        return;
    }

    println!(
        "{:<20} {:<12} {:>4} {:>4} {:>4} {:>9}  Recent",
        "Rival", "Tag", "W", "L", "D", "Crowns"
    );
    for r in records {
        let recent: Vec<String> = r.recent.iter().map(|m| m.to_string()).collect();
        println!(
            "{:<20} {:<12} {:>4} {:>4} {:>4} {:>9}  {}",
            r.username,
            r.tag.as_str(),
            r.wins,
            r.losses,
            r.draws,
            format!("{}-{}", r.crowns_for, r.crowns_against),
            recent.join(" ")
        );
    }
}

fn print_leaderboard(tag: &PlayerTag, board: &Leaderboard) {
    println!("\n=== Leaderboard for {} ===", tag);
    if board.is_empty() {
        println!("No decisive games against tracked rivals yet");
        return;
    }

    for (title, category) in [
        ("Nemesis", LeaderboardCategory::Nemesis),
        ("Rivals", LeaderboardCategory::Rival),
        ("Domination", LeaderboardCategory::Domination),
    ] {
        let bucket = board.in_category(category);
        println!("\n{}:", title);
        if bucket.is_empty() {
            println!("  (none)");
        }
        for s in bucket {
            println!(
                "  {:<20} {:>3}-{:<3} {:>5.1}%",
                display_name(s),
                s.wins,
                s.losses,
                s.win_rate * 100.0
            );
        }
    }
}

fn display_name(summary: &PerOpponentSummary) -> &str {
    summary.username.as_deref().unwrap_or(&summary.opponent)
}
