use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wristtrack::config::Config;
use wristtrack::dashboard::Dashboard;
use wristtrack::models::{format_timestamp, EventQuery, EventRecord, RecordFilter};
use wristtrack::storage;

#[derive(Parser)]
#[command(name = "wristtrack-admin")]
#[command(about = "Wristband tracking admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Event ID (partition key)
    #[arg(long)]
    event_id: Option<String>,
    /// Operation (sort key)
    #[arg(long)]
    operation: Option<String>,
    /// Only records whose wristband id contains this text
    #[arg(long)]
    bw_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON array of event records into the event table
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// List event records
    List {
        #[command(flatten)]
        selection: Selection,
    },
    /// Show per-zone visits and dwell time
    Zones {
        #[command(flatten)]
        selection: Selection,
        /// Scope to one wristband (entity id, the part of bwId before '#')
        #[arg(long)]
        entity: Option<String>,
    },
    /// Show the most frequent wristbands
    Top {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn format_ms(ms: i64) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = storage::open(&config).await?;

    // Ensure database is initialized
    store.init().await?;

    let (selection, entity) = match cli.command {
        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<EventRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of event records", file.display()))?;

            let written = store.upsert_batch(&records).await?;
            println!("✓ Imported {} of {} records", written, records.len());
            return Ok(());
        }
        Commands::List { ref selection } => (selection, None),
        Commands::Zones {
            ref selection,
            ref entity,
        } => (selection, entity.clone()),
        Commands::Top { ref selection, .. } => (selection, None),
    };

    let query = EventQuery::from_criteria(
        selection.event_id.as_deref(),
        selection.operation.as_deref(),
        config.dashboard.default_event_id.as_deref(),
    );

    let mut dashboard = Dashboard::new(store, config.dashboard.clone());
    dashboard.load(query).await?;
    if let Some(ref bw_id) = selection.bw_id {
        dashboard.set_filter(RecordFilter::by_bw_id(bw_id.clone()));
    }
    dashboard.select_entity(entity);
    let snapshot = dashboard.snapshot();

    match cli.command {
        Commands::Import { .. } => unreachable!("handled above"),
        Commands::List { .. } => {
            if snapshot.records.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            println!(
                "{:<12} {:<16} {:<20} {:<16} {}",
                "Event ID", "Operation", "BW ID", "Zone", "Time"
            );
            println!("{}", "-".repeat(88));
            for row in &snapshot.records {
                let record = &row.record;
                println!(
                    "{:<12} {:<16} {:<20} {:<16} {}",
                    record.event_id.as_deref().unwrap_or("-"),
                    record.operation.as_deref().unwrap_or("-"),
                    record.bw_id().unwrap_or("-"),
                    record.zone().unwrap_or("-"),
                    row.formatted_time.as_deref().unwrap_or("-"),
                );
            }
            println!("{} events", snapshot.records.len());
        }
        Commands::Zones { .. } => {
            if snapshot.zone_stats.is_empty() {
                println!("No zone visits found.");
                return Ok(());
            }
            if let Some(ref entity) = snapshot.selected_entity {
                println!("Zone stats for wristband {}:", entity);
            } else {
                println!("Zone stats for all wristbands:");
            }
            println!("{:<24} {:>8} {:>14} {:>14}", "Zone", "Visits", "Total dwell", "Avg dwell");
            println!("{}", "-".repeat(64));
            for stat in &snapshot.zone_stats {
                println!(
                    "{:<24} {:>8} {:>14} {:>14}",
                    stat.zone_name,
                    stat.visit_count,
                    format_ms(stat.total_dwell_ms),
                    format_ms(stat.average_dwell_ms.round() as i64),
                );
            }
            if let (Some(first), Some(last)) = (
                snapshot.summary.first_timestamp.and_then(format_timestamp),
                snapshot.summary.last_timestamp.and_then(format_timestamp),
            ) {
                println!("Observed from {} to {}", first, last);
            }
        }
        Commands::Top { limit, .. } => {
            if snapshot.top_identities.is_empty() {
                println!("No wristbands found.");
                return Ok(());
            }
            println!("{:<24} {:>8} {:>8}", "Wristband", "Records", "Share");
            println!("{}", "-".repeat(42));
            for identity in snapshot.top_identities.iter().take(limit) {
                println!(
                    "{:<24} {:>8} {:>7.1}%",
                    identity.id, identity.count, identity.percentage
                );
            }
        }
    }

    Ok(())
}
