//! RideLab - Cycling Activity Analytics
//!
//! Command-line entry point. Every command prints pretty JSON on stdout.
//!
//! ```bash
//! ridelab import ride.json
//! ridelab fitness --days 90 --duration 20m
//! ridelab bins pbz --days 400
//! ridelab profile set ftp 265
//! ridelab meta set <activity-id> tss_override 95
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use ridelab::activity::types::{activity_title, RawSample};
use ridelab::history::HistoryService;
use ridelab::metrics::analytics::{NamedDuration, PerformanceFilter, ZoneKind};
use ridelab::metrics::zones::ZoneLabels;
use ridelab::storage::config::{load_config, load_config_from, AppConfig};
use ridelab::storage::{ActivityStore, Database};

#[derive(Parser)]
#[command(name = "ridelab", version, about = "Cycling activity analytics")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file override
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file override
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Store and process a JSON array of raw samples
    Import { file: PathBuf },

    /// Re-run processing with the current profile (all activities if none given)
    Reprocess { activity: Option<Uuid> },

    /// Summary, laps and zones of one activity
    Summary { activity: Uuid },

    /// Daily CTL/ATL/TSB
    Fitness {
        /// History window in days (config default if omitted)
        #[arg(long)]
        days: Option<u32>,

        /// Named duration for notable CP markers
        #[arg(long)]
        duration: Option<NamedDuration>,
    },

    /// Best power curves of the last three history windows
    Curve {
        #[arg(long)]
        days: Option<u32>,
    },

    /// Weekly or monthly totals
    Bins {
        measure: BinMeasure,

        #[arg(long)]
        days: Option<u32>,
    },

    /// Heart rate vs power over filtered activities
    Performance {
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        duration: Option<NamedDuration>,

        /// Minimum activity length in minutes
        #[arg(long, default_value = "0")]
        from_minutes: u32,

        /// Maximum activity length in minutes, 0 for no limit
        #[arg(long, default_value = "0")]
        to_minutes: u32,

        #[arg(long)]
        indoor: bool,

        #[arg(long)]
        outdoor: bool,

        #[arg(long)]
        race: bool,

        #[arg(long)]
        training: bool,

        #[arg(long)]
        require_heart: bool,

        /// Standard ride id (repeatable)
        #[arg(long = "standard-ride")]
        standard_rides: Vec<u32>,
    },

    /// This week's totals and current fitness
    Dashboard,

    /// Show or change user-entered activity details
    Meta {
        #[command(subcommand)]
        action: MetaCommand,
    },

    /// Show or change the rider profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    /// Set one value, e.g. `ftp 265` or `fill_mode remove`
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum MetaCommand {
    Show { activity: Uuid },
    /// Set one value, e.g. `tss_override 95`, `race true` or `standard_ride_id none`
    Set { activity: Uuid, key: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum BinMeasure {
    /// TSS and hours
    Tss,
    /// Heart rate zone hours
    Hbz,
    /// Power zone hours
    Pbz,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting RideLab v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    let db_path = cli.database.clone().unwrap_or_else(|| config.database_path());
    let mut db = Database::open(&db_path).with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let user = db
        .get_or_create_default_user(&config.profile)
        .context("Failed to load user profile")?;

    let mut service = HistoryService::new(db, user.id);
    run(cli.command, &mut service, &config)
}

fn run(command: Command, service: &mut HistoryService<Database>, config: &AppConfig) -> Result<()> {
    let now = Utc::now();
    let history_days = |days: Option<u32>| days.unwrap_or(config.analysis.history_days);

    match command {
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let samples: Vec<RawSample> =
                serde_json::from_str(&text).with_context(|| format!("Invalid sample file {}", file.display()))?;

            let (id, processed) = service.import_activity(&samples).context("Failed to import activity")?;
            print_json(&serde_json::json!({
                "id": id,
                "title": activity_title(processed.summary.start_time),
                "summary": processed.summary,
                "gaps": processed.gaps,
            }))
        }
        Command::Reprocess { activity: Some(id) } => {
            let processed = service.reprocess(&id).context("Failed to reprocess activity")?;
            print_json(&processed.summary)
        }
        Command::Reprocess { activity: None } => {
            let count = service.reprocess_all().context("Failed to reprocess activities")?;
            print_json(&serde_json::json!({ "reprocessed": count }))
        }
        Command::Summary { activity } => {
            let store = service.store();
            let processed = store.fetch_processed(&activity).context("Failed to load activity")?;
            let meta = store.fetch_activity_meta(&activity)?;
            print_json(&serde_json::json!({
                "id": activity,
                "title": activity_title(processed.summary.start_time),
                "summary": processed.summary,
                "laps": processed.laps,
                "named_cp": processed.named_cp,
                "zones": processed.zones,
                "zone_labels": ZoneLabels::from_thresholds(processed.ftp, processed.thr),
                "gaps": processed.gaps,
                "meta": meta,
            }))
        }
        Command::Fitness { days, duration } => {
            let duration = duration.unwrap_or(config.analysis.notable_duration);
            let trend = service.fitness_trend(now.date_naive(), history_days(days), duration)?;
            print_json(&trend)
        }
        Command::Curve { days } => print_json(&service.power_curves(history_days(days), now)?),
        Command::Bins { measure, days } => {
            let days = history_days(days);
            match measure {
                BinMeasure::Tss => print_json(&service.tss_bins(days, now)?),
                BinMeasure::Hbz => print_json(&service.zone_bins(ZoneKind::Heart, days, now)?),
                BinMeasure::Pbz => print_json(&service.zone_bins(ZoneKind::Power, days, now)?),
            }
        }
        Command::Performance {
            days,
            duration,
            from_minutes,
            to_minutes,
            indoor,
            outdoor,
            race,
            training,
            require_heart,
            standard_rides,
        } => {
            let filter = PerformanceFilter {
                duration: duration.unwrap_or(config.analysis.notable_duration),
                from_minutes,
                to_minutes,
                indoor_only: indoor,
                outdoor_only: outdoor,
                race_only: race,
                training_only: training,
                require_heart,
                standard_rides,
            };
            let from = now - Duration::days(history_days(days) as i64);
            print_json(&service.performance(&filter, from, now)?)
        }
        Command::Dashboard => print_json(&service.dashboard(now)?),
        Command::Meta {
            action: MetaCommand::Show { activity },
        } => print_json(&service.store().fetch_activity_meta(&activity)?),
        Command::Meta {
            action: MetaCommand::Set { activity, key, value },
        } => {
            let meta = service
                .update_meta(&activity, &key, &value)
                .context("Failed to update activity details")?;
            print_json(&meta)
        }
        Command::Profile { action: ProfileCommand::Show } => print_json(&service.profile()?),
        Command::Profile {
            action: ProfileCommand::Set { key, value },
        } => {
            let mut profile = service.store().fetch_user_profile(&service.user_id())?;
            profile.set(&key, &value)?;
            service.store_mut().save_user_profile(&profile)?;
            tracing::info!("Updated {} for {}", key, profile.name);
            print_json(&profile)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
