//! calsync CLI
//!
//! Manages external calendar subscriptions and imports their events into the
//! local schedule.

#![allow(clippy::print_stdout)]

mod output;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use application::{MarkupSanitizer, SubscriptionSyncService, SyncOutcome};
use clap::{Parser, Subcommand};
use domain::SubscriptionId;
use infrastructure::{
    AppConfig, AsyncDatabase, SqliteScheduleEventStore, SqliteSubscriptionStore,
    WebcalFeedAdapter, init_tracing,
};
use tracing::{error, info};

/// calsync CLI
#[derive(Parser)]
#[command(name = "calsync")]
#[command(author, version, about = "Sync external ICS calendar feeds", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "CALSYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a calendar subscription
    ///
    /// Example: calsync subscribe --name Team --url https://example.com/team.ics
    Subscribe {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Feed URL (http or https)
        #[arg(short, long)]
        url: String,

        /// Display color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Remove a subscription and its imported events
    Unsubscribe {
        /// Subscription ID
        #[arg(value_parser = parse_subscription_id)]
        id: SubscriptionId,
    },

    /// Enable syncing for a subscription
    Enable {
        /// Subscription ID
        #[arg(value_parser = parse_subscription_id)]
        id: SubscriptionId,
    },

    /// Disable syncing for a subscription
    Disable {
        /// Subscription ID
        #[arg(value_parser = parse_subscription_id)]
        id: SubscriptionId,
    },

    /// List subscriptions
    List,

    /// List events imported from a subscription
    Events {
        /// Subscription ID
        #[arg(value_parser = parse_subscription_id)]
        id: SubscriptionId,
    },

    /// Sync one subscription now
    Sync {
        /// Subscription ID
        #[arg(value_parser = parse_subscription_id)]
        id: SubscriptionId,
    },

    /// Sync every enabled subscription
    SyncAll,

    /// Sync every enabled subscription periodically until Ctrl-C
    Watch,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn parse_subscription_id(value: &str) -> Result<SubscriptionId, String> {
    SubscriptionId::parse(value.trim()).map_err(|e| format!("invalid subscription id: {e}"))
}

/// Open the database and wire the sync service
async fn build_service(
    config: &AppConfig,
) -> anyhow::Result<(AsyncDatabase, SubscriptionSyncService)> {
    let db = AsyncDatabase::new(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db.migrate().await.context("Failed to run migrations")?;

    let events = Arc::new(SqliteScheduleEventStore::new(db.pool().clone()));
    let fetcher = WebcalFeedAdapter::new(config.webcal.clone())?;

    let service = SubscriptionSyncService::new(
        Arc::new(SqliteSubscriptionStore::new(db.pool().clone())),
        events.clone(),
        events,
        Arc::new(fetcher),
        Arc::new(MarkupSanitizer),
    );

    Ok((db, service))
}

/// Run bulk syncs on the configured interval until Ctrl-C
async fn watch(service: &SubscriptionSyncService, config: &AppConfig) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(config.sync.interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        interval_minutes = config.sync.interval_minutes,
        "Watching subscriptions"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.sync_all_calendars().await {
                    Ok(report) => {
                        for line in output::report_lines(&report) {
                            println!("{line}");
                        }
                    },
                    Err(e) => error!(error = %e, "Bulk sync failed"),
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Shutting down");
                return Ok(());
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if cli.verbose > 0 {
        config.telemetry.log_filter = log_filter_from_verbosity(cli.verbose).to_string();
    }
    init_tracing(&config.telemetry)?;

    let (db, service) = build_service(&config).await?;

    match cli.command {
        Commands::Subscribe { name, url, color } => {
            let subscription = service
                .add_subscription(&name, &url, color.as_deref())
                .await?;
            println!("Added subscription {}", subscription.id);
            println!("{}", output::subscription_line(&subscription));
        },

        Commands::Unsubscribe { id } => {
            let removed = service.remove_subscription(&id).await?;
            println!("Removed subscription {id} and {removed} imported event(s)");
        },

        Commands::Enable { id } => {
            service.set_enabled(&id, true).await?;
            println!("Enabled subscription {id}");
        },

        Commands::Disable { id } => {
            service.set_enabled(&id, false).await?;
            println!("Disabled subscription {id}");
        },

        Commands::List => {
            let subscriptions = service.list_subscriptions().await?;
            if subscriptions.is_empty() {
                println!("No subscriptions");
            }
            for subscription in &subscriptions {
                println!("{}", output::subscription_line(subscription));
            }
        },

        Commands::Events { id } => {
            service.get_subscription(&id).await?;
            let events = service.events_for_subscription(&id).await?;
            if events.is_empty() {
                println!("No imported events");
            }
            for event in &events {
                println!("{}", output::event_line(event));
            }
        },

        Commands::Sync { id } => {
            let outcome = service
                .sync_calendar(&id)
                .await
                .with_context(|| format!("Sync of subscription {id} failed"))?;
            if outcome == SyncOutcome::NotFound {
                bail!("Subscription not found: {id}");
            }
            println!("{}", output::outcome_line(&outcome));
        },

        Commands::SyncAll => {
            let report = service.sync_all_calendars().await?;
            for line in output::report_lines(&report) {
                println!("{line}");
            }
        },

        Commands::Watch => watch(&service, &config).await?,
    }

    db.pool().close().await;
    Ok(())
}
