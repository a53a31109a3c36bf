mod attendance;
mod classifier;
mod config;
mod error;
mod input;
mod logger;
mod models;
mod notify;
mod report;
mod subjects;
mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::config::{Config, NotifySettings};
use crate::models::{AttendanceRecord, DeadlineRecord, NotificationLevel};
use crate::notify::{dispatch, KdeConnect, Notifier, Ntfy};
use crate::report::{NotifyPolicy, RenderOptions};
use crate::subjects::Abbreviations;
use crate::sync::KeepSet;

/// Assignment deadlines and attendance from the university portals
#[derive(Parser, Debug)]
#[command(name = "lms-deadlines")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose diagnostic output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show assignment deadlines and send push notifications (default)
    Deadlines(DeadlineArgs),

    /// Show how many more classes each course can be missed
    Attendance {
        /// Attendance records JSON, `-` for stdin (overrides ATTENDANCE_FILE)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Plain output without terminal colors
        #[arg(long)]
        no_color: bool,
    },

    /// Delete downloaded assignment files that are no longer listed
    Cleanup {
        /// Deadline records JSON, `-` for stdin (overrides DEADLINES_FILE)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Download directory (overrides DOWNLOAD_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct DeadlineArgs {
    /// Deadline records JSON, `-` for stdin (overrides DEADLINES_FILE)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// One line per deadline, no sections, no notifications
    #[arg(short, long)]
    condensed: bool,

    /// Send notifications via KDE Connect to this device ID
    #[arg(short, long, value_name = "DEVICE")]
    kde: Option<String>,

    /// Send notifications via ntfy to this topic
    #[arg(short, long, value_name = "TOPIC")]
    ntfy: Option<String>,

    /// Notification level 0-4 (overrides NOTIFICATION_LEVEL)
    #[arg(long, value_parser = config::parse_level)]
    level: Option<NotificationLevel>,

    /// Also notify about assignments already submitted
    #[arg(long)]
    notify_submitted: bool,

    /// Skip submitted assignments even if NOTIFY_SUBMITTED is set
    #[arg(long, conflicts_with = "notify_submitted")]
    no_notify_submitted: bool,

    /// Shorten known course names
    #[arg(short, long)]
    abbreviate: bool,

    /// Plain output without terminal colors
    #[arg(long)]
    no_color: bool,

    /// Prune stale downloads in this directory afterwards (overrides DOWNLOAD_DIR)
    #[arg(long, value_name = "DIR")]
    sync_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logging(cli.debug);

    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command.unwrap_or_else(|| Commands::Deadlines(DeadlineArgs::default())) {
        Commands::Deadlines(args) => run_deadlines(config, args).await,
        Commands::Attendance { input, no_color } => run_attendance(&config, input, !no_color),
        Commands::Cleanup { input, dir } => run_cleanup(&config, input, dir),
    }
}

fn apply_overrides(config: &mut Config, settings: &mut NotifySettings, args: &DeadlineArgs) {
    if let Some(device) = &args.kde {
        settings.kde_device = Some(device.clone());
    }
    if let Some(topic) = &args.ntfy {
        settings.ntfy_topic = Some(topic.clone());
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    if args.notify_submitted {
        settings.notify_submitted = true;
    }
    if args.no_notify_submitted {
        settings.notify_submitted = false;
    }
    if let Some(input) = &args.input {
        config.deadlines_file = Some(input.clone());
    }
    if let Some(dir) = &args.sync_dir {
        config.download_dir = Some(dir.clone());
    }
}

fn build_channels(settings: &NotifySettings) -> Result<Vec<Box<dyn Notifier>>> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(device) = &settings.kde_device {
        channels.push(Box::new(KdeConnect::new(device.clone(), settings.notify_timeout)));
    }
    if let Some(topic) = &settings.ntfy_topic {
        let ntfy = Ntfy::new(&settings.ntfy_server, topic, settings.notify_timeout)
            .context("Failed to set up ntfy client")?;
        channels.push(Box::new(ntfy));
    }
    Ok(channels)
}

async fn run_deadlines(mut config: Config, args: DeadlineArgs) -> Result<()> {
    let mut settings = NotifySettings::from_env().context("Invalid configuration")?;
    apply_overrides(&mut config, &mut settings, &args);

    let path = config.require_deadlines_file()?;
    let records: Vec<DeadlineRecord> = input::load_records(&path)?;
    tracing::info!(count = records.len(), path = %path.display(), "Loaded deadlines");

    let abbreviations =
        Abbreviations::with_extra(&settings.abbreviations).context("Invalid SUBJECT_ABBREVIATIONS")?;

    if args.condensed {
        print!("{}", report::render_condensed(&records, &abbreviations));
    } else {
        let today = Local::now().date_naive();
        let classified =
            classifier::classify(&records, today).context("Deadline list contains an unreadable due date")?;

        let options = RenderOptions {
            abbreviate: args.abbreviate,
            colored: !args.no_color,
        };
        print!("{}", report::render_sections(&classified, &abbreviations, options));

        if settings.channels_enabled() {
            let policy = NotifyPolicy {
                level: settings.level,
                notify_submitted: settings.notify_submitted,
                channels_enabled: true,
            };
            let queue = report::notification_queue(&classified, &policy, &abbreviations, args.abbreviate);
            let channels = build_channels(&settings)?;
            dispatch(&channels, &queue).await;
        } else {
            tracing::info!("Push notifications disabled");
        }
    }

    if let Some(dir) = &config.download_dir {
        sync::prune_downloads(dir, &KeepSet::from_records(&records));
    }

    tracing::info!("Deadline check completed");
    Ok(())
}

fn run_attendance(config: &Config, input: Option<PathBuf>, colored: bool) -> Result<()> {
    let path = match input {
        Some(path) => path,
        None => config.require_attendance_file()?,
    };
    let records: Vec<AttendanceRecord> = input::load_records(&path)?;
    tracing::info!(count = records.len(), path = %path.display(), "Loaded attendance");

    let summaries = attendance::summarize_all(&records)?;
    print!("{}", attendance::render(&summaries, colored));
    Ok(())
}

fn run_cleanup(config: &Config, input: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let path = match input {
        Some(path) => path,
        None => config.require_deadlines_file()?,
    };
    let dir = match dir {
        Some(dir) => dir,
        None => config.require_download_dir()?,
    };
    let records: Vec<DeadlineRecord> = input::load_records(&path)?;
    let report = sync::prune_downloads(&dir, &KeepSet::from_records(&records));
    if report.failures > 0 {
        tracing::warn!(failures = report.failures, "Some stale downloads could not be removed");
    }
    Ok(())
}
