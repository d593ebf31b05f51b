use std::time::Duration;

use clap::Parser;

use bulletin::cli::{Cli, Commands};
use bulletin::config::Config;
use bulletin::domain::Announcement;
use bulletin::errors::BulletinResult;
use bulletin::logging;
use bulletin::notifiers::{ConsoleNotifier, NotebrookNotifier, Notifier};
use bulletin::services::{FeedSyncEngine, SyncStatus, WatchOptions, WatchService};
use bulletin::sources::HttpAnnouncementSource;
use bulletin::storage::{SnapshotRepository, SqliteSnapshotRepository, SqliteStorage};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> BulletinResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    logging::init(&config.log_level);

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;
    let repository = SqliteSnapshotRepository::new(storage);

    match cli.command {
        Commands::Sync {
            dry_run,
            skip_notify,
        } => cmd_sync(&config, repository, dry_run, skip_notify),
        Commands::Watch {
            interval,
            max_polls,
            skip_notify,
        } => cmd_watch(&config, repository, interval, max_polls, skip_notify),
        Commands::List => cmd_list(&config),
        Commands::Status => cmd_status(repository),
        Commands::Reset => cmd_reset(repository),
    }
}

fn build_notifier(config: &Config, dry_run: bool) -> BulletinResult<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(ConsoleNotifier::dry_run()));
    }

    match &config.notebrook {
        Some(notebrook) => Ok(Box::new(NotebrookNotifier::new(notebrook, config.timeout)?)),
        None => Ok(Box::new(ConsoleNotifier::stdout())),
    }
}

fn print_announcement(marker: &str, announcement: &Announcement) {
    let pin = if announcement.pinned { " (pinned)" } else { "" };
    println!("  {} [{}] {}{}", marker, announcement.id, announcement.title, pin);

    for address in announcement.addresses() {
        println!("      at: {}", address);
    }
    if !announcement.image_refs.is_empty() {
        println!("      images: {}", announcement.image_refs.len());
    }
    for video in &announcement.video_refs {
        println!("      video: {}", video);
    }
}

fn cmd_sync(
    config: &Config,
    repository: SqliteSnapshotRepository,
    dry_run: bool,
    skip_notify: bool,
) -> BulletinResult<()> {
    let source = HttpAnnouncementSource::new(&config.endpoint, config.timeout)?;

    // skip-notify wins over dry-run: state is recorded, nothing is sent
    let options = if skip_notify {
        println!("Running in skip-notify mode: announcements are recorded without notifying.\n");
        WatchOptions {
            notify: false,
            persist: true,
        }
    } else if dry_run {
        WatchOptions {
            notify: true,
            persist: false,
        }
    } else {
        WatchOptions::default()
    };

    let notifier = build_notifier(config, dry_run && !skip_notify)?;
    let service = WatchService::resume(source, notifier, repository, options)?;
    let first_run = service.engine().snapshot().is_empty();

    println!("Fetching announcements from {}...\n", service.engine().source().endpoint());

    let report = service.poll_once()?;
    let result = report.result;

    match result.status {
        SyncStatus::Failed(e) => return Err(e),
        SyncStatus::AlreadyInProgress => {
            println!("A sync is already in progress.");
            return Ok(());
        }
        SyncStatus::Updated | SyncStatus::Unchanged => {}
    }

    if result.items.is_empty() {
        println!("No announcements published.");
    } else if first_run {
        println!("Baseline recorded: {} announcements.", result.items.len());
    } else if result.new_items.is_empty() {
        println!("No new announcements ({} published).", result.items.len());
    } else {
        println!("{} new announcements:", result.new_items.len());
        for announcement in &result.new_items {
            print_announcement("+", announcement);
        }
    }

    if let Some(e) = report.notify_error {
        println!("\nNotification FAILED: {}", e);
    } else if report.notified && !dry_run {
        println!("\nNotified {} new announcements.", result.new_items.len());
    } else if let (Some(notification), true) = (&report.notification, skip_notify) {
        println!("\nSkipped notification: {}", notification.format());
    }

    if dry_run && !skip_notify {
        println!("\nDry run complete. Nothing was recorded.");
    }

    Ok(())
}

fn cmd_watch(
    config: &Config,
    repository: SqliteSnapshotRepository,
    interval: u64,
    max_polls: Option<u32>,
    skip_notify: bool,
) -> BulletinResult<()> {
    let source = HttpAnnouncementSource::new(&config.endpoint, config.timeout)?;
    let options = WatchOptions {
        notify: !skip_notify,
        persist: true,
    };
    let notifier = build_notifier(config, false)?;
    let service = WatchService::resume(source, notifier, repository, options)?;

    println!(
        "Watching {} every {}s{}...",
        service.engine().source().endpoint(),
        interval,
        if skip_notify { " (skip-notify mode)" } else { "" }
    );

    let polls = service.run(Duration::from_secs(interval), max_polls);
    println!("Stopped after {} polls.", polls);

    Ok(())
}

fn cmd_list(config: &Config) -> BulletinResult<()> {
    let source = HttpAnnouncementSource::new(&config.endpoint, config.timeout)?;
    let engine = FeedSyncEngine::new(source);

    let result = engine.sync();
    if let SyncStatus::Failed(e) = result.status {
        return Err(e);
    }

    if result.items.is_empty() {
        println!("No announcements published.");
        return Ok(());
    }

    println!("Published announcements:\n");
    for announcement in &result.items {
        print_announcement("-", announcement);
    }

    Ok(())
}

fn cmd_status(repository: SqliteSnapshotRepository) -> BulletinResult<()> {
    let snapshot = repository.load()?;

    match snapshot.last_fetched_at {
        None if snapshot.is_empty() => {
            println!("No announcements recorded yet.");
        }
        last_fetched_at => {
            println!("Known announcements: {}", snapshot.known_ids.len());
            match last_fetched_at {
                Some(at) => println!("Last fetched: {}", at.to_rfc3339()),
                None => println!("Last fetched: never"),
            }
            let ids: Vec<&str> = snapshot.sorted_ids().into_iter().map(|id| id.as_str()).collect();
            if !ids.is_empty() {
                println!("Ids: {}", ids.join(", "));
            }
        }
    }

    Ok(())
}

fn cmd_reset(repository: SqliteSnapshotRepository) -> BulletinResult<()> {
    repository.clear()?;
    println!("Recorded announcements cleared.");
    Ok(())
}

