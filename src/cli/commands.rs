use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bulletin")]
#[command(about = "Announcement feed watcher with new-item notifications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch announcements once and notify about new ones
    Sync {
        /// Dry run - print the notification instead of sending it, don't save state
        #[arg(long)]
        dry_run: bool,

        /// Skip notifications but still record announcements as seen
        #[arg(long)]
        skip_notify: bool,
    },

    /// Poll the feed periodically and notify about new announcements
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Stop after this many polls (runs forever if not specified)
        #[arg(long)]
        max_polls: Option<u32>,

        /// Skip notifications but still record announcements as seen
        #[arg(long)]
        skip_notify: bool,
    },

    /// Fetch and print the current announcements without recording them
    List,

    /// Show what has been recorded from previous syncs
    Status,

    /// Forget recorded announcements (the next sync starts a new baseline)
    Reset,
}
