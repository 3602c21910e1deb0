//! CLI 模块

pub mod config;
pub mod local;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

use crate::slack::CommandKind;

#[derive(Parser)]
#[command(name = "dolt")]
#[command(version)]
#[command(about = "Personal task manager driven by Slack slash commands")]
pub struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. "debug", "dolt=trace")
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (Slack webhook + JSON API); the default
    Serve {
        /// Interface to bind (defaults to config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage registered users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// List a user's tasks
    Tasks {
        /// Slack user ID
        #[arg(short, long)]
        user: String,
        /// all | important | completed | today | tomorrow | later | group:<id>
        #[arg(long, default_value = "all")]
        view: String,
        /// default | recent | due
        #[arg(long, default_value = "default")]
        sort: String,
    },
    /// Run a slash command locally and print the Slack reply
    Command {
        /// Slack user ID
        #[arg(short, long)]
        user: String,
        /// task | group
        #[arg(short, long, default_value = "task")]
        kind: CommandKind,
        /// Command text, e.g. "\"Buy milk\" $today *"
        text: Vec<String>,
    },
    /// Show the effective configuration
    Config {
        /// Generate an API secret key and save it to the config file
        #[arg(long)]
        generate_api_secret: bool,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a Slack user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        slack_user_id: String,
        #[arg(long)]
        slack_team_id: String,
        /// Avatar URL
        #[arg(long, default_value = "")]
        avatar: String,
    },
    /// List registered users
    List,
}
