mod api;
mod cli;
mod error;
mod model;
mod operations;
mod slack;
mod storage;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;
use storage::Database;

/// 初始化日志：RUST_LOG 优先，否则使用 --log-level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(config: &storage::config::Config) -> Result<Database> {
    Database::open(&config.database.resolved_path())
}

fn run(command: Commands) -> Result<()> {
    let config = storage::config::load_config()?;

    // 统一调度
    match command {
        Commands::Serve { host, port } => cli::serve::execute(&config, host, port),
        Commands::User { action } => cli::user::execute(&open_database(&config)?, action),
        Commands::Tasks { user, view, sort } => {
            cli::local::list_tasks(&open_database(&config)?, &user, &view, &sort)
        }
        Commands::Command { user, kind, text } => {
            cli::local::run_command(&open_database(&config)?, &user, kind, &text.join(" "))
        }
        Commands::Config {
            generate_api_secret,
        } => cli::config::execute(&config, generate_api_secret),
    }
}

fn main() {
    // 解析命令行参数
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // 无子命令：启动服务
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    if let Err(e) = run(command) {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
