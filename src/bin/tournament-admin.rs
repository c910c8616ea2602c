//! Maintenance commands run against the same database as the web server.
//!
//!   tournament-admin duplicate <id> --name "Cup 2026" [--with-teams]
//!   tournament-admin purge <id>

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tournament_manager::config::Config;
use tournament_manager::db;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tournament-admin", version, about = "Tournament maintenance commands")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy a tournament's setup into a new planning tournament.
    Duplicate {
        id: Uuid,
        #[arg(long)]
        name: String,
        /// Also copy registrations, block seats and rosters.
        #[arg(long)]
        with_teams: bool,
    },
    /// Delete a tournament and all of its data.
    Purge { id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    let pool = match db::connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Cannot open {}: {e}", config.database_url);
            return ExitCode::FAILURE;
        }
    };
    if !config.skip_migrations {
        if let Err(e) = db::migrate(&pool).await {
            log::error!("Migration failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    match cli.command {
        Command::Duplicate { id, name, with_teams } => {
            match db::duplicate::duplicate(&pool, id, &name, with_teams).await {
                Ok(copy) => {
                    println!("{}", copy.tournament.id);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    log::error!("Duplicate failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Purge { id } => {
            let report = db::purge::purge_tournament(&pool, id).await;
            for step in &report.steps {
                match &step.error {
                    Some(e) => println!("{:<18} FAILED  {e}", step.table),
                    None => println!("{:<18} {:>6} row(s)", step.table, step.deleted),
                }
            }
            if !report.tournament_deleted() && report.success {
                log::warn!("No tournament {id} found");
            }
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
