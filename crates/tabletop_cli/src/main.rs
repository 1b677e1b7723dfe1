//! `tabletop` executable.
//!
//! # Responsibility
//! - Load server config, start logging and run the HTTP server.
//! - Offer a `migrate` command that prepares a database file without serving.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tabletop_core::db::migrations::{stored_schema_version, supported_schema_version};
use tabletop_core::db::open_db;
use tabletop_http::{load_config, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "tabletop", version, about = "Board-game state tracker server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON game API.
    Serve {
        #[command(flatten)]
        common: CommonArgs,
        /// Overrides `bind_addr`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create or upgrade the database, then exit.
    Migrate {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print core linkage info.
    Ping,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// TOML config file; built-in defaults when omitted.
    #[arg(long, short, env = "TABLETOP_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides `db_path`.
    #[arg(long)]
    db: Option<PathBuf>,
}

impl CommonArgs {
    fn load(&self) -> Result<ServerConfig, String> {
        let mut config = load_config(self.config.as_deref()).map_err(|err| err.to_string())?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { common, bind } => run_serve(&common, bind),
        Command::Migrate { common } => run_migrate(&common),
        Command::Ping => {
            println!("tabletop_core ping={}", tabletop_core::ping());
            println!("tabletop_core version={}", tabletop_core::core_version());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("tabletop: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_serve(common: &CommonArgs, bind: Option<String>) -> Result<(), String> {
    let mut config = common.load()?;
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    start_logging(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("cannot start runtime: {err}"))?;
    runtime.block_on(tabletop_http::serve(config)).map_err(|err| {
        log::error!("event=server_start module=cli status=error error={err}");
        err.to_string()
    })
}

fn run_migrate(common: &CommonArgs) -> Result<(), String> {
    let config = common.load()?;
    start_logging(&config)?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let version = stored_schema_version(&conn).map_err(|err| err.to_string())?;
    println!(
        "{} schema_version={version} latest={}",
        config.db_path.display(),
        supported_schema_version()
    );
    Ok(())
}

fn start_logging(config: &ServerConfig) -> Result<(), String> {
    match config.log_dir.as_deref() {
        Some(dir) => tabletop_core::init_logging(&config.log_level, dir),
        None => tabletop_core::init_stderr_logging(&config.log_level),
    }
}
