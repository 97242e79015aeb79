//! tabula - manage a table of string rows stored as CSV.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::error;

use tabula::app::{run_shell, Session};
use tabula::cli::{CliArgs, CliCommand, TableCommand};
use tabula::config::{self, Config};
use tabula::{logging, AppError, Table};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let config = load_config(args.config.as_deref()).context("could not load configuration")?;
    let result = run(args, config);
    logging::shutdown();

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("error: {}", e.user_message());
        if let Some(action) = e.suggested_action() {
            eprintln!("hint: {}", action);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> config::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn run(args: CliArgs, config: Config) -> tabula::Result<()> {
    let path = args
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.settings.default_file));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command.unwrap_or(CliCommand::Table(TableCommand::Show { json: false })) {
        CliCommand::Table(command) => {
            let mut session = Session::open(&path, config)?;
            let outcome = session.execute(&command)?;
            if session.is_dirty() {
                session.save(None)?;
            }
            session.report(&mut out, &outcome)?;
        }
        CliCommand::Init { headers, force } => {
            if path.exists() && !force {
                return Err(AppError::usage(format!(
                    "{} already exists. Use --force to overwrite it.",
                    path.display()
                )));
            }
            let headers = if headers.is_empty() {
                config.settings.default_headers.clone()
            } else {
                headers
            };
            let mut session = Session::with_table(Table::new(headers), &path, config);
            let target = session.save(None)?;
            writeln!(out, "Created {}", target.display())?;
        }
        CliCommand::Shell => {
            let mut session = Session::open(&path, config)?;
            let stdin = io::stdin();
            run_shell(&mut session, stdin.lock(), &mut out)?;
        }
        CliCommand::Config => {
            let location = match &args.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            writeln!(out, "# {}", location.display())?;
            write!(out, "{}", config.to_toml()?)?;
        }
    }

    Ok(())
}
