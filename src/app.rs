//! The editing session: one table, its backing file, and the commands
//! that act on them.
//!
//! A [`Session`] owns the only [`Table`] instance. Front ends (one-shot CLI,
//! interactive shell, tests) drive it through [`Session::execute`] and
//! re-render a snapshot after every change.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info, warn};

use crate::cli::{split_words, ShellCommand, ShellLine, TableCommand};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::render::{render_grid, render_json, row_count_label};
use crate::table::csv::save_rows_to_path;
use crate::table::{SearchOutcome, Table};

/// What a command produced, for the front end to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Display the current table.
    Show { json: bool },
    /// The table changed.
    Changed(String),
    /// Search results, and where they were exported if requested.
    Matches {
        query: String,
        outcome: SearchOutcome,
        exported: Option<PathBuf>,
    },
    /// Informational message; the table is unchanged.
    Message(String),
    /// Leave the shell.
    Quit,
}

/// A table bound to a file, plus the configuration used to edit it.
pub struct Session {
    table: Table,
    config: Config,
    path: PathBuf,
    dirty: bool,
}

impl Session {
    /// Open `path`, or start an empty table with the configured headers if
    /// the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let path = path.into();
        let table = if path.exists() {
            Table::open(&path, &config.csv)?
        } else {
            debug!(path = %path.display(), "File does not exist, starting empty table");
            Table::new(config.settings.default_headers.iter().cloned())
        };

        Ok(Self {
            table,
            config,
            path,
            dirty: false,
        })
    }

    /// Wrap an existing table.
    pub fn with_table(table: Table, path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            table,
            config,
            path: path.into(),
            dirty: false,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the table has changed since it was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run a table command.
    pub fn execute(&mut self, command: &TableCommand) -> Result<Outcome> {
        debug!(?command, "Executing command");
        let key_index = self.config.settings.key_column;

        let outcome = match command {
            TableCommand::Show { json } => Outcome::Show { json: *json },
            TableCommand::Insert { fields } => {
                self.table.insert(fields.clone())?;
                Outcome::Changed("Entry added.".to_string())
            }
            TableCommand::Update { key, column, value } => {
                let column_index = self.resolve_column(column)?;
                self.table
                    .update_entry(key_index, column_index, key, value.as_str())?;
                Outcome::Changed("Entry updated.".to_string())
            }
            TableCommand::Delete { key } => {
                self.table.delete_entry(key_index, key)?;
                Outcome::Changed("Entry deleted.".to_string())
            }
            TableCommand::Sort { column, descending } => {
                let column_index = self.resolve_column(column)?;
                self.table.sort_by_column(column_index, !descending)?;
                Outcome::Changed(format!(
                    "Sorted by {} ({}).",
                    self.table.headers()[column_index],
                    if *descending { "descending" } else { "ascending" }
                ))
            }
            TableCommand::Search {
                query,
                column,
                export,
            } => self.search(query, column.as_deref(), export.as_ref())?,
        };

        if command.is_mutating() {
            self.dirty = true;
        }
        Ok(outcome)
    }

    /// Run a shell command; table commands go through [`Session::execute`].
    pub fn execute_shell(&mut self, command: &ShellCommand) -> Result<Outcome> {
        match command {
            ShellCommand::Table(command) => self.execute(command),
            ShellCommand::Load { path, force } => {
                if self.dirty && !force {
                    return Ok(Outcome::Message(
                        "Unsaved changes. Use 'save' first, or 'load --force'.".to_string(),
                    ));
                }
                self.load(path)?;
                Ok(Outcome::Changed(format!("Loaded {}.", path.display())))
            }
            ShellCommand::Save { path } => {
                let target = self.save(path.as_deref())?;
                Ok(Outcome::Message(format!("Data saved to {}", target.display())))
            }
            ShellCommand::Help => Ok(Outcome::Message(SHELL_HELP.to_string())),
            ShellCommand::Quit { force } => {
                if self.dirty && !force {
                    Ok(Outcome::Message(
                        "Unsaved changes. Use 'save' first, or 'quit --force'.".to_string(),
                    ))
                } else {
                    Ok(Outcome::Quit)
                }
            }
        }
    }

    /// Replace the table with the contents of `path` and bind to it.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.table.load_path(path, &self.config.csv)?;
        self.path = path.to_path_buf();
        self.dirty = false;
        Ok(())
    }

    /// Save the table to `path`, or to its own file. Returns the target.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let target = path.unwrap_or(&self.path).to_path_buf();
        self.table.save_path(&target, &self.config.csv)?;
        if target == self.path {
            self.dirty = false;
        }
        Ok(target)
    }

    /// Resolve a column given by header name or zero-based index.
    pub fn resolve_column(&self, spec: &str) -> Result<usize> {
        if let Some(index) = self.table.column_index(spec) {
            return Ok(index);
        }
        match spec.parse::<usize>() {
            Ok(index) if index < self.table.width() => Ok(index),
            _ => Err(AppError::usage(format!(
                "Unknown column '{}'. Columns: {}",
                spec,
                self.table.headers().join(", ")
            ))),
        }
    }

    fn search(
        &self,
        query: &str,
        column: Option<&str>,
        export: Option<&Option<PathBuf>>,
    ) -> Result<Outcome> {
        let outcome = match column {
            Some(column) => self.table.search_column(self.resolve_column(column)?, query)?,
            None => self.table.search(query),
        };

        let exported = match (export, &outcome) {
            (Some(target), SearchOutcome::Found(rows)) => {
                let target = target
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&self.config.settings.search_export_file));
                save_rows_to_path(&target, self.table.headers(), rows, &self.config.csv)?;
                info!(path = %target.display(), rows = rows.len(), "Exported search results");
                Some(target)
            }
            _ => None,
        };

        Ok(Outcome::Matches {
            query: query.to_string(),
            outcome,
            exported,
        })
    }

    /// Print an outcome the way the front ends display it.
    pub fn report<W: Write>(&self, out: &mut W, outcome: &Outcome) -> Result<()> {
        match outcome {
            Outcome::Show { json: true } => {
                let json = render_json(&self.table.snapshot())
                    .map_err(|e| AppError::other(format!("could not render JSON: {}", e)))?;
                writeln!(out, "{}", json)?;
            }
            Outcome::Show { json: false } => self.print_table(out)?,
            Outcome::Changed(message) => {
                writeln!(out, "{}", message)?;
                self.print_table(out)?;
            }
            Outcome::Matches {
                query,
                outcome,
                exported,
            } => match outcome {
                SearchOutcome::NoMatches => {
                    writeln!(out, "No matching data found for query: {}", query)?;
                }
                SearchOutcome::Found(rows) => {
                    write!(out, "{}", render_grid(self.table.headers(), rows))?;
                    writeln!(out, "{} matching", row_count_label(rows.len()))?;
                    if let Some(path) = exported {
                        writeln!(out, "Search results saved to {}", path.display())?;
                    }
                }
            },
            Outcome::Message(message) => writeln!(out, "{}", message)?,
            Outcome::Quit => {}
        }
        Ok(())
    }

    fn print_table<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", render_grid(self.table.headers(), self.table.rows()))?;
        writeln!(out, "{}", row_count_label(self.table.len()))?;
        Ok(())
    }
}

const SHELL_HELP: &str = "\
Commands:
  show [--json]                         print the table
  insert VALUE...                       append a row
  update KEY -c COLUMN -v VALUE         change one field
  delete KEY                            remove a row
  sort -c COLUMN [-d]                   sort by a column
  search QUERY [-c COLUMN] [-e [PATH]]  find rows, optionally export them
  load PATH [--force]                   replace the table from a file
  save [PATH]                           write the table
  quit [--force]                        leave the shell
Quote values containing spaces: update A1 -c Name -v \"Ada Lovelace\"";

/// Read commands from `input` until `quit` or end of input.
///
/// Errors that leave the table usable are reported and the loop goes on.
pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
) -> Result<()> {
    info!(path = %session.path().display(), "Starting shell");
    writeln!(
        out,
        "tabula: {} ({}). Type 'help' for commands.",
        session.path().display(),
        row_count_label(session.table().len())
    )?;

    let mut lines = input.lines();
    loop {
        write!(out, "tabula> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{}", e.render())?;
                continue;
            }
        };

        match session.execute_shell(&command) {
            Ok(Outcome::Quit) => break,
            Ok(outcome) => session.report(out, &outcome)?,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Command failed");
                writeln!(out, "error: {}", e.user_message())?;
                if let Some(action) = e.suggested_action() {
                    writeln!(out, "hint: {}", action)?;
                }
            }
            Err(e) => return Err(e),
        }
    }

    if session.is_dirty() {
        warn!("Leaving shell with unsaved changes");
    }
    info!("Shell finished");
    Ok(())
}
