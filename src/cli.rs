//! Command-line argument parsing.
//!
//! The same table commands are used for one-shot invocations
//! (`tabula insert A3 Carol ME`) and for lines typed into the
//! interactive shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage a table of string rows stored as CSV
#[derive(Parser, Debug)]
#[command(name = "tabula", version, about = "Manage a table of string rows stored as CSV")]
pub struct CliArgs {
    /// CSV file to operate on (defaults to the configured default_file)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Configuration file (overrides TABULA_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    #[command(flatten)]
    Table(TableCommand),

    /// Create a new, empty table file
    Init {
        /// Comma-separated column names (defaults to the configured headers)
        #[arg(long, value_delimiter = ',')]
        headers: Vec<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start an interactive session on the file
    Shell,

    /// Print the effective configuration
    Config,
}

/// Commands that read or change the table.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    /// Print the table
    Show {
        /// Print headers and rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a row; one value per column
    #[command(visible_alias = "add")]
    Insert {
        #[arg(required = true, value_name = "VALUE")]
        fields: Vec<String>,
    },

    /// Change one field of the row identified by KEY
    Update {
        /// Value of the key column
        key: String,

        /// Column to change, by name or zero-based index
        #[arg(short, long)]
        column: String,

        /// New value
        #[arg(short = 'v', long, allow_hyphen_values = true)]
        value: String,
    },

    /// Remove the row identified by KEY
    #[command(visible_alias = "rm")]
    Delete {
        /// Value of the key column
        key: String,
    },

    /// Sort rows by a column
    Sort {
        /// Column to sort on, by name or zero-based index
        #[arg(short, long)]
        column: String,

        /// Sort in descending order
        #[arg(short, long)]
        descending: bool,
    },

    /// Find rows containing QUERY (case-insensitive)
    Search {
        query: String,

        /// Only look in this column instead of every field
        #[arg(short, long)]
        column: Option<String>,

        /// Save the matches as CSV (defaults to the configured search_export_file)
        #[arg(short, long, value_name = "PATH")]
        export: Option<Option<PathBuf>>,
    },
}

impl TableCommand {
    /// Whether running this command may change the table.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            TableCommand::Insert { .. }
                | TableCommand::Update { .. }
                | TableCommand::Delete { .. }
                | TableCommand::Sort { .. }
        )
    }
}

/// A line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(
    name = "tabula",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands available inside the shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    #[command(flatten)]
    Table(TableCommand),

    /// Replace the table with the contents of a CSV file
    Load {
        path: PathBuf,

        /// Discard unsaved changes
        #[arg(long)]
        force: bool,
    },

    /// Write the table to its file, or to PATH
    Save { path: Option<PathBuf> },

    /// List the commands
    Help,

    /// Leave the shell
    #[command(visible_alias = "exit")]
    Quit {
        /// Leave even if there are unsaved changes
        #[arg(long)]
        force: bool,
    },
}

/// Split a shell line into words.
///
/// Words are separated by whitespace. Single or double quotes group
/// words, and a backslash escapes the next character outside single quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
