//! tabula - a small in-memory table manager with CSV load/save.
//!
//! The [`Table`] type holds rows of string fields under named columns and
//! supports insert, update, delete, stable sort and case-insensitive search.
//! [`Session`] binds a table to a file for the command-line front end.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod table;

pub use app::{Outcome, Session};
pub use error::{AppError, Result};
pub use table::{Row, SearchOutcome, Table, TableError, TableSnapshot};
