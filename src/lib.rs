//! Search The Movie Database and keep a local film collection on disk.
//!
//! The library is split the way the CLI uses it: [`config`] resolves
//! preferences and credentials, [`tmdb`] talks to the remote API,
//! [`storage`] persists films and [`export`] projects the collection into
//! other formats. [`commands`] wires them together for each subcommand.

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod fs_utils;
pub mod storage;
pub mod tmdb;
pub mod types;

pub use error::{Error, ErrorKind, Result};
