//! Rollog - append timestamped lines to size-rolled log files
//!
//! Each write resolves the target path, creates the file and its directory on demand,
//! archives the file once it reaches the size threshold, and appends one
//! `<timestamp> <domain>\<user>  ::::  <text>` line, optionally echoing it to the console.

pub mod config;
pub mod console;
pub mod error;
pub mod identity;
pub mod logging;

pub use error::LogError;
