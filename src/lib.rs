//! Installer for the dontstarve server toolkit.
//!
//! Copies systemd user units, toolkit configuration and helper executables
//! from an artifact bundle into the current user's home directory, registers
//! `~/.local/bin` in fish's search path, and reloads the user service
//! manager.  Every step is idempotent, so running `install` twice leaves the
//! same state as running it once.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: resolve the bundle, home directory and manifest
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`tasks`]**: named pipeline steps wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `verify`, `uninstall`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resources;
pub mod tasks;
