//! Calchat CLI library.
//!
//! This crate provides the HTTP client for the scheduling assistant API,
//! the command-line interface, and the interactive REPL.

pub mod api;
pub mod cli;
pub mod commands;
pub mod repl;
