// ABOUTME: Library root for reimage - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod auth;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod output;
pub mod report;
pub mod runtime;
pub mod types;
pub mod update;
