//! `ielts-platform` - storage and authentication core of the IELTS teaching platform
//!
//! This crate keeps the platform's collections (students, lessons, homework,
//! activity log, ...) in a key-value store, seeds them with defaults, derives
//! student progress, and authenticates admins and students against the stored
//! records with independent per-role sessions.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
)]

/// Configuration management for database and platform settings
pub mod config;
/// Core logic - storage facade, sessions, authentication, notifications
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Records stored in the platform's collections
pub mod models;

#[cfg(test)]
pub mod test_utils;
