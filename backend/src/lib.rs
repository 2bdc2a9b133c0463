//! # Meetly Rust Backend
//!
//! Weekly availability engine for the Meetly scheduling app.
//!
//! This crate provides a Rust-based backend for Meetly's availability surface:
//! a per-weekday model of bookable time intervals, the timezone handling the
//! pickers rely on, and persistence against a hosted record store that
//! degrades gracefully when rows are missing, malformed, or unreachable.
//!
//! ## Features
//!
//! - **Weekly Model**: Seven weekday buckets of start/end intervals plus an IANA timezone
//! - **Timing Codec**: The JSON wire format shared with the stored `schedule` row
//! - **Persistence**: Update-else-insert writes with optional revision guards
//! - **Fallbacks**: Missing or unreadable rows degrade to the profile timezone or defaults
//! - **Autosave**: Debounced background writes with a watchable save state
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Weekday/time-of-day primitives and the weekly schedule model
//! - [`session`]: Explicit per-session identity passed into every store call
//! - [`store`]: Record store operations, repository pattern, and persistence layer
//! - [`services`]: High-level load/save pipelines, the editor, and autosave
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]
//! ## Concurrency
//!
//! Writes default to last-write-wins, matching the hosted store's own
//! semantics. Callers that cannot afford silent overwrites thread the
//! revision from their last load into a guarded write and handle the
//! resulting conflict by re-loading.

pub mod models;

pub mod session;

pub mod services;

pub mod store;
