#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Terminal client for a Seedshelf torrent catalogue.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `api.rs`: typed REST client for the catalogue API
//! - `client.rs`: shared HTTP client construction and error types
//! - `session.rs` / `storage.rs`: persisted login session
//! - `workspace.rs`: per-command context and detail-view sequencing
//! - `views.rs` / `output.rs`: view models and renderers
//! - `forms.rs`: prompts and input validation for mutating commands
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod api;
pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod forms;
pub(crate) mod output;
pub(crate) mod session;
pub(crate) mod storage;
pub(crate) mod views;
pub(crate) mod workspace;

pub use cli::run;
