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
//! Telemetry primitives shared across the Seedshelf workspace.
//!
//! Logging goes to stderr so command output on stdout stays machine-readable.

mod init;

pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, command_span, init_logging,
};
