//! Idempotent, best-effort rewrite pipeline for Next.js `page.tsx` files.
//!
//! The pipeline walks a page tree, decides per file whether it is eligible,
//! runs an ordered chain of [`codemods::Codemod`]s over the text and writes
//! the file back only when something changed:
//!
//! - [`walker`] - lazy traversal yielding page files, pruning excluded dirs
//! - [`eligibility`] - pure "should this file be touched" decision
//! - [`codemods`] - the transform steps, built on the [`markup`] scanner
//! - [`pipeline`] - per-file driver, [`writer`] for persistence
//! - [`report`] - the [`report::RunSummary`] returned by a run

pub mod breadcrumbs;
pub mod codemods;
pub mod config;
pub mod eligibility;
pub mod markup;
pub mod pipeline;
pub mod report;
pub mod walker;
pub mod writer;

pub use config::{AppConfig, Config};
pub use pipeline::{Mode, Pipeline};
pub use report::{FileOutcome, RunSummary};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Unknown app '{0}'")]
    UnknownApp(String),

    #[error("No apps configured")]
    NoApps,
}

pub type Result<T> = std::result::Result<T, Error>;
