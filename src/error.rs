//! Error kinds (§7). `MapOpen`, `ElfOpen`, and `ElfFormat` are fatal to
//! engine initialization; `UnknownTest` and `AssertionFailure` are
//! reported but do not abort the remaining work; `BadCli` stops before any
//! test runs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open process map file: {0}")]
    MapOpen(#[source] std::io::Error),

    #[error("cannot open module file {path}: {source}")]
    ElfOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("module {path} is not valid ELF or has no usable symbol table: {reason}")]
    ElfFormat { path: PathBuf, reason: String },

    #[error("unknown test `{0}`")]
    UnknownTest(String),

    #[error("assertion failed")]
    AssertionFailure,

    #[error("invalid command line: {0}")]
    BadCli(String),
}
