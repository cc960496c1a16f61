//! Shared wiring for the four pipeline-stage binaries (`cc0`, `cc1`,
//! `cc1t`, `cc2`): configuration loading and logging setup. Each binary
//! composes the typed errors from `cc-store`/`cc-hb`/`cc-lex`/`cc-parse`/
//! `cc-visit`/`cc-tac` into `anyhow::Error` at its own boundary — there is
//! no driver-level error enum, since every sub-crate error already
//! implements `std::error::Error` via `thiserror`.

pub mod config;
pub mod logging;

pub use config::RuntimeConfig;
pub use logging::init_tracing;
