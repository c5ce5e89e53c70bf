//! buildstamp - stamp build metadata into generated source files.
//!
//! This library provides the pieces behind the buildstamp CLI: git queries,
//! a persistent build counter and literal token substitution over a
//! template, tied together by [`generator::generate`].

#![deny(missing_docs)]

/// Version string from Cargo.toml, with build metadata appended.
pub const VERSION: &str = include_str!(concat!(env!("OUT_DIR"), "/version.txt"));

pub mod build_number;
pub mod cli;
pub mod generator;
pub mod git;
pub mod logging;
pub mod process;
pub mod template;

// Re-export key types for convenience
pub use build_number::BuildNumberStore;
pub use cli::{parse_args, BuildConfig};
pub use generator::{generate, GenerationReport};
pub use process::{CommandRunner, ShellRunner};
