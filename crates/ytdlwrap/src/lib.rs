//! ytdlwrap - drive the yt-dlp command-line tool from async Rust
//!
//! The crate turns yt-dlp's option surface into typed, mergeable option sets,
//! runs the tool under a resizable concurrency limit, and parses its
//! line-oriented output into a stream of progress events.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, and platform specifics
//! - `options`: Option model (single/multi options, option sets, config files)
//! - `process`: Concurrency gate, process invoker, output parser, tree kill
//! - `download`: Orchestrator operations and their result/progress types

pub mod core;
pub mod download;
pub mod options;
pub mod process;

// Re-export commonly used types for convenience
pub use crate::core::{config, Settings, YtdlError, YtdlResult};
pub use download::{DownloadProgress, DownloadState, RunContext, RunResult, YoutubeDl};
pub use options::{AudioConversionFormat, DownloadMergeFormat, OptionSet, VideoRecodeFormat};
pub use process::{ConcurrencyGate, ProcessInvoker};
