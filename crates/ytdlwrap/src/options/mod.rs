//! yt-dlp option model
//!
//! - `value`: value kinds and their text forms
//! - `option`: a single (or repeatable) CLI option
//! - `enums`: enumerated option values
//! - `catalog`: the declarative table of known options
//! - `set`: the full option set of one invocation

pub mod catalog;
pub mod enums;
pub mod option;
pub mod set;
pub mod value;

pub use catalog::{Flag, OptionSpec, CATALOG};
pub use enums::{AudioConversionFormat, DownloadMergeFormat, FlagEnum, VideoRecodeFormat};
pub use option::CliOption;
pub use set::OptionSet;
pub use value::{OptionValue, ValueKind};
