//! Download operations and their result types

pub mod metadata;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod result;

pub use metadata::{FormatData, MetadataType, ThumbnailData, VideoData};
pub use orchestrator::YoutubeDl;
pub use progress::{DownloadProgress, DownloadState};
pub use request::{AudioRequest, PlaylistSelection, VideoRequest};
pub use result::{RunContext, RunResult};
