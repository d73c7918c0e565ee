//! Host platform detection
//!
//! Binary naming and process-tree termination differ per OS; both ask this
//! module first and fail with `UnsupportedPlatform` on anything else.

use crate::core::error::{YtdlError, YtdlResult};

/// Platforms with a defined binary-name and tree-kill strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Detects the platform the crate was compiled for.
    pub fn current() -> YtdlResult<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` string to a supported platform.
    pub fn from_os(os: &str) -> YtdlResult<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            other => Err(YtdlError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Executable file name for a tool on this platform ("yt-dlp" -> "yt-dlp.exe").
    pub fn executable_name(self, tool: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", tool),
            Platform::MacOs | Platform::Linux => tool.to_string(),
        }
    }
}

/// Default yt-dlp executable name for the host platform.
pub fn default_ytdlp_name() -> YtdlResult<String> {
    Ok(Platform::current()?.executable_name("yt-dlp"))
}
