use bon::Builder;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::error::YtdlResult;
use crate::core::platform;

/// yt-dlp binary path override
/// Read once from the YTDL_BIN environment variable
/// When unset, the platform executable name is used ("yt-dlp" / "yt-dlp.exe")
pub static YTDL_BIN: Lazy<Option<String>> = Lazy::new(|| env::var("YTDL_BIN").ok().filter(|s| !s.is_empty()));

/// ffmpeg binary path
/// Read from FFMPEG_BIN; passed to yt-dlp as --ffmpeg-location when set
pub static FFMPEG_BIN: Lazy<Option<String>> =
    Lazy::new(|| env::var("FFMPEG_BIN").ok().filter(|s| !s.is_empty()));

/// Download folder path
/// Read from DOWNLOAD_FOLDER, defaults to the current directory
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> = Lazy::new(|| {
    let folder = env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| ".".to_string());
    shellexpand::tilde(&folder).into_owned()
});

/// Initial number of concurrently running yt-dlp processes
/// Read from YTDL_MAX_PROCESSES, clamped to the allowed range
pub static MAX_PROCESSES: Lazy<usize> = Lazy::new(|| {
    env::var("YTDL_MAX_PROCESSES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(|n| n.clamp(process::MIN_PROCESSES, process::MAX_PROCESSES))
        .unwrap_or(process::DEFAULT_PROCESSES)
});

/// Process execution configuration
pub mod process {
    use std::time::Duration;

    /// Upper bound for the concurrency gate
    pub const MAX_PROCESSES: usize = 100;

    /// Lower bound for the concurrency gate
    pub const MIN_PROCESSES: usize = 1;

    /// Gate capacity when nothing is configured
    pub const DEFAULT_PROCESSES: usize = 4;

    /// Time a terminated process tree gets to exit before it is force-killed
    pub const KILL_GRACE_SECS: u64 = 5;

    /// Timeout for helper commands (pgrep, kill, taskkill)
    pub const HELPER_TIMEOUT_SECS: u64 = 30;

    /// Pause between terminating and killing an orphaned process group
    pub const ORPHAN_SETTLE_MILLIS: u64 = 500;

    pub fn kill_grace() -> Duration {
        Duration::from_secs(KILL_GRACE_SECS)
    }

    pub fn helper_timeout() -> Duration {
        Duration::from_secs(HELPER_TIMEOUT_SECS)
    }

    pub fn orphan_settle() -> Duration {
        Duration::from_millis(ORPHAN_SETTLE_MILLIS)
    }
}

/// Output naming and format selection defaults
pub mod output {
    /// yt-dlp output template for downloaded files
    pub const DEFAULT_FILE_TEMPLATE: &str = "%(title)s.%(ext)s";

    /// Format selector for video downloads
    pub const DEFAULT_VIDEO_FORMAT: &str = "bestvideo+bestaudio/best";

    /// Format selector for audio-only downloads
    pub const DEFAULT_AUDIO_FORMAT: &str = "bestaudio/best";

    /// Passed as --downloader-args so ffmpeg-based downloads stay quiet
    pub const EXTERNAL_DOWNLOADER_ARGS: &str = "ffmpeg:-nostats -loglevel 0";
}

/// Resolves the yt-dlp executable: YTDL_BIN if set, else the platform name.
pub fn ytdlp_bin() -> YtdlResult<String> {
    match YTDL_BIN.as_ref() {
        Some(bin) => Ok(bin.clone()),
        None => platform::default_ytdlp_name(),
    }
}

/// How the final output file path is announced on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputPathMarker {
    /// `--exec "echo {}"` post-run hook; the echoed command carries the path
    #[default]
    Echo,
    /// `[download] Destination: <path>` announcement lines
    Destination,
}

/// Per-orchestrator configuration.
///
/// `Default` reads the environment-backed statics above; deserializing fills
/// missing keys from the same defaults.
///
/// # Example
///
/// ```
/// use ytdlwrap::Settings;
///
/// let settings = Settings::builder()
///     .ytdlp_path("/usr/local/bin/yt-dlp")
///     .output_folder("/tmp/videos")
///     .restrict_filenames(true)
///     .build();
/// assert!(settings.overwrite_files);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the yt-dlp executable
    #[builder(into, default = default_ytdlp_path())]
    pub ytdlp_path: String,
    /// Python interpreter; when set, `ytdlp_path` must point to a script version of yt-dlp
    #[builder(into)]
    pub python_path: Option<String>,
    /// Path to the ffmpeg executable, passed via --ffmpeg-location
    #[builder(into)]
    pub ffmpeg_path: Option<String>,
    /// Folder where items are downloaded to
    #[builder(into, default = PathBuf::from(DOWNLOAD_FOLDER.as_str()))]
    pub output_folder: PathBuf,
    /// yt-dlp output template of the downloaded file name
    #[builder(into, default = output::DEFAULT_FILE_TEMPLATE.to_string())]
    pub output_file_template: String,
    /// Restrict file names to ASCII characters
    #[builder(default)]
    pub restrict_filenames: bool,
    /// Overwrite existing files instead of continuing or skipping them
    #[builder(default = true)]
    pub overwrite_files: bool,
    /// Continue with the next item when a download fails
    #[builder(default = true)]
    pub ignore_download_errors: bool,
    /// Windows only: run through cmd.exe with code page 65001 for Unicode output
    #[builder(default = true)]
    pub windows_encoding_workaround: bool,
    /// Mechanism used to discover the final output file path
    #[builder(default)]
    pub path_marker: OutputPathMarker,
    /// Initial capacity of the concurrency gate
    #[builder(default = *MAX_PROCESSES)]
    pub max_processes: usize,
}

fn default_ytdlp_path() -> String {
    ytdlp_bin().unwrap_or_else(|_| "yt-dlp".to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().maybe_ffmpeg_path(FFMPEG_BIN.clone()).build()
    }
}

impl Settings {
    /// Builds settings from the environment, failing if the platform has no
    /// default executable name and YTDL_BIN is not set.
    pub fn from_env() -> YtdlResult<Self> {
        Ok(Settings {
            ytdlp_path: ytdlp_bin()?,
            ..Settings::default()
        })
    }

    /// Full output path template: folder joined with the file template.
    pub fn output_template(&self) -> String {
        join_template(&self.output_folder, &self.output_file_template)
    }
}

fn join_template(folder: &Path, template: &str) -> String {
    folder.join(template).to_string_lossy().into_owned()
}
