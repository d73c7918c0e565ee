//! yt-dlp stdout classification
//!
//! yt-dlp has no machine-readable progress protocol, so each stdout line is
//! tested against a few fixed patterns in order:
//!
//! 1. `[download]  42.0% of ~10.00MiB at 1.00MiB/s ETA 00:05` -> `Downloading`
//! 2. `Downloading video 2 of 5` (or `item 2 of 5`) -> `PreProcessing` for item 2
//! 3. any other `[Tag] ...` line right after a download -> `PostProcessing`
//!
//! Everything else is left unclassified. The output path marker is matched
//! separately by [`match_output_path`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::OutputPathMarker;
use crate::download::progress::{DownloadProgress, DownloadState};

static PROGRESS_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"\[download\]\s+(?P<pct>[\d.]+)%(\s+of\s+~?\s*(?P<total>\S+))?\s+at\s+(?:(?P<speed>\S+/s)|[\w\s]+)\s+ETA\s(?P<eta>[\d:]+)",
    )
    .ok()
});

static PLAYLIST_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Downloading (?:video|item) (\d+) of (\d+)").ok());

static POST_PROCESS_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[(\w+)\]\s+").ok());

/// Line printed by the `--exec "echo {}"` post-run hook before it runs.
static ECHO_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\[Exec\] Executing command: echo\s+(.+)$").ok());

static DESTINATION_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[download\] Destination: (.+)").ok());

/// Line classifier for one invocation.
#[derive(Debug, Clone)]
pub struct OutputParser {
    downloading: bool,
    video_index: u32,
}

impl Default for OutputParser {
    fn default() -> Self {
        Self {
            downloading: false,
            video_index: 1,
        }
    }
}

impl OutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the playlist item currently being processed (1-based).
    pub fn video_index(&self) -> u32 {
        self.video_index
    }

    /// Classifies one stdout line, returning the event it produces, if any.
    pub fn parse_line(&mut self, line: &str) -> Option<DownloadProgress> {
        if let Some(caps) = PROGRESS_RE.as_ref().and_then(|re| re.captures(line)) {
            self.downloading = true;
            let percent: f32 = caps.name("pct").and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);
            return Some(DownloadProgress {
                state: DownloadState::Downloading,
                progress: (percent / 100.0).clamp(0.0, 1.0),
                total_download_size: caps.name("total").map(|m| m.as_str().to_string()),
                download_speed: caps.name("speed").map(|m| m.as_str().to_string()),
                eta: caps.name("eta").map(|m| m.as_str().to_string()),
                video_index: self.video_index,
                data: None,
            });
        }

        if let Some(caps) = PLAYLIST_RE.as_ref().and_then(|re| re.captures(line)) {
            self.downloading = false;
            if let Some(index) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                self.video_index = index;
            }
            return Some(DownloadProgress::pre_processing(self.video_index));
        }

        if self.downloading {
            let tag = POST_PROCESS_RE
                .as_ref()
                .and_then(|re| re.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            if let Some(tag) = tag {
                if tag != "download" {
                    self.downloading = false;
                    return Some(DownloadProgress::post_processing(self.video_index));
                }
            }
        }

        None
    }
}

/// Extracts the final output path announced by the configured marker.
pub fn match_output_path(marker: OutputPathMarker, line: &str) -> Option<String> {
    let re = match marker {
        OutputPathMarker::Echo => ECHO_RE.as_ref(),
        OutputPathMarker::Destination => DESTINATION_RE.as_ref(),
    }?;
    let raw = re.captures(line)?.get(1)?.as_str();
    let path = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
