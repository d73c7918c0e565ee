use serde::Serialize;
use strum::Display;

/// Lifecycle state of one invocation as observed from its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    #[default]
    None,
    PreProcessing,
    Downloading,
    PostProcessing,
    Error,
    Success,
}

/// Progress event emitted while yt-dlp runs.
///
/// `total_download_size`, `download_speed` and `eta` are kept in yt-dlp's own
/// formatting ("10.00MiB", "1.00MiB/s", "00:05"). `data` carries the output
/// path on `Success` and the stderr line on `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadProgress {
    pub state: DownloadState,
    /// Fraction in [0, 1]
    pub progress: f32,
    pub total_download_size: Option<String>,
    pub download_speed: Option<String>,
    pub eta: Option<String>,
    /// 1-based index of the current playlist item
    pub video_index: u32,
    pub data: Option<String>,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self {
            state: DownloadState::None,
            progress: 0.0,
            total_download_size: None,
            download_speed: None,
            eta: None,
            video_index: 1,
            data: None,
        }
    }
}

impl DownloadProgress {
    pub fn new(state: DownloadState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn pre_processing(video_index: u32) -> Self {
        Self {
            video_index,
            ..Self::new(DownloadState::PreProcessing)
        }
    }

    pub fn post_processing(video_index: u32) -> Self {
        Self {
            progress: 1.0,
            video_index,
            ..Self::new(DownloadState::PostProcessing)
        }
    }

    pub fn error(line: impl Into<String>) -> Self {
        Self {
            data: Some(line.into()),
            ..Self::new(DownloadState::Error)
        }
    }

    pub fn success(path: impl Into<String>) -> Self {
        Self {
            progress: 1.0,
            data: Some(path.into()),
            ..Self::new(DownloadState::Success)
        }
    }

    /// Percentage for display, rounded down.
    pub fn percent(&self) -> u8 {
        (self.progress.clamp(0.0, 1.0) * 100.0) as u8
    }
}
