//! Parameters of the download operations
//!
//! Built with `bon`: only the URL is required, everything else falls back to
//! the defaults in [`crate::core::config::output`].

use bon::Builder;

use crate::core::config::output;
use crate::options::{AudioConversionFormat, DownloadMergeFormat, OptionSet, VideoRecodeFormat};

/// Which items of a playlist to download. Empty means all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct PlaylistSelection {
    /// 1-based index of the first item
    pub start: Option<i64>,
    /// 1-based index of the last item
    pub end: Option<i64>,
    /// Explicit item spec such as "1,3,5-7"; takes precedence over start/end in yt-dlp
    #[builder(into)]
    pub items: Option<String>,
}

impl PlaylistSelection {
    pub(crate) fn apply(&self, options: &mut OptionSet) {
        if let Some(start) = self.start {
            options.set_playlist_start(start);
        }
        if let Some(end) = self.end {
            options.set_playlist_end(end);
        }
        if let Some(items) = &self.items {
            options.set_playlist_items(items.clone());
        }
    }
}

/// Video download of a single URL or a playlist.
///
/// ```
/// use ytdlwrap::download::VideoRequest;
/// use ytdlwrap::options::DownloadMergeFormat;
///
/// let request = VideoRequest::builder()
///     .url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
///     .merge_format(DownloadMergeFormat::Mkv)
///     .build();
/// assert_eq!(request.format, "bestvideo+bestaudio/best");
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct VideoRequest {
    #[builder(into)]
    pub url: String,
    /// yt-dlp format selector
    #[builder(into, default = output::DEFAULT_VIDEO_FORMAT.to_string())]
    pub format: String,
    #[builder(default)]
    pub merge_format: DownloadMergeFormat,
    #[builder(default)]
    pub recode_format: VideoRecodeFormat,
    #[builder(default)]
    pub playlist: PlaylistSelection,
    /// Applied on top of the generated options
    pub overrides: Option<OptionSet>,
    /// Report the full argument string instead of "Starting Download"
    #[builder(default)]
    pub show_args: bool,
}

/// Audio-only download of a single URL or a playlist.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct AudioRequest {
    #[builder(into)]
    pub url: String,
    #[builder(default)]
    pub format: AudioConversionFormat,
    /// VBR quality 0-10 or a bitrate such as "192K"
    #[builder(into)]
    pub quality: Option<String>,
    #[builder(default)]
    pub playlist: PlaylistSelection,
    pub overrides: Option<OptionSet>,
    #[builder(default)]
    pub show_args: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_defaults() {
        let request = AudioRequest::builder().url("https://example.com/a").build();
        assert_eq!(request.format, AudioConversionFormat::Best);
        assert!(request.quality.is_none());
        assert!(!request.show_args);
        assert_eq!(request.playlist, PlaylistSelection::default());
    }

    #[test]
    fn test_selection_sets_playlist_options() {
        let selection = PlaylistSelection::builder().start(2).end(4).build();
        let mut opts = OptionSet::default();
        selection.apply(&mut opts);
        assert_eq!(opts.playlist_start(), Some(2));
        assert_eq!(opts.playlist_end(), Some(4));
        assert_eq!(opts.playlist_items(), None);
    }

    #[test]
    fn test_selection_items() {
        let selection = PlaylistSelection::builder().items("1,3,5-7").build();
        let mut opts = OptionSet::default();
        selection.apply(&mut opts);
        assert_eq!(opts.option_flags(), vec!["--playlist-items \"1,3,5-7\""]);
    }
}
