use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ytdlwrap::options::{AudioConversionFormat, DownloadMergeFormat, Flag, OptionSet, ValueKind, VideoRecodeFormat};

#[derive(Parser)]
#[command(name = "ytdlwrap")]
#[command(author, version, about = "Run yt-dlp downloads with live progress and bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the yt-dlp executable (defaults to YTDL_BIN or "yt-dlp")
    #[arg(long, global = true)]
    pub ytdlp: Option<String>,

    /// Python interpreter used to run a script version of yt-dlp
    #[arg(long, global = true)]
    pub python: Option<String>,

    /// Output folder (defaults to DOWNLOAD_FOLDER or the current directory)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Maximum number of yt-dlp processes running at once
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// yt-dlp style config file applied on top of the generated options
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Restrict file names to ASCII characters
    #[arg(long, global = true)]
    pub restrict_filenames: bool,

    /// Print the full yt-dlp argument string before each download
    #[arg(long, global = true)]
    pub show_args: bool,

    /// Debug logging and raw yt-dlp output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download one or more videos
    Video {
        #[arg(required = true)]
        urls: Vec<String>,

        /// yt-dlp format selector
        #[arg(short, long)]
        format: Option<String>,

        /// Container for merged video and audio streams
        #[arg(long, default_value_t = DownloadMergeFormat::Unspecified)]
        merge: DownloadMergeFormat,

        /// Re-encode the result into this container
        #[arg(long, default_value_t = VideoRecodeFormat::None)]
        recode: VideoRecodeFormat,
    },

    /// Download audio only and convert it
    Audio {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Target audio codec
        #[arg(short, long, default_value_t = AudioConversionFormat::Mp3)]
        format: AudioConversionFormat,

        /// VBR quality 0-10 or a bitrate such as 192K
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Download a playlist
    Playlist {
        url: String,

        /// Extract audio instead of downloading video
        #[arg(long)]
        audio: bool,

        /// First item to download (1-based)
        #[arg(long)]
        start: Option<i64>,

        /// Last item to download (1-based)
        #[arg(long)]
        end: Option<i64>,

        /// Item selection such as "1,3,5-7"
        #[arg(long)]
        items: Option<String>,
    },

    /// Print metadata of a video or playlist
    Info {
        url: String,

        /// List playlist entries without resolving each of them
        #[arg(long)]
        flat: bool,

        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },

    /// Run yt-dlp with arbitrary arguments, e.g. `ytdlwrap run URL -- --format best`
    Run {
        urls: Vec<String>,

        /// yt-dlp options, after `--`
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Update yt-dlp
    Update,

    /// Print the yt-dlp version
    Version,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Turns raw `--flag [value]` tokens into an option set.
///
/// Known flags take a value unless they are boolean; unknown flags take the
/// next token as value when it does not look like a flag.
pub fn options_from_tokens(tokens: &[String]) -> ytdlwrap::YtdlResult<OptionSet> {
    let mut lines = Vec::new();
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let takes_value = match Flag::from_alias(token) {
            Some(flag) => flag.spec().kind != ValueKind::Bool,
            None => iter.peek().is_some_and(|next| !next.starts_with('-')),
        };
        match iter.peek() {
            Some(value) if takes_value => {
                lines.push(format!("{} \"{}\"", token, value));
                iter.next();
            }
            _ => lines.push(token.clone()),
        }
    }
    OptionSet::from_config_lines(lines)
}
