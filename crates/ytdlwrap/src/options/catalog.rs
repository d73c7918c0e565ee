//! Declarative catalog of known yt-dlp options
//!
//! Every entry is declared once: variant name, typed accessor pair, value kind
//! and aliases (first alias is canonical). From that single table the macro
//! generates the [`Flag`] enum, the ordered [`CATALOG`] and the typed getters
//! and setters on [`OptionSet`]. Declaration order is serialization order.
//!
//! Kinds: `Bool`, `Str`, `Int`, `Float`, `Date`, `MultiStr` (repeatable
//! string) and `[EnumType]` for the enums in [`crate::options::enums`].

use chrono::NaiveDate;

use crate::options::enums::{AudioConversionFormat, DownloadMergeFormat, VideoRecodeFormat};
use crate::options::set::OptionSet;
use crate::options::value::{OptionValue, ValueKind};

/// Static description of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub aliases: &'static [&'static str],
    pub kind: ValueKind,
    pub multi: bool,
}

impl OptionSpec {
    pub fn flag(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or_default()
    }
}

macro_rules! option_kind {
    (Bool) => {
        ValueKind::Bool
    };
    (Str) => {
        ValueKind::Str
    };
    (Int) => {
        ValueKind::Int
    };
    (Float) => {
        ValueKind::Float
    };
    (Date) => {
        ValueKind::Date
    };
    (MultiStr) => {
        ValueKind::Str
    };
    ([$enum:ty]) => {
        ValueKind::Enum(<$enum as strum::VariantNames>::VARIANTS)
    };
}

macro_rules! option_multi {
    (MultiStr) => {
        true
    };
    ($other:tt) => {
        false
    };
}

macro_rules! option_accessor {
    (Bool; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> bool {
            self.get_bool($flag)
        }

        pub fn $set(&mut self, value: bool) {
            self.assign($flag, OptionValue::Bool(value));
        }
    };
    (Str; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> Option<&str> {
            self.get_str($flag)
        }

        pub fn $set(&mut self, value: impl Into<String>) {
            self.assign($flag, OptionValue::Str(value.into()));
        }
    };
    (Int; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> Option<i64> {
            self.get_int($flag)
        }

        pub fn $set(&mut self, value: i64) {
            self.assign($flag, OptionValue::Int(value));
        }
    };
    (Float; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> Option<f64> {
            self.get_float($flag)
        }

        pub fn $set(&mut self, value: f64) {
            self.assign($flag, OptionValue::Float(value));
        }
    };
    (Date; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> Option<NaiveDate> {
            self.get_date($flag)
        }

        pub fn $set(&mut self, value: NaiveDate) {
            self.assign($flag, OptionValue::Date(value));
        }
    };
    (MultiStr; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> Vec<&str> {
            self.get_strs($flag)
        }

        pub fn $set<I, S>(&mut self, values: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.assign_all($flag, values.into_iter().map(|v| OptionValue::Str(v.into())).collect());
        }
    };
    ([$enum:ty]; [$(#[$doc:meta])*] $get:ident, $set:ident, $flag:expr) => {
        $(#[$doc])*
        pub fn $get(&self) -> $enum {
            self.get_enum::<$enum>($flag)
        }

        pub fn $set(&mut self, value: $enum) {
            let name: &'static str = value.into();
            self.assign($flag, OptionValue::Enum(name.to_string()));
        }
    };
}

macro_rules! known_options {
    ($(
        $(#[$doc:meta])*
        $variant:ident => $get:ident, $set:ident : $kind:tt [$($alias:literal),+ $(,)?];
    )*) => {
        /// Identifier of a catalog option, in declaration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Flag {
            $($variant,)*
        }

        impl Flag {
            pub const ALL: &'static [Flag] = &[$(Flag::$variant,)*];
        }

        /// Every known option, indexed by `Flag as usize`.
        pub static CATALOG: &[OptionSpec] = &[
            $(OptionSpec {
                aliases: &[$($alias),+],
                kind: option_kind!($kind),
                multi: option_multi!($kind),
            },)*
        ];

        impl OptionSet {
            $(option_accessor!($kind; [$(#[$doc])*] $get, $set, Flag::$variant);)*
        }
    };
}

impl Flag {
    pub fn spec(self) -> &'static OptionSpec {
        &CATALOG[self as usize]
    }

    /// Canonical flag text, e.g. `--format`.
    pub fn as_str(self) -> &'static str {
        self.spec().flag()
    }

    /// Looks up a catalog entry by any of its aliases.
    pub fn from_alias(alias: &str) -> Option<Flag> {
        Flag::ALL
            .iter()
            .copied()
            .find(|flag| flag.spec().aliases.contains(&alias))
    }
}

known_options! {
    // General
    /// Print program version and exit
    Version => version, set_version: Bool ["--version"];
    /// Update the program to the latest version
    Update => update, set_update: Bool ["--update", "-U"];
    /// Switch to another release channel or tag when updating
    UpdateTo => update_to, set_update_to: Str ["--update-to"];
    /// Continue on download errors
    IgnoreErrors => ignore_errors, set_ignore_errors: Bool ["--ignore-errors", "-i"];
    AbortOnError => abort_on_error, set_abort_on_error: Bool ["--abort-on-error"];
    DumpUserAgent => dump_user_agent, set_dump_user_agent: Bool ["--dump-user-agent"];
    ListExtractors => list_extractors, set_list_extractors: Bool ["--list-extractors"];
    /// Prefix for unqualified URLs, e.g. "ytsearch"
    DefaultSearch => default_search, set_default_search: Str ["--default-search"];
    /// Do not load any configuration file besides the ones given with --config-locations
    IgnoreConfig => ignore_config, set_ignore_config: Bool ["--ignore-config"];
    ConfigLocations => config_locations, set_config_locations: MultiStr ["--config-locations"];
    /// Do not extract the videos of a playlist, only list them
    FlatPlaylist => flat_playlist, set_flat_playlist: Bool ["--flat-playlist"];
    LiveFromStart => live_from_start, set_live_from_start: Bool ["--live-from-start"];
    WaitForVideo => wait_for_video, set_wait_for_video: Str ["--wait-for-video"];
    MarkWatched => mark_watched, set_mark_watched: Bool ["--mark-watched"];

    // Network
    /// HTTP/HTTPS/SOCKS proxy URL
    Proxy => proxy, set_proxy: Str ["--proxy"];
    SocketTimeout => socket_timeout, set_socket_timeout: Float ["--socket-timeout"];
    SourceAddress => source_address, set_source_address: Str ["--source-address"];
    Impersonate => impersonate, set_impersonate: Str ["--impersonate"];
    ForceIpv4 => force_ipv4, set_force_ipv4: Bool ["--force-ipv4", "-4"];
    ForceIpv6 => force_ipv6, set_force_ipv6: Bool ["--force-ipv6", "-6"];
    EnableFileUrls => enable_file_urls, set_enable_file_urls: Bool ["--enable-file-urls"];

    // Geo-restriction
    GeoVerificationProxy => geo_verification_proxy, set_geo_verification_proxy: Str ["--geo-verification-proxy"];
    Xff => xff, set_xff: Str ["--xff"];

    // Video selection
    PlaylistStart => playlist_start, set_playlist_start: Int ["--playlist-start"];
    PlaylistEnd => playlist_end, set_playlist_end: Int ["--playlist-end"];
    /// Comma separated playlist indices or ranges, e.g. "1:3,7,-5::2"
    PlaylistItems => playlist_items, set_playlist_items: Str ["--playlist-items", "-I"];
    MinFilesize => min_filesize, set_min_filesize: Str ["--min-filesize"];
    MaxFilesize => max_filesize, set_max_filesize: Str ["--max-filesize"];
    /// Download only videos uploaded on this date
    Date => date, set_date: Date ["--date"];
    DateBefore => date_before, set_date_before: Date ["--datebefore"];
    DateAfter => date_after, set_date_after: Date ["--dateafter"];
    MatchFilters => match_filters, set_match_filters: MultiStr ["--match-filters"];
    NoPlaylist => no_playlist, set_no_playlist: Bool ["--no-playlist"];
    YesPlaylist => yes_playlist, set_yes_playlist: Bool ["--yes-playlist"];
    AgeLimit => age_limit, set_age_limit: Int ["--age-limit"];
    DownloadArchive => download_archive, set_download_archive: Str ["--download-archive"];
    MaxDownloads => max_downloads, set_max_downloads: Int ["--max-downloads"];
    BreakOnExisting => break_on_existing, set_break_on_existing: Bool ["--break-on-existing"];

    // Download
    ConcurrentFragments => concurrent_fragments, set_concurrent_fragments: Int ["--concurrent-fragments", "-N"];
    /// Maximum download rate in bytes per second, e.g. "50K" or "4.2M"
    LimitRate => limit_rate, set_limit_rate: Str ["--limit-rate", "-r"];
    ThrottledRate => throttled_rate, set_throttled_rate: Str ["--throttled-rate"];
    Retries => retries, set_retries: Int ["--retries", "-R"];
    FragmentRetries => fragment_retries, set_fragment_retries: Int ["--fragment-retries"];
    SkipUnavailableFragments => skip_unavailable_fragments, set_skip_unavailable_fragments: Bool ["--skip-unavailable-fragments"];
    KeepFragments => keep_fragments, set_keep_fragments: Bool ["--keep-fragments"];
    BufferSize => buffer_size, set_buffer_size: Str ["--buffer-size"];
    HttpChunkSize => http_chunk_size, set_http_chunk_size: Str ["--http-chunk-size"];
    PlaylistRandom => playlist_random, set_playlist_random: Bool ["--playlist-random"];
    HlsPreferNative => hls_prefer_native, set_hls_prefer_native: Bool ["--hls-prefer-native"];
    HlsUseMpegts => hls_use_mpegts, set_hls_use_mpegts: Bool ["--hls-use-mpegts"];
    DownloadSections => download_sections, set_download_sections: MultiStr ["--download-sections"];
    /// External downloader to use, e.g. "aria2c" or "ffmpeg"
    Downloader => downloader, set_downloader: Str ["--downloader", "--external-downloader"];
    DownloaderArgs => downloader_args, set_downloader_args: Str ["--downloader-args", "--external-downloader-args"];

    // Filesystem
    BatchFile => batch_file, set_batch_file: Str ["--batch-file", "-a"];
    Paths => paths, set_paths: MultiStr ["--paths", "-P"];
    /// Output filename template
    Output => output, set_output: Str ["--output", "-o"];
    OutputNaPlaceholder => output_na_placeholder, set_output_na_placeholder: Str ["--output-na-placeholder"];
    RestrictFilenames => restrict_filenames, set_restrict_filenames: Bool ["--restrict-filenames"];
    WindowsFilenames => windows_filenames, set_windows_filenames: Bool ["--windows-filenames"];
    TrimFilenames => trim_filenames, set_trim_filenames: Int ["--trim-filenames"];
    NoOverwrites => no_overwrites, set_no_overwrites: Bool ["--no-overwrites", "-w"];
    ForceOverwrites => force_overwrites, set_force_overwrites: Bool ["--force-overwrites"];
    /// Resume partially downloaded files
    ContinuePartial => continue_partial, set_continue_partial: Bool ["--continue", "-c"];
    NoContinue => no_continue, set_no_continue: Bool ["--no-continue"];
    NoPart => no_part, set_no_part: Bool ["--no-part"];
    NoMtime => no_mtime, set_no_mtime: Bool ["--no-mtime"];
    WriteDescription => write_description, set_write_description: Bool ["--write-description"];
    WriteInfoJson => write_info_json, set_write_info_json: Bool ["--write-info-json"];
    Cookies => cookies, set_cookies: Str ["--cookies"];
    CookiesFromBrowser => cookies_from_browser, set_cookies_from_browser: Str ["--cookies-from-browser"];
    CacheDir => cache_dir, set_cache_dir: Str ["--cache-dir"];
    NoCacheDir => no_cache_dir, set_no_cache_dir: Bool ["--no-cache-dir"];

    // Thumbnails
    WriteThumbnail => write_thumbnail, set_write_thumbnail: Bool ["--write-thumbnail"];
    WriteAllThumbnails => write_all_thumbnails, set_write_all_thumbnails: Bool ["--write-all-thumbnails"];

    // Verbosity and simulation
    Quiet => quiet, set_quiet: Bool ["--quiet", "-q"];
    NoWarnings => no_warnings, set_no_warnings: Bool ["--no-warnings"];
    Simulate => simulate, set_simulate: Bool ["--simulate", "-s"];
    SkipDownload => skip_download, set_skip_download: Bool ["--skip-download"];
    /// Field name or output template to print to stdout, repeatable
    Print => print, set_print: MultiStr ["--print", "-O"];
    /// Print one JSON line per video instead of downloading
    DumpJson => dump_json, set_dump_json: Bool ["--dump-json", "-j"];
    /// Print a single JSON document for the whole URL (playlists included)
    DumpSingleJson => dump_single_json, set_dump_single_json: Bool ["--dump-single-json", "-J"];
    /// Output progress bar as new lines
    Newline => newline, set_newline: Bool ["--newline"];
    NoProgress => no_progress, set_no_progress: Bool ["--no-progress"];
    ProgressTemplate => progress_template, set_progress_template: Str ["--progress-template"];
    Verbose => verbose, set_verbose: Bool ["--verbose", "-v"];

    // Workarounds
    Encoding => encoding, set_encoding: Str ["--encoding"];
    NoCheckCertificates => no_check_certificates, set_no_check_certificates: Bool ["--no-check-certificates"];
    AddHeaders => add_headers, set_add_headers: MultiStr ["--add-headers"];
    SleepInterval => sleep_interval, set_sleep_interval: Float ["--sleep-interval", "--min-sleep-interval"];
    MaxSleepInterval => max_sleep_interval, set_max_sleep_interval: Float ["--max-sleep-interval"];
    SleepRequests => sleep_requests, set_sleep_requests: Float ["--sleep-requests"];

    // Video format
    /// Format selector, e.g. "bestvideo+bestaudio/best"
    Format => format, set_format: Str ["--format", "-f"];
    FormatSort => format_sort, set_format_sort: Str ["--format-sort", "-S"];
    /// Container used when video and audio streams are merged
    MergeOutputFormat => merge_output_format, set_merge_output_format: [DownloadMergeFormat] ["--merge-output-format"];
    PreferFreeFormats => prefer_free_formats, set_prefer_free_formats: Bool ["--prefer-free-formats"];
    CheckFormats => check_formats, set_check_formats: Bool ["--check-formats"];

    // Subtitles
    WriteSubs => write_subs, set_write_subs: Bool ["--write-subs"];
    WriteAutoSubs => write_auto_subs, set_write_auto_subs: Bool ["--write-auto-subs"];
    SubFormat => sub_format, set_sub_format: Str ["--sub-format"];
    SubLangs => sub_langs, set_sub_langs: Str ["--sub-langs"];

    // Authentication
    Username => username, set_username: Str ["--username", "-u"];
    Password => password, set_password: Str ["--password", "-p"];
    TwoFactor => two_factor, set_two_factor: Str ["--twofactor", "-2"];
    Netrc => netrc, set_netrc: Bool ["--netrc", "-n"];
    VideoPassword => video_password, set_video_password: Str ["--video-password"];

    // Post-processing
    /// Convert video files to audio-only files (requires ffmpeg)
    ExtractAudio => extract_audio, set_extract_audio: Bool ["--extract-audio", "-x"];
    AudioFormat => audio_format, set_audio_format: [AudioConversionFormat] ["--audio-format"];
    /// VBR quality 0 (best) to 10 (worst), or a bitrate such as "128K"
    AudioQuality => audio_quality, set_audio_quality: Str ["--audio-quality"];
    RemuxVideo => remux_video, set_remux_video: Str ["--remux-video"];
    RecodeVideo => recode_video, set_recode_video: [VideoRecodeFormat] ["--recode-video"];
    PostprocessorArgs => postprocessor_args, set_postprocessor_args: MultiStr ["--postprocessor-args", "--ppa"];
    KeepVideo => keep_video, set_keep_video: Bool ["--keep-video", "-k"];
    EmbedSubs => embed_subs, set_embed_subs: Bool ["--embed-subs"];
    EmbedThumbnail => embed_thumbnail, set_embed_thumbnail: Bool ["--embed-thumbnail"];
    EmbedMetadata => embed_metadata, set_embed_metadata: Bool ["--embed-metadata", "--add-metadata"];
    EmbedChapters => embed_chapters, set_embed_chapters: Bool ["--embed-chapters"];
    ParseMetadata => parse_metadata, set_parse_metadata: MultiStr ["--parse-metadata"];
    /// Location of the ffmpeg binary or its containing directory
    FfmpegLocation => ffmpeg_location, set_ffmpeg_location: Str ["--ffmpeg-location"];
    /// Command to run on the file after download; "{}" is replaced by the path
    Exec => exec, set_exec: Str ["--exec"];
    ConvertSubs => convert_subs, set_convert_subs: Str ["--convert-subs"];
    ConvertThumbnails => convert_thumbnails, set_convert_thumbnails: Str ["--convert-thumbnails"];
    SplitChapters => split_chapters, set_split_chapters: Bool ["--split-chapters"];
    SponsorblockRemove => sponsorblock_remove, set_sponsorblock_remove: Str ["--sponsorblock-remove"];
    ForceKeyframesAtCuts => force_keyframes_at_cuts, set_force_keyframes_at_cuts: Bool ["--force-keyframes-at-cuts"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_matches_flag_order() {
        assert_eq!(CATALOG.len(), Flag::ALL.len());
        for (index, flag) in Flag::ALL.iter().enumerate() {
            assert_eq!(*flag as usize, index);
        }
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut seen = HashSet::new();
        for spec in CATALOG {
            for alias in spec.aliases {
                assert!(alias.starts_with('-'), "{alias} is not a flag");
                assert!(seen.insert(*alias), "{alias} declared twice");
            }
        }
    }

    #[test]
    fn test_from_alias() {
        assert_eq!(Flag::from_alias("-f"), Some(Flag::Format));
        assert_eq!(Flag::from_alias("--format"), Some(Flag::Format));
        assert_eq!(Flag::from_alias("--ppa"), Some(Flag::PostprocessorArgs));
        assert_eq!(Flag::from_alias("--frobnicate"), None);
    }

    #[test]
    fn test_canonical_is_first_alias() {
        assert_eq!(Flag::ExtractAudio.as_str(), "--extract-audio");
        assert_eq!(Flag::Downloader.as_str(), "--downloader");
    }

    #[test]
    fn test_enum_kinds_start_with_default() {
        match Flag::RecodeVideo.spec().kind {
            ValueKind::Enum(names) => assert_eq!(names.first(), Some(&"none")),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(Flag::Paths.spec().multi);
        assert!(!Flag::Format.spec().multi);
    }
}
