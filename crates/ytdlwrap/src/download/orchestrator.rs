//! High-level yt-dlp operations
//!
//! Every operation follows the same flow: build the baseline options, apply
//! the operation's own fields, merge the caller's overrides on top, run the
//! invocation through the concurrency gate and shape a [`RunResult`].

use std::sync::Arc;

use crate::core::config::{output, OutputPathMarker, Settings};
use crate::core::error::YtdlResult;
use crate::download::metadata::VideoData;
use crate::download::request::{AudioRequest, VideoRequest};
use crate::download::result::{RunContext, RunResult};
use crate::options::OptionSet;
use crate::process::{ConcurrencyGate, Invocation, ProcessInvoker};

/// yt-dlp front end.
///
/// Cheap to share behind an `Arc`; all operations take `&self` and may run
/// concurrently, bounded by the gate.
///
/// # Example
///
/// ```no_run
/// use ytdlwrap::download::VideoRequest;
/// use ytdlwrap::{RunContext, Settings, YoutubeDl};
///
/// # async fn demo() -> ytdlwrap::YtdlResult<()> {
/// let ytdl = YoutubeDl::new(Settings::from_env()?)?;
/// let request = VideoRequest::builder().url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").build();
/// let result = ytdl.run_video_download(&request, &RunContext::default()).await?;
/// if result.success {
///     println!("saved to {:?}", result.data);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct YoutubeDl {
    settings: Settings,
    invoker: ProcessInvoker,
    gate: Arc<ConcurrencyGate>,
}

impl YoutubeDl {
    /// Fails if `settings.max_processes` is outside the allowed range.
    pub fn new(settings: Settings) -> YtdlResult<Self> {
        let gate = Arc::new(ConcurrencyGate::new(settings.max_processes)?);
        let invoker = ProcessInvoker::new(&settings);
        Ok(Self {
            settings,
            invoker,
            gate,
        })
    }

    /// Replaces the invoker, e.g. to change the tree-kill strategy.
    pub fn with_invoker(mut self, invoker: ProcessInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gate(&self) -> &Arc<ConcurrencyGate> {
        &self.gate
    }

    /// Resizes the gate. Shrinking waits for running invocations to finish.
    pub async fn set_max_number_of_processes(&self, count: usize) -> YtdlResult<()> {
        self.gate.resize(count).await
    }

    /// Baseline options shared by the download operations.
    pub fn default_options(&self) -> OptionSet {
        let s = &self.settings;
        let mut options = OptionSet::default();
        options.set_ignore_errors(s.ignore_download_errors);
        options.set_ignore_config(true);
        options.set_no_playlist(true);
        options.set_hls_prefer_native(true);
        options.set_downloader_args(output::EXTERNAL_DOWNLOADER_ARGS);
        options.set_output(s.output_template());
        options.set_restrict_filenames(s.restrict_filenames);
        options.set_no_continue(s.overwrite_files);
        options.set_no_overwrites(!s.overwrite_files);
        options.set_no_part(true);
        options.set_newline(true);
        if let Some(ffmpeg) = &s.ffmpeg_path {
            options.set_ffmpeg_location(ffmpeg.clone());
        }
        self.apply_path_marker(&mut options);
        options
    }

    fn apply_path_marker(&self, options: &mut OptionSet) {
        if self.settings.path_marker == OutputPathMarker::Echo && options.exec().is_none() {
            options.set_exec("echo {}");
        }
    }

    async fn invoke(&self, args: &[String], options: &OptionSet, ctx: &RunContext) -> YtdlResult<Invocation> {
        self.gate
            .run_throttled(&ctx.cancel, self.invoker.run(args, options, ctx))
            .await
    }

    /// Runs yt-dlp with exactly these options; returns the stdout lines.
    pub async fn run_with_options(
        &self,
        urls: &[String],
        options: &OptionSet,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Vec<String>>> {
        let invocation = self.invoke(urls, options, ctx).await?;
        Ok(RunResult::new(invocation.success, invocation.errors, invocation.output))
    }

    /// Downloads one URL with caller-built options; returns the output path.
    ///
    /// The configured path marker is added if the options do not set `--exec`.
    pub async fn run_download_with_options(
        &self,
        url: &str,
        options: &OptionSet,
        show_args: bool,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Option<String>>> {
        let mut options = options.clone();
        self.apply_path_marker(&mut options);
        let result = self.download(url, &options, show_args, ctx).await?;
        Ok(result.map(last_path))
    }

    /// Runs `--update`; returns the last line yt-dlp printed.
    pub async fn run_update(&self, ctx: &RunContext) -> YtdlResult<RunResult<String>> {
        let mut options = OptionSet::default();
        options.set_update(true);
        let result = self.run_with_options(&[], &options, ctx).await?;
        Ok(result.map(|lines| lines.into_iter().last().unwrap_or_default()))
    }

    /// Runs `--version`; returns the version string.
    pub async fn run_version(&self, ctx: &RunContext) -> YtdlResult<RunResult<String>> {
        let mut options = OptionSet::default();
        options.set_version(true);
        let result = self.run_with_options(&[], &options, ctx).await?;
        Ok(result.map(|lines| {
            lines
                .into_iter()
                .map(|l| l.trim().to_string())
                .find(|l| !l.is_empty())
                .unwrap_or_default()
        }))
    }

    /// Fetches metadata with `--dump-single-json` on top of the download
    /// baseline, so a video URL that also names a playlist yields the video.
    ///
    /// `flat` lists playlist entries without extracting each of them. A
    /// document that cannot be deserialized yields a failed result with the
    /// parse error appended to `error_output` and no data.
    pub async fn run_video_data_fetch(
        &self,
        url: &str,
        flat: bool,
        overrides: Option<&OptionSet>,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Option<VideoData>>> {
        let mut options = self.default_options();
        options.set_dump_single_json(true);
        options.set_flat_playlist(flat);
        let options = merge(options, overrides);

        let invocation = self.invoke(&[url.to_string()], &options, ctx).await?;
        let Invocation {
            success,
            mut errors,
            output,
            ..
        } = invocation;
        if !success {
            return Ok(RunResult::new(false, errors, None));
        }

        match parse_metadata(&output) {
            Ok(data) => Ok(RunResult::new(true, errors, Some(data))),
            Err(reason) => {
                log::warn!("Cannot parse metadata of {}: {}", url, reason);
                errors.push(reason);
                Ok(RunResult::new(false, errors, None))
            }
        }
    }

    /// Downloads a single video; returns the output path.
    pub async fn run_video_download(
        &self,
        request: &VideoRequest,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Option<String>>> {
        let options = self.video_options(request, false);
        let result = self.download(&request.url, &options, request.show_args, ctx).await?;
        Ok(result.map(last_path))
    }

    /// Downloads a playlist; returns every output path in completion order.
    pub async fn run_video_playlist_download(
        &self,
        request: &VideoRequest,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Vec<String>>> {
        let options = self.video_options(request, true);
        self.download(&request.url, &options, request.show_args, ctx).await
    }

    /// Downloads and converts the audio of a single video.
    pub async fn run_audio_download(
        &self,
        request: &AudioRequest,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Option<String>>> {
        let options = self.audio_options(request, false);
        let result = self.download(&request.url, &options, request.show_args, ctx).await?;
        Ok(result.map(last_path))
    }

    /// Downloads and converts the audio of every playlist item.
    pub async fn run_audio_playlist_download(
        &self,
        request: &AudioRequest,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Vec<String>>> {
        let options = self.audio_options(request, true);
        self.download(&request.url, &options, request.show_args, ctx).await
    }

    /// Options for a video operation, overrides applied.
    pub fn video_options(&self, request: &VideoRequest, playlist: bool) -> OptionSet {
        let mut options = self.default_options();
        options.set_format(request.format.clone());
        options.set_merge_output_format(request.merge_format);
        options.set_recode_video(request.recode_format);
        if playlist {
            options.set_no_playlist(false);
            options.set_yes_playlist(true);
            request.playlist.apply(&mut options);
        }
        merge(options, request.overrides.as_ref())
    }

    /// Options for an audio operation, overrides applied.
    pub fn audio_options(&self, request: &AudioRequest, playlist: bool) -> OptionSet {
        let mut options = self.default_options();
        options.set_format(output::DEFAULT_AUDIO_FORMAT);
        options.set_extract_audio(true);
        options.set_audio_format(request.format);
        if let Some(quality) = &request.quality {
            options.set_audio_quality(quality.clone());
        }
        if playlist {
            options.set_no_playlist(false);
            options.set_yes_playlist(true);
            request.playlist.apply(&mut options);
        }
        merge(options, request.overrides.as_ref())
    }

    async fn download(
        &self,
        url: &str,
        options: &OptionSet,
        show_args: bool,
        ctx: &RunContext,
    ) -> YtdlResult<RunResult<Vec<String>>> {
        let args = vec![url.to_string()];
        if show_args {
            ctx.forward(format!("Arguments: {}", ProcessInvoker::command_line(&args, options)));
        } else {
            ctx.forward(format!("Starting Download: {}", url));
        }
        let invocation = self.invoke(&args, options, ctx).await?;
        if !invocation.success {
            log::warn!(
                "yt-dlp failed for {} (exit code {:?}, {} error line(s))",
                url,
                invocation.exit_code,
                invocation.errors.len()
            );
        }
        Ok(RunResult::new(invocation.success, invocation.errors, invocation.paths))
    }
}

fn merge(options: OptionSet, overrides: Option<&OptionSet>) -> OptionSet {
    match overrides {
        Some(overrides) => options.override_options(overrides),
        None => options,
    }
}

fn last_path(paths: Vec<String>) -> Option<String> {
    paths.into_iter().last()
}

/// Deserializes the last stdout line holding a JSON document.
fn parse_metadata(lines: &[String]) -> Result<VideoData, String> {
    let mut last_error = None;
    for line in lines.iter().rev().map(|l| l.trim()).filter(|l| l.starts_with('{')) {
        match serde_json::from_str::<VideoData>(line) {
            Ok(data) => return Ok(data),
            Err(e) => {
                last_error.get_or_insert(e);
            }
        }
    }
    Err(match last_error {
        Some(e) => format!("Invalid metadata JSON: {}", e),
        None => "No metadata JSON in output".to_string(),
    })
}
