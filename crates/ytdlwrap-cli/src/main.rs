mod cli;

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use cli::{options_from_tokens, Cli, Commands};
use ytdlwrap::download::{AudioRequest, PlaylistSelection, VideoRequest};
use ytdlwrap::options::OptionSet;
use ytdlwrap::{DownloadProgress, DownloadState, RunContext, RunResult, Settings, YoutubeDl};

fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    pretty_env_logger::formatted_builder().parse_filters(&filters).init();
}

fn build_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::from_env().context("Cannot determine the yt-dlp executable")?;
    if let Some(path) = &cli.ytdlp {
        settings.ytdlp_path = path.clone();
    }
    if cli.python.is_some() {
        settings.python_path = cli.python.clone();
    }
    if let Some(folder) = &cli.output {
        settings.output_folder = folder.clone();
    }
    if let Some(jobs) = cli.jobs {
        settings.max_processes = jobs;
    }
    settings.restrict_filenames |= cli.restrict_filenames;
    Ok(settings)
}

/// Prints progress and status lines of one job to stderr until both senders are gone.
fn spawn_renderer(label: String) -> (RunContext, tokio::task::JoinHandle<()>) {
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<DownloadProgress>();
    let (output_tx, mut output_rx) = mpsc::unbounded_channel::<String>();
    let ctx = RunContext::new().with_progress(progress_tx).with_output(output_tx);

    let handle = tokio::spawn(async move {
        let mut last_percent = None;
        loop {
            tokio::select! {
                Some(progress) = progress_rx.recv() => {
                    if progress.state == DownloadState::Downloading {
                        let percent = progress.percent();
                        if last_percent == Some(percent) {
                            continue;
                        }
                        last_percent = Some(percent);
                        eprintln!(
                            "[{}] item {} {:>3}% of {} at {} ETA {}",
                            label,
                            progress.video_index,
                            percent,
                            progress.total_download_size.as_deref().unwrap_or("?"),
                            progress.download_speed.as_deref().unwrap_or("?"),
                            progress.eta.as_deref().unwrap_or("?"),
                        );
                    } else {
                        last_percent = None;
                        match &progress.data {
                            Some(data) => eprintln!("[{}] {}: {}", label, progress.state, data),
                            None => eprintln!("[{}] {}", label, progress.state),
                        }
                    }
                }
                Some(line) = output_rx.recv() => {
                    eprintln!("[{}] {}", label, line);
                }
                else => break,
            }
        }
    });
    (ctx, handle)
}

fn report<T>(label: &str, result: &RunResult<T>) -> bool {
    for line in &result.error_output {
        log::warn!("[{}] {}", label, line);
    }
    if !result.success {
        log::error!("[{}] yt-dlp reported a failure", label);
    }
    result.success
}

fn config_overrides(cli: &Cli) -> Result<Option<OptionSet>> {
    cli.config
        .as_ref()
        .map(|path| {
            OptionSet::load_config_file(path).with_context(|| format!("Cannot load config file {}", path.display()))
        })
        .transpose()
}

/// Runs one job per URL through the shared gate and collects their outcome.
async fn run_jobs<F, Fut>(ytdl: &Arc<YoutubeDl>, cancel: &CancellationToken, urls: Vec<String>, job: F) -> Result<()>
where
    F: Fn(Arc<YoutubeDl>, String, RunContext) -> Fut,
    Fut: std::future::Future<Output = ytdlwrap::YtdlResult<bool>> + Send + 'static,
{
    let mut jobs = JoinSet::new();
    for url in urls {
        let (ctx, renderer) = spawn_renderer(url.clone());
        let ctx = ctx.with_cancel(cancel.clone());
        let fut = job(Arc::clone(ytdl), url.clone(), ctx);
        jobs.spawn(async move {
            let outcome = fut.await;
            // the context is dropped with the future, which closes the channels
            let _ = renderer.await;
            (url, outcome)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = jobs.join_next().await {
        let (url, outcome) = joined.context("Download task panicked")?;
        match outcome {
            Ok(true) => log::info!("Finished {}", url),
            Ok(false) => failed += 1,
            Err(e) if e.is_cancelled() => {
                log::warn!("Cancelled {}", url);
                failed += 1;
            }
            Err(e) => {
                log::error!("{}: {}", url, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} download(s) did not succeed", failed);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);

    let settings = build_settings(&cli)?;
    log::debug!("Using settings: {:?}", settings);
    let ytdl = Arc::new(YoutubeDl::new(settings)?);
    let overrides = config_overrides(&cli)?;
    let show_args = cli.show_args;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, stopping running downloads");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Video {
            urls,
            format,
            merge,
            recode,
        } => {
            run_jobs(&ytdl, &cancel, urls, move |ytdl, url, ctx| {
                let request = VideoRequest::builder()
                    .url(url.clone())
                    .maybe_format(format.clone())
                    .merge_format(merge)
                    .recode_format(recode)
                    .maybe_overrides(overrides.clone())
                    .show_args(show_args)
                    .build();
                async move {
                    let result = ytdl.run_video_download(&request, &ctx).await?;
                    if let Some(path) = &result.data {
                        println!("{}", path);
                    }
                    Ok(report(&url, &result))
                }
            })
            .await
        }
        Commands::Audio { urls, format, quality } => {
            run_jobs(&ytdl, &cancel, urls, move |ytdl, url, ctx| {
                let request = AudioRequest::builder()
                    .url(url.clone())
                    .format(format)
                    .maybe_quality(quality.clone())
                    .maybe_overrides(overrides.clone())
                    .show_args(show_args)
                    .build();
                async move {
                    let result = ytdl.run_audio_download(&request, &ctx).await?;
                    if let Some(path) = &result.data {
                        println!("{}", path);
                    }
                    Ok(report(&url, &result))
                }
            })
            .await
        }
        Commands::Playlist {
            url,
            audio,
            start,
            end,
            items,
        } => {
            let playlist = PlaylistSelection::builder()
                .maybe_start(start)
                .maybe_end(end)
                .maybe_items(items)
                .build();
            run_jobs(&ytdl, &cancel, vec![url], move |ytdl, url, ctx| {
                let playlist = playlist.clone();
                let overrides = overrides.clone();
                async move {
                    let result = if audio {
                        let request = AudioRequest::builder()
                            .url(url.clone())
                            .playlist(playlist)
                            .maybe_overrides(overrides)
                            .show_args(show_args)
                            .build();
                        ytdl.run_audio_playlist_download(&request, &ctx).await?
                    } else {
                        let request = VideoRequest::builder()
                            .url(url.clone())
                            .playlist(playlist)
                            .maybe_overrides(overrides)
                            .show_args(show_args)
                            .build();
                        ytdl.run_video_playlist_download(&request, &ctx).await?
                    };
                    for path in &result.data {
                        println!("{}", path);
                    }
                    Ok(report(&url, &result))
                }
            })
            .await
        }
        Commands::Info { url, flat, json } => {
            let ctx = RunContext::new().with_cancel(cancel.clone());
            let result = ytdl.run_video_data_fetch(&url, flat, overrides.as_ref(), &ctx).await?;
            if !report(&url, &result) {
                bail!("Cannot fetch metadata of {}", url);
            }
            let Some(data) = result.data else {
                bail!("yt-dlp returned no metadata for {}", url);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("{} ({})", data.title.as_deref().unwrap_or("?"), data.id.as_deref().unwrap_or("?"));
                if let Some(uploader) = &data.uploader {
                    println!("  uploader: {}", uploader);
                }
                if let Some(duration) = data.duration {
                    println!("  duration: {}s", duration);
                }
                if data.is_playlist() {
                    println!("  entries: {}", data.entries.len());
                    for (i, entry) in data.entries.iter().enumerate() {
                        println!(
                            "  {:>3}. {}",
                            i + 1,
                            entry.title.as_deref().or(entry.id.as_deref()).unwrap_or("?")
                        );
                    }
                } else {
                    println!("  formats: {}", data.formats.len());
                }
            }
            Ok(())
        }
        Commands::Run { urls, args } => {
            let mut options = options_from_tokens(&args)?;
            if let Some(overrides) = &overrides {
                options = options.override_options(overrides);
            }
            let (ctx, renderer) = spawn_renderer("yt-dlp".to_string());
            let ctx = ctx.with_cancel(cancel.clone());
            let result = ytdl.run_with_options(&urls, &options, &ctx).await;
            drop(ctx);
            let _ = renderer.await;
            let result = result?;
            for line in &result.data {
                println!("{}", line);
            }
            if !report("yt-dlp", &result) {
                bail!("yt-dlp exited with an error");
            }
            Ok(())
        }
        Commands::Update => {
            let ctx = RunContext::new().with_cancel(cancel.clone());
            let result = ytdl.run_update(&ctx).await?;
            println!("{}", result.data);
            if !report("update", &result) {
                bail!("yt-dlp update failed");
            }
            Ok(())
        }
        Commands::Version => {
            let ctx = RunContext::new().with_cancel(cancel.clone());
            let result = ytdl.run_version(&ctx).await?;
            if !report("version", &result) {
                bail!("Cannot query the yt-dlp version");
            }
            println!("{}", result.data);
            Ok(())
        }
    }
}
