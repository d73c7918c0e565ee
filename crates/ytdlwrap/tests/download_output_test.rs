//! Output classification end to end, driven by fake yt-dlp scripts.

#![cfg(unix)]

mod common;

use common::{drain, urls, FakeYtdlp};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use ytdlwrap::download::{AudioRequest, PlaylistSelection, VideoRequest};
use ytdlwrap::options::{AudioConversionFormat, OptionSet};
use ytdlwrap::{DownloadState, RunContext};

const SINGLE_VIDEO: &str = r#"
echo "[youtube] abc: Downloading webpage"
echo "[download] Destination: {dir}/A Video.f137.mp4"
echo "[download]  42.0% of ~10.00MiB at 1.00MiB/s ETA 00:05"
echo "[download] 100.0% of ~10.00MiB at 2.00MiB/s ETA 00:00"
echo "[Merger] Merging formats into \"{dir}/A Video.mp4\""
echo "[Exec] Executing command: echo '{dir}/A Video.mp4'"
echo "{dir}/A Video.mp4"
exit 0
"#;

#[tokio::test]
async fn test_video_download_reports_progress_and_path() {
    let fake = FakeYtdlp::new(SINGLE_VIDEO);
    let ytdl = fake.ytdl(2);
    let (ptx, mut prx) = mpsc::unbounded_channel();
    let (otx, mut orx) = mpsc::unbounded_channel();
    let ctx = RunContext::new().with_progress(ptx).with_output(otx);

    let request = VideoRequest::builder().url("https://example.com/watch?v=abc").build();
    let result = ytdl.run_video_download(&request, &ctx).await.unwrap();

    let expected_path = fake.path("A Video.mp4").to_string_lossy().into_owned();
    assert!(result.success);
    assert!(result.error_output.is_empty());
    assert_eq!(result.data.as_deref(), Some(expected_path.as_str()));

    let events = drain(&mut prx);
    let states: Vec<DownloadState> = events.iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![
            DownloadState::PreProcessing,
            DownloadState::Downloading,
            DownloadState::Downloading,
            DownloadState::PostProcessing,
            DownloadState::Success,
        ]
    );
    assert_eq!(events[0].video_index, 1);
    assert!((events[1].progress - 0.42).abs() < 1e-6);
    assert_eq!(events[1].total_download_size.as_deref(), Some("10.00MiB"));
    assert_eq!(events[1].download_speed.as_deref(), Some("1.00MiB/s"));
    assert_eq!(events[1].eta.as_deref(), Some("00:05"));
    assert_eq!(events[4].data.as_deref(), Some(expected_path.as_str()));

    let lines = drain(&mut orx);
    assert_eq!(lines[0], "Starting Download: https://example.com/watch?v=abc");
    assert_eq!(lines.len(), 8);
}

#[tokio::test]
async fn test_show_args_reports_argument_string() {
    let fake = FakeYtdlp::new("exit 0");
    let ytdl = fake.ytdl(1);
    let (otx, mut orx) = mpsc::unbounded_channel();
    let ctx = RunContext::new().with_output(otx);

    let request = AudioRequest::builder()
        .url("https://example.com/a")
        .format(AudioConversionFormat::Mp3)
        .show_args(true)
        .build();
    let result = ytdl.run_audio_download(&request, &ctx).await.unwrap();
    assert!(result.success);
    assert_eq!(result.data, None);

    let lines = drain(&mut orx);
    assert!(lines[0].starts_with("Arguments: \"https://example.com/a\" "));
    assert!(lines[0].contains("--extract-audio"));
    assert!(lines[0].contains("--audio-format \"mp3\""));
}

#[tokio::test]
async fn test_stderr_error_fails_result() {
    let fake = FakeYtdlp::new(
        r#"
echo "[generic] Extracting URL: https://nope"
echo "ERROR: Unsupported URL" >&2
exit 1
"#,
    );
    let ytdl = fake.ytdl(1);
    let (ptx, mut prx) = mpsc::unbounded_channel();
    let ctx = RunContext::new().with_progress(ptx);

    let request = VideoRequest::builder().url("https://nope").build();
    let result = ytdl.run_video_download(&request, &ctx).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error_output, vec!["ERROR: Unsupported URL"]);
    assert_eq!(result.data, None);

    let errors: Vec<_> = drain(&mut prx)
        .into_iter()
        .filter(|e| e.state == DownloadState::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].data.as_deref(), Some("ERROR: Unsupported URL"));
}

#[tokio::test]
async fn test_nonzero_exit_without_stderr_is_failure() {
    let fake = FakeYtdlp::new("exit 2");
    let ytdl = fake.ytdl(1);
    let result = ytdl
        .run_with_options(&urls(&["u"]), &OptionSet::default(), &RunContext::default())
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.error_output.is_empty());
}

#[tokio::test]
async fn test_playlist_accumulates_paths() {
    let fake = FakeYtdlp::new(
        r#"
for i in 1 2 3; do
  echo "[youtube:tab] Downloading video $i of 3"
  echo "[download]  50.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
  echo "[FixupM4a] Correcting container"
  echo "[Exec] Executing command: echo '{dir}/$i.m4a'"
done
"#,
    );
    let ytdl = fake.ytdl(1);
    let (ptx, mut prx) = mpsc::unbounded_channel();
    let ctx = RunContext::new().with_progress(ptx);

    let request = AudioRequest::builder()
        .url("https://example.com/playlist?list=PL1")
        .playlist(PlaylistSelection::builder().start(1).end(3).build())
        .build();
    let result = ytdl.run_audio_playlist_download(&request, &ctx).await.unwrap();

    assert!(result.success);
    let dir = fake.dir.path().to_string_lossy().into_owned();
    assert_eq!(
        result.data,
        vec![
            format!("{}/1.m4a", dir),
            format!("{}/2.m4a", dir),
            format!("{}/3.m4a", dir),
        ]
    );

    let downloading: Vec<u32> = drain(&mut prx)
        .into_iter()
        .filter(|e| e.state == DownloadState::Downloading)
        .map(|e| e.video_index)
        .collect();
    assert_eq!(downloading, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_arguments_reach_process_in_order() {
    let fake = FakeYtdlp::new(r#"for a in "$@"; do echo "ARG:$a"; done"#);
    let ytdl = fake.ytdl(1);
    let mut options = OptionSet::default();
    options.set_format("best[height<=720]");
    options.set_retries(3);
    options.add_custom_option("--sponsorblock-mark", "all");

    let result = ytdl
        .run_with_options(&urls(&["https://a", "https://b"]), &options, &RunContext::default())
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(
        result.data,
        vec![
            "ARG:https://a",
            "ARG:https://b",
            "ARG:--retries",
            "ARG:3",
            "ARG:--format",
            "ARG:best[height<=720]",
            "ARG:--sponsorblock-mark",
            "ARG:all",
        ]
    );
}

#[tokio::test]
async fn test_version_and_update() {
    let fake = FakeYtdlp::new(
        r#"
case "$1" in
  --version) echo "2024.08.06" ;;
  --update) echo "Current version: 2024.08.06"; echo "yt-dlp is up to date (2024.08.06)" ;;
esac
"#,
    );
    let ytdl = fake.ytdl(1);
    let version = ytdl.run_version(&RunContext::default()).await.unwrap();
    assert!(version.success);
    assert_eq!(version.data, "2024.08.06");

    let update = ytdl.run_update(&RunContext::default()).await.unwrap();
    assert_eq!(update.data, "yt-dlp is up to date (2024.08.06)");
}
