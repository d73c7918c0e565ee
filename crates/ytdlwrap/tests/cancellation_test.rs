//! Cancelling a running invocation tears down the whole process tree.

#![cfg(target_os = "linux")]

mod common;

use common::{urls, FakeYtdlp};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use ytdlwrap::download::VideoRequest;
use ytdlwrap::options::OptionSet;
use ytdlwrap::{DownloadState, RunContext, YtdlError};

/// Starts a helper process, records its pid and waits on it.
const SPAWNS_HELPER: &str = r#"
echo "[download]   1.0% of 10.00MiB at 1.00MiB/s ETA 00:10"
sleep 30 &
echo $! > "{dir}/helper.pid"
wait
"#;

/// Leaves a helper holding stdout behind and exits right away.
const ORPHANS_HELPER: &str = r#"
sleep 30 &
echo $! > "{dir}/helper.pid"
exit 0
"#;

fn is_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // state is the first field after the parenthesised command name
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

async fn wait_for_file(path: &Path) -> String {
    for _ in 0..100 {
        if let Ok(content) = fs::read_to_string(path) {
            if !content.trim().is_empty() {
                return content;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{} never appeared", path.display());
}

async fn wait_until_dead(pid: u32) -> bool {
    for _ in 0..100 {
        if !is_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_kills_process_tree() {
    let fake = FakeYtdlp::new(SPAWNS_HELPER);
    let ytdl = fake.ytdl(1);
    let cancel = CancellationToken::new();
    let (ptx, mut prx) = mpsc::unbounded_channel();
    let ctx = RunContext::new().with_cancel(cancel.clone()).with_progress(ptx);

    let request = VideoRequest::builder().url("https://example.com/long").build();
    let run = ytdl.run_video_download(&request, &ctx);
    let watcher = async {
        let pid: u32 = wait_for_file(&fake.path("helper.pid")).await.trim().parse().unwrap();
        assert!(is_alive(pid));
        cancel.cancel();
        pid
    };
    let (result, helper) = tokio::join!(run, watcher);

    assert!(matches!(result, Err(YtdlError::Cancelled)));
    assert!(wait_until_dead(helper).await, "helper {helper} survived cancellation");

    let mut saw_download = false;
    while let Ok(event) = prx.try_recv() {
        saw_download |= event.state == DownloadState::Downloading;
    }
    assert!(saw_download);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_run_with_options() {
    let fake = FakeYtdlp::new(SPAWNS_HELPER);
    let ytdl = fake.ytdl(1);
    let cancel = CancellationToken::new();
    let ctx = RunContext::new().with_cancel(cancel.clone());

    let args = urls(&["x"]);
    let options = OptionSet::default();
    let run = ytdl.run_with_options(&args, &options, &ctx);
    let watcher = async {
        let pid: u32 = wait_for_file(&fake.path("helper.pid")).await.trim().parse().unwrap();
        cancel.cancel();
        pid
    };
    let (result, helper) = tokio::join!(run, watcher);

    assert!(result.unwrap_err().is_cancelled());
    assert!(wait_until_dead(helper).await);
    // the gate permit came back
    assert_eq!(ytdl.gate().available(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_after_root_exit_kills_helper() {
    let fake = FakeYtdlp::new(ORPHANS_HELPER);
    let ytdl = fake.ytdl(1);
    let cancel = CancellationToken::new();
    let ctx = RunContext::new().with_cancel(cancel.clone());

    let args = urls(&["x"]);
    let options = OptionSet::default();
    let run = ytdl.run_with_options(&args, &options, &ctx);
    let watcher = async {
        let pid: u32 = wait_for_file(&fake.path("helper.pid")).await.trim().parse().unwrap();
        // give the root time to exit so only the helper keeps the pipe open
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(is_alive(pid));
        cancel.cancel();
        pid
    };
    let (result, helper) = tokio::join!(run, watcher);

    assert!(result.unwrap_err().is_cancelled());
    assert!(wait_until_dead(helper).await, "helper {helper} survived cancellation");
    assert_eq!(ytdl.gate().available(), 1);
}
