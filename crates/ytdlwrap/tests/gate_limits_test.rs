//! Concurrency gate behaviour with real processes.

#![cfg(unix)]

mod common;

use common::{max_overlap, urls, FakeYtdlp};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ytdlwrap::options::OptionSet;
use ytdlwrap::{RunContext, YoutubeDl, YtdlError};

/// Logs start/end into `$1` around a short sleep.
const LOGGING_SLEEPER: &str = r#"
log="$1"
echo start >> "$log"
sleep 0.3
echo end >> "$log"
"#;

async fn run_batch(ytdl: &Arc<YoutubeDl>, log: &str, count: usize) {
    let mut tasks = Vec::new();
    for _ in 0..count {
        let ytdl = Arc::clone(ytdl);
        let args = urls(&[log]);
        tasks.push(tokio::spawn(async move {
            ytdl.run_with_options(&args, &OptionSet::default(), &RunContext::default())
                .await
        }));
    }
    for task in tasks {
        let result = task.await.unwrap().unwrap();
        assert!(result.success);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_bounds_running_processes() {
    let fake = FakeYtdlp::new(LOGGING_SLEEPER);
    let ytdl = Arc::new(fake.ytdl(2));
    let log = fake.path("runs.log");

    run_batch(&ytdl, &log.to_string_lossy(), 6).await;

    let overlap = max_overlap(&log);
    assert!(overlap >= 1);
    assert!(overlap <= 2, "observed {overlap} concurrent processes");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shrink_while_busy() {
    let fake = FakeYtdlp::new(LOGGING_SLEEPER);
    let ytdl = Arc::new(fake.ytdl(3));
    let before = fake.path("before.log");
    let after = fake.path("after.log");

    let busy = {
        let ytdl = Arc::clone(&ytdl);
        let log = before.to_string_lossy().into_owned();
        tokio::spawn(async move { run_batch(&ytdl, &log, 3).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    ytdl.set_max_number_of_processes(1).await.unwrap();
    assert_eq!(ytdl.gate().capacity(), 1);
    busy.await.unwrap();

    run_batch(&ytdl, &after.to_string_lossy(), 3).await;
    assert_eq!(max_overlap(&after), 1);
}

#[tokio::test]
async fn test_out_of_range_resize_is_rejected() {
    let fake = FakeYtdlp::new("exit 0");
    let ytdl = fake.ytdl(2);
    let err = ytdl.set_max_number_of_processes(0).await.unwrap_err();
    assert!(matches!(err, YtdlError::CapacityOutOfRange { requested: 0, max: 100 }));
    assert_eq!(ytdl.gate().capacity(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queued_invocation_cancelled_before_start() {
    let fake = FakeYtdlp::new(
        r#"
touch "$1"
sleep 0.5
"#,
    );
    let ytdl = Arc::new(fake.ytdl(1));
    let first_marker = fake.path("first");
    let second_marker = fake.path("second");

    let first = {
        let ytdl = Arc::clone(&ytdl);
        let args = urls(&[&*first_marker.to_string_lossy()]);
        tokio::spawn(async move {
            ytdl.run_with_options(&args, &OptionSet::default(), &RunContext::default())
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let cancel = CancellationToken::new();
    let second = {
        let ytdl = Arc::clone(&ytdl);
        let args = urls(&[&*second_marker.to_string_lossy()]);
        let ctx = RunContext::new().with_cancel(cancel.clone());
        tokio::spawn(async move { ytdl.run_with_options(&args, &OptionSet::default(), &ctx).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let err = second.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(first.await.unwrap().unwrap().success);
    assert!(!second_marker.exists());
}
