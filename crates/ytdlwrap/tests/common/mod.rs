//! Common test utilities
//!
//! Fake yt-dlp executables: small POSIX shell scripts written into a temp
//! directory and launched through `/bin/sh` (the interpreter front end), so
//! they never need the executable bit.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::mpsc;
use ytdlwrap::core::config::OutputPathMarker;
use ytdlwrap::{Settings, YoutubeDl};

/// A fake yt-dlp script and the directory holding it.
pub struct FakeYtdlp {
    pub dir: TempDir,
    pub script: PathBuf,
}

impl FakeYtdlp {
    /// Writes `body` as the script. `{dir}` is replaced by the temp directory path.
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("yt-dlp.sh");
        let body = body.replace("{dir}", &dir.path().to_string_lossy());
        fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        Self { dir, script }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn settings(&self, max_processes: usize) -> Settings {
        Settings::builder()
            .ytdlp_path(self.script.to_string_lossy().into_owned())
            .python_path("/bin/sh")
            .output_folder(self.dir.path())
            .path_marker(OutputPathMarker::Echo)
            .max_processes(max_processes)
            .build()
    }

    pub fn ytdl(&self, max_processes: usize) -> YoutubeDl {
        YoutubeDl::new(self.settings(max_processes)).unwrap()
    }
}

/// Collects everything currently queued on a channel.
pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}

/// Highest number of overlapping "start"/"end" pairs in a log file.
pub fn max_overlap(log: &Path) -> usize {
    let content = fs::read_to_string(log).unwrap_or_default();
    let mut running = 0usize;
    let mut max = 0usize;
    for line in content.lines() {
        match line.trim() {
            "start" => {
                running += 1;
                max = max.max(running);
            }
            "end" => running = running.saturating_sub(1),
            _ => {}
        }
    }
    max
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
