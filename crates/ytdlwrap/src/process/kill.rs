//! Process-tree termination
//!
//! yt-dlp spawns ffmpeg and other helpers, so cancelling only the direct
//! child leaves orphans behind. Termination always follows the same steps:
//! enumerate the tree once (descendants, then the root), ask every process to
//! terminate, wait for the root within a grace period and force-kill the
//! whole list if it is still alive.
//!
//! On Unix the root is started as the leader of its own process group, so
//! helpers that were orphaned when the root exited are still reached through
//! the group.
//!
//! Platform strategies:
//! - Linux / macOS: `pgrep -P` recursively plus the process group, then
//!   `kill -TERM` / `kill -KILL`
//! - Windows: `taskkill /T`, which walks the tree itself

use async_trait::async_trait;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::core::config;
use crate::core::error::{YtdlError, YtdlResult};
use crate::core::platform::Platform;

/// Termination request strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSignal {
    Terminate,
    Kill,
}

/// Platform mechanism for finding and signalling a process tree.
#[async_trait]
pub trait TreeKill: Send + Sync {
    /// Every process of the tree rooted at `root`, descendants first and the
    /// root last.
    async fn enumerate(&self, root: u32) -> YtdlResult<Vec<u32>>;

    /// Sends `signal` to every listed process. Already exited processes are
    /// not an error.
    async fn signal(&self, pids: &[u32], signal: KillSignal) -> YtdlResult<()>;

    /// Sends `signal` to every member of process group `group`. An empty
    /// group is not an error.
    async fn signal_group(&self, _group: u32, _signal: KillSignal) -> YtdlResult<()> {
        Ok(())
    }
}

/// Picks the strategy for the host platform.
pub fn platform_tree_kill() -> Arc<dyn TreeKill> {
    match Platform::current() {
        Ok(Platform::Windows) => Arc::new(TaskKill),
        Ok(Platform::Linux | Platform::MacOs) => Arc::new(PgrepKill),
        Err(_) => Arc::new(Unsupported),
    }
}

/// Terminates `child` and all of its descendants.
///
/// `group` is the process group the child leads, if it was started as one.
/// Returns once the root has been reaped. Strategy failures still fall back
/// to killing the direct child before the error is returned.
pub async fn kill_tree(
    child: &mut Child,
    group: Option<u32>,
    strategy: &dyn TreeKill,
    grace: Duration,
) -> YtdlResult<()> {
    let Some(root) = child.id() else {
        return match group {
            Some(group) => kill_group(strategy, group, grace).await,
            None => Ok(()),
        };
    };

    let pids = match strategy.enumerate(root).await {
        Ok(pids) => pids,
        Err(e) => {
            log::warn!("Cannot enumerate process tree of {}: {}, killing root only", root, e);
            child.kill().await?;
            return Err(e);
        }
    };
    log::info!("Terminating process tree of {} ({} process(es))", root, pids.len());

    if let Err(e) = signal_all(strategy, &pids, group, KillSignal::Terminate).await {
        log::warn!("Graceful termination of {} failed: {}", root, e);
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            log::debug!("Process {} exited after termination: {}", root, status);
            // the root pid is reaped and may be reused; sweep descendants only
            let descendants: Vec<u32> = pids.into_iter().filter(|&pid| pid != root).collect();
            if let Err(e) = signal_all(strategy, &descendants, group, KillSignal::Kill).await {
                log::debug!("Final kill sweep of {} failed: {}", root, e);
            }
            Ok(())
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => {
            log::warn!(
                "Process {} still running {}s after termination, force killing",
                root,
                grace.as_secs()
            );
            if let Err(e) = signal_all(strategy, &pids, group, KillSignal::Kill).await {
                log::warn!("Force kill of process tree {} failed: {}", root, e);
            }
            child.kill().await?;
            Ok(())
        }
    }
}

/// Terminates what is left of a process group whose leader already exited.
///
/// Members cannot be waited on, so they get a short settle period between
/// the terminate and kill requests.
async fn kill_group(strategy: &dyn TreeKill, group: u32, grace: Duration) -> YtdlResult<()> {
    log::info!("Terminating remaining members of process group {}", group);
    strategy.signal_group(group, KillSignal::Terminate).await?;
    tokio::time::sleep(grace.min(config::process::orphan_settle())).await;
    strategy.signal_group(group, KillSignal::Kill).await
}

async fn signal_all(strategy: &dyn TreeKill, pids: &[u32], group: Option<u32>, signal: KillSignal) -> YtdlResult<()> {
    let listed = strategy.signal(pids, signal).await;
    if let Some(group) = group {
        strategy.signal_group(group, signal).await?;
    }
    listed
}

/// Run a helper command with a timeout.
pub(crate) async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> YtdlResult<Output> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(YtdlError::Io(e)),
        Err(_) => Err(YtdlError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("helper command timed out after {}s", timeout.as_secs()),
        ))),
    }
}

/// `pgrep -P` / `kill` based strategy for Unix-like systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgrepKill;

impl PgrepKill {
    async fn children(&self, pid: u32) -> YtdlResult<Vec<u32>> {
        let output = run_with_timeout(
            Command::new("pgrep").arg("-P").arg(pid.to_string()),
            config::process::helper_timeout(),
        )
        .await?;
        // exit code 1 just means "no children"
        Ok(parse_pid_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl TreeKill for PgrepKill {
    async fn enumerate(&self, root: u32) -> YtdlResult<Vec<u32>> {
        let mut found = Vec::new();
        let mut frontier = vec![root];
        while let Some(pid) = frontier.pop() {
            for child in self.children(pid).await? {
                if !found.contains(&child) && child != root {
                    found.push(child);
                    frontier.push(child);
                }
            }
        }
        // deepest processes first
        found.reverse();
        found.push(root);
        Ok(found)
    }

    async fn signal(&self, pids: &[u32], signal: KillSignal) -> YtdlResult<()> {
        if pids.is_empty() {
            return Ok(());
        }
        send_kill(signal, pids.iter().map(u32::to_string)).await
    }

    async fn signal_group(&self, group: u32, signal: KillSignal) -> YtdlResult<()> {
        // a negative pid addresses the whole group
        send_kill(signal, ["--".to_string(), format!("-{}", group)]).await
    }
}

async fn send_kill<I>(signal: KillSignal, targets: I) -> YtdlResult<()>
where
    I: IntoIterator<Item = String>,
{
    let flag = match signal {
        KillSignal::Terminate => "-TERM",
        KillSignal::Kill => "-KILL",
    };
    let mut cmd = Command::new("kill");
    cmd.arg(flag).args(targets);
    let output = run_with_timeout(&mut cmd, config::process::helper_timeout()).await?;
    if !output.status.success() {
        log::debug!(
            "kill {} reported: {}",
            flag,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// `taskkill /T` based strategy for Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskKill;

#[async_trait]
impl TreeKill for TaskKill {
    async fn enumerate(&self, root: u32) -> YtdlResult<Vec<u32>> {
        Ok(vec![root])
    }

    async fn signal(&self, pids: &[u32], signal: KillSignal) -> YtdlResult<()> {
        for pid in pids {
            let mut cmd = Command::new("taskkill");
            cmd.arg("/T");
            if signal == KillSignal::Kill {
                cmd.arg("/F");
            }
            cmd.arg("/PID").arg(pid.to_string());
            let output = run_with_timeout(&mut cmd, config::process::helper_timeout()).await?;
            if !output.status.success() {
                log::debug!(
                    "taskkill for {} reported: {}",
                    pid,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        }
        Ok(())
    }
}

/// Strategy for platforms without a tree-kill mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl TreeKill for Unsupported {
    async fn enumerate(&self, _root: u32) -> YtdlResult<Vec<u32>> {
        Err(YtdlError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    async fn signal(&self, _pids: &[u32], _signal: KillSignal) -> YtdlResult<()> {
        Err(YtdlError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    async fn signal_group(&self, _group: u32, _signal: KillSignal) -> YtdlResult<()> {
        Err(YtdlError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

fn parse_pid_list(text: &str) -> Vec<u32> {
    text.lines().filter_map(|l| l.trim().parse().ok()).collect()
}
