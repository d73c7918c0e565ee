use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::core::config::{self, OutputPathMarker, Settings};
use crate::core::error::{YtdlError, YtdlResult};
use crate::download::progress::DownloadProgress;
use crate::download::result::RunContext;
use crate::options::OptionSet;
use crate::process::kill::{kill_tree, platform_tree_kill, TreeKill};
use crate::process::parser::{match_output_path, OutputParser};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Everything collected from one finished invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub exit_code: Option<i32>,
    pub success: bool,
    /// stdout lines in order
    pub output: Vec<String>,
    /// stderr lines in order
    pub errors: Vec<String>,
    /// Output paths announced by the path marker
    pub paths: Vec<String>,
}

/// Starts yt-dlp, streams and classifies its output and tears it down on
/// cancellation.
#[derive(Clone)]
pub struct ProcessInvoker {
    program: String,
    python: Option<String>,
    #[cfg_attr(not(windows), allow(dead_code))]
    windows_workaround: bool,
    path_marker: OutputPathMarker,
    tree_kill: Arc<dyn TreeKill>,
    kill_grace: Duration,
}

impl std::fmt::Debug for ProcessInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessInvoker")
            .field("program", &self.program)
            .field("python", &self.python)
            .field("windows_workaround", &self.windows_workaround)
            .field("path_marker", &self.path_marker)
            .finish_non_exhaustive()
    }
}

impl ProcessInvoker {
    pub fn new(settings: &Settings) -> Self {
        Self {
            program: settings.ytdlp_path.clone(),
            python: settings.python_path.clone(),
            windows_workaround: settings.windows_encoding_workaround,
            path_marker: settings.path_marker,
            tree_kill: platform_tree_kill(),
            kill_grace: config::process::kill_grace(),
        }
    }

    /// Replaces the process-tree termination strategy.
    pub fn with_tree_kill(mut self, strategy: Arc<dyn TreeKill>) -> Self {
        self.tree_kill = strategy;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument tokens: positional arguments in order, then every set option.
    pub fn build_args(args: &[String], options: &OptionSet) -> Vec<String> {
        args.iter().cloned().chain(options.to_args()).collect()
    }

    /// Display form of the argument vector: quoted positional arguments
    /// followed by the serialized options.
    pub fn command_line(args: &[String], options: &OptionSet) -> String {
        let mut parts: Vec<String> = args.iter().map(|a| format!("\"{}\"", a)).collect();
        let flags = options.to_string();
        if !flags.is_empty() {
            parts.push(flags);
        }
        parts.join(" ")
    }

    fn command(&self, args: &[String], options: &OptionSet) -> Command {
        #[cfg(windows)]
        if self.windows_workaround {
            let target = match &self.python {
                Some(python) => format!("\"{}\" \"{}\"", python, self.program),
                None => format!("\"{}\"", self.program),
            };
            let mut cmd = Command::new("cmd.exe");
            cmd.raw_arg(format!(
                "/C chcp 65001 >nul 2>&1 && {} {}",
                target,
                Self::command_line(args, options)
            ));
            cmd.creation_flags(CREATE_NO_WINDOW);
            return cmd;
        }

        let mut cmd = match &self.python {
            Some(python) => {
                let mut cmd = Command::new(python);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(Self::build_args(args, options));
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);
        // own process group, so helpers outliving the root can still be found
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    /// Runs one invocation to completion.
    ///
    /// Emits `PreProcessing` (index 1) as soon as the process is started.
    /// Returns `Err(ProcessStart)` if it cannot be spawned and
    /// `Err(Cancelled)` once the process tree has been torn down after
    /// `ctx.cancel` fired. A non-zero exit code is not an error.
    pub async fn run(&self, args: &[String], options: &OptionSet, ctx: &RunContext) -> YtdlResult<Invocation> {
        if ctx.cancel.is_cancelled() {
            return Err(YtdlError::Cancelled);
        }

        let mut cmd = self.command(args, options);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("Running {} {}", self.program, Self::command_line(args, options));
        let mut child = cmd.spawn().map_err(|source| {
            log::error!("Failed to spawn {}: {}", self.program, source);
            YtdlError::ProcessStart {
                program: self.program.clone(),
                source,
            }
        })?;
        log::info!("Started {} (pid {:?})", self.program, child.id());
        let group = if cfg!(unix) { child.id() } else { None };
        ctx.report(DownloadProgress::pre_processing(1));

        let mut stdout = spawn_stdout_reader(&mut child, ctx.clone(), self.path_marker);
        let mut stderr = spawn_stderr_reader(&mut child, ctx.clone());

        let status = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };

        let Some(status) = status else {
            return Err(self.cancel(&mut child, group, stdout, stderr).await);
        };
        let status = status?;

        // trailing output must be drained before the result is final;
        // helpers left behind by the root may still hold the pipes open
        let drained = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            drained = async { (join_reader(&mut stdout).await, join_reader(&mut stderr).await) } => Some(drained),
        };
        let Some(((output, paths), (errors, _))) = drained else {
            log::info!("Cancelled while draining output of {}", self.program);
            return Err(self.cancel(&mut child, group, stdout, stderr).await);
        };

        log::info!("{} exited with {}", self.program, status);
        Ok(Invocation {
            exit_code: status.code(),
            success: status.success(),
            output,
            errors,
            paths,
        })
    }

    async fn cancel(
        &self,
        child: &mut Child,
        group: Option<u32>,
        stdout: ReaderHandle,
        stderr: ReaderHandle,
    ) -> YtdlError {
        log::info!("Cancelling {}", self.program);
        if let Err(e) = kill_tree(child, group, self.tree_kill.as_ref(), self.kill_grace).await {
            log::warn!("Process tree termination incomplete: {}", e);
            if matches!(e, YtdlError::UnsupportedPlatform(_)) {
                stdout.abort();
                stderr.abort();
                return e;
            }
        }
        stdout.abort();
        stderr.abort();
        YtdlError::Cancelled
    }
}

type ReaderHandle = JoinHandle<(Vec<String>, Vec<String>)>;

async fn join_reader(handle: &mut ReaderHandle) -> (Vec<String>, Vec<String>) {
    match handle.await {
        Ok(collected) => collected,
        Err(e) => {
            log::warn!("Output reader task failed: {}", e);
            Default::default()
        }
    }
}

/// Reads stdout line by line: forwards raw lines, classifies them and
/// watches for the output path marker. Yields (lines, paths).
fn spawn_stdout_reader(child: &mut Child, ctx: RunContext, marker: OutputPathMarker) -> ReaderHandle {
    let stdout = child.stdout.take();
    tokio::spawn(async move {
        let mut lines = Vec::new();
        let mut paths = Vec::new();
        let Some(stdout) = stdout else {
            return (lines, paths);
        };
        let mut parser = OutputParser::new();
        read_lines(stdout, |line| {
            log::trace!("[yt-dlp] {}", line);
            ctx.forward(line.clone());
            if let Some(progress) = parser.parse_line(&line) {
                ctx.report(progress);
            }
            if let Some(path) = match_output_path(marker, &line) {
                ctx.report(DownloadProgress::success(path.clone()));
                paths.push(path);
            }
            lines.push(line);
        })
        .await;
        (lines, paths)
    })
}

/// Reads stderr: every line becomes an `Error` event. Yields (lines, []).
fn spawn_stderr_reader(child: &mut Child, ctx: RunContext) -> ReaderHandle {
    let stderr = child.stderr.take();
    tokio::spawn(async move {
        let mut lines = Vec::new();
        let Some(stderr) = stderr else {
            return (lines, Vec::new());
        };
        read_lines(stderr, |line| {
            log::debug!("[yt-dlp ERROR] {}", line);
            ctx.report(DownloadProgress::error(line.clone()));
            lines.push(line);
        })
        .await;
        (lines, Vec::new())
    })
}

/// Calls `on_line` for every line until end of stream, decoding lossily as UTF-8.
async fn read_lines<R, F>(stream: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                on_line(line.trim_end_matches(['\r', '\n']).to_string());
            }
            Err(e) => {
                log::debug!("Stopped reading process output: {}", e);
                break;
            }
        }
    }
}
