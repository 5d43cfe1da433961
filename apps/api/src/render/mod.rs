//! External document rendering.
//!
//! The renderer is an opaque command that takes a YAML path and writes PDFs
//! into a sibling `rendercv_output` directory. Invocation forms are tried in
//! priority order; the first that exits cleanly wins.

pub mod discovery;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;

const YAML_PLACEHOLDER: &str = "{yaml}";

/// One way of invoking the renderer. `{yaml}` in `args` is replaced with the
/// document path.
#[derive(Debug, Clone)]
pub struct RenderStrategy {
    pub name: &'static str,
    pub program: String,
    pub args: Vec<String>,
}

impl RenderStrategy {
    fn args_for(&self, yaml_path: &Path) -> Vec<String> {
        let yaml = yaml_path.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(YAML_PLACEHOLDER, &yaml))
            .collect()
    }
}

/// The installed CLI first, then the Python module entry point for
/// environments where only the package is importable.
pub fn default_strategies(config: &RenderConfig) -> Vec<RenderStrategy> {
    vec![
        RenderStrategy {
            name: "rendercv-cli",
            program: config.rendercv_bin.clone(),
            args: vec!["render".to_string(), YAML_PLACEHOLDER.to_string()],
        },
        RenderStrategy {
            name: "python-module",
            program: config.python_bin.clone(),
            args: vec![
                "-m".to_string(),
                "rendercv.cli.entry_point".to_string(),
                "render".to_string(),
                YAML_PLACEHOLDER.to_string(),
            ],
        },
    ]
}

/// Diagnostics for a single invocation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptLog {
    pub strategy: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl AttemptLog {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.exit_code == Some(0)
    }
}

/// Outcome of a successful render, including any failed attempts before it.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub strategy: String,
    pub attempts: Vec<AttemptLog>,
}

#[derive(Debug, Error)]
#[error("all {} renderer invocation forms failed", attempts.len())]
pub struct RenderError {
    pub attempts: Vec<AttemptLog>,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders `yaml_path` with `workdir` as the working directory.
    async fn render(&self, yaml_path: &Path, workdir: &Path) -> Result<RenderReport, RenderError>;
}

/// Runs the renderer as a child process.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    strategies: Vec<RenderStrategy>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl CommandRenderer {
    pub fn new(strategies: Vec<RenderStrategy>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            strategies,
            timeout,
            max_output_bytes,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            default_strategies(config),
            config.timeout,
            config.max_output_bytes,
        )
    }

    async fn run_attempt(
        &self,
        strategy: &RenderStrategy,
        yaml_path: &Path,
        workdir: &Path,
    ) -> AttemptLog {
        let args = strategy.args_for(yaml_path);
        let mut log = AttemptLog {
            strategy: strategy.name.to_string(),
            command: format!("{} {}", strategy.program, args.join(" ")),
            ..AttemptLog::default()
        };

        let spawned = Command::new(&strategy.program)
            .args(&args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                log.error = Some(format!("failed to spawn: {e}"));
                return log;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.max_output_bytes;

        let finished = tokio::time::timeout(self.timeout, async {
            let (out, err) =
                tokio::try_join!(read_bounded(stdout, limit), read_bounded(stderr, limit))?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((out, err, status))
        })
        .await;

        match finished {
            Err(_) => {
                log.error = Some(format!("timed out after {}s", self.timeout.as_secs()));
            }
            Ok(Err(e)) => {
                log.error = Some(format!("I/O error while waiting: {e}"));
            }
            Ok(Ok((out, err, status))) => {
                log.exit_code = status.code();
                if out.exceeded || err.exceeded {
                    log.error = Some(format!("output exceeded {limit} bytes"));
                } else if !status.success() {
                    log.error = Some(format!("exited with {status}"));
                }
                log.stdout = out.text;
                log.stderr = err.text;
            }
        }

        log
    }
}

#[async_trait]
impl DocumentRenderer for CommandRenderer {
    async fn render(&self, yaml_path: &Path, workdir: &Path) -> Result<RenderReport, RenderError> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            info!("Rendering {} via {}", yaml_path.display(), strategy.name);
            let log = self.run_attempt(strategy, yaml_path, workdir).await;
            debug!("{} stdout: {}", strategy.name, log.stdout);

            if log.succeeded() {
                attempts.push(log);
                return Ok(RenderReport {
                    strategy: strategy.name.to_string(),
                    attempts,
                });
            }

            warn!(
                "Renderer form {} failed: {}",
                strategy.name,
                log.error.as_deref().unwrap_or("unknown error")
            );
            attempts.push(log);
        }

        Err(RenderError { attempts })
    }
}

#[derive(Debug, Default)]
struct Captured {
    text: String,
    exceeded: bool,
}

/// Drains a pipe to EOF, keeping at most `limit` bytes. Draining past the
/// limit stops the child from blocking on a full pipe.
async fn read_bounded<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    limit: usize,
) -> std::io::Result<Captured> {
    let Some(mut pipe) = pipe else {
        return Ok(Captured::default());
    };

    let mut kept = Vec::new();
    let mut exceeded = false;
    let mut chunk = [0u8; 8192];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
        exceeded |= n > room;
    }

    Ok(Captured {
        text: String::from_utf8_lossy(&kept).into_owned(),
        exceeded,
    })
}
