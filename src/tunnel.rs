//! Public-URL tunnel supervision
//!
//! Spawns a tunnel subprocess (cloudflared by default), scrapes its
//! output for the public URL it assigns, and keeps the process alive
//! until shutdown. The URL is reported exactly once; everything after
//! that is drained so the child never blocks on a full pipe.

use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;

use crate::config::TunnelConfig;
use crate::logger;

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tunnel process exited before reporting a URL ({0})")]
    Exited(ExitStatus),
    #[error("tunnel process closed its output before reporting a URL")]
    OutputClosed,
    #[error("no public URL in the first {lines_seen} output lines")]
    NoUrl { lines_seen: u32 },
    #[error("failed to read tunnel output: {0}")]
    Read(#[from] std::io::Error),
}

/// Handle for the running tunnel subprocess.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) kills
/// the child process.
#[derive(Debug)]
pub struct TunnelHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl TunnelHandle {
    /// Stop the tunnel subprocess.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn the tunnel subprocess and wait for the public URL it prints.
///
/// The child is started as `<command> tunnel --url http://127.0.0.1:<port>`
/// plus any configured extra arguments, matching the cloudflared CLI.
/// Its stderr is scanned line by line for an `https://` URL containing
/// the configured pattern; scanning gives up after `attempts` lines.
pub async fn start_tunnel(
    config: &TunnelConfig,
    local_port: u16,
) -> Result<(String, TunnelHandle), TunnelError> {
    let mut child = Command::new(&config.command)
        .arg("tunnel")
        .arg("--url")
        .arg(format!("http://127.0.0.1:{local_port}"))
        .args(&config.extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TunnelError::Spawn {
            command: config.command.clone(),
            source,
        })?;

    logger::log_tunnel_started(&config.command);

    let stderr = child.stderr.take().ok_or(TunnelError::OutputClosed)?;
    let mut lines = BufReader::new(stderr).lines();

    let mut lines_seen = 0u32;
    let url = loop {
        if lines_seen >= config.attempts {
            return Err(TunnelError::NoUrl { lines_seen });
        }
        match lines.next_line().await? {
            Some(line) => {
                lines_seen += 1;
                if let Some(url) = extract_public_url(&line, &config.url_pattern) {
                    break url;
                }
            }
            None => {
                return Err(match child.try_wait() {
                    Ok(Some(status)) => TunnelError::Exited(status),
                    _ => TunnelError::OutputClosed,
                });
            }
        }
    };

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        let _ = child.kill().await;
                        break;
                    }
                }
                line = lines.next_line() => {
                    // Later output is discarded; the pipe must keep
                    // draining or the child stalls on write.
                    if !matches!(line, Ok(Some(_))) {
                        if let Ok(status) = child.wait().await {
                            logger::log_tunnel_warning(&format!("process exited: {status}"));
                        }
                        break;
                    }
                }
            }
        }
    });

    Ok((url, TunnelHandle { shutdown_tx }))
}

/// Pull an `https://` URL matching `pattern` out of one output line.
fn extract_public_url(line: &str, pattern: &str) -> Option<String> {
    let start = line.find("https://")?;
    let tail = &line[start..];
    let end = tail
        .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '|')
        .unwrap_or(tail.len());
    let url = tail[..end].trim_end_matches(['.', ',']);
    (url.len() > "https://".len() && url.contains(pattern)).then(|| url.to_string())
}
