//! Report output sink
//!
//! Reports are written to stdout, or piped through a pager process.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use crate::error::{CliError, Result};

/// Used when `$PAGER` is unset or empty.
pub const DEFAULT_PAGER: &str = "/usr/bin/less";

/// Where a report is written.
pub enum Sink {
    Stdout(io::Stdout),
    Pager(Child),
}

impl Sink {
    /// Open stdout, or spawn the pager when `paginate` is set.
    pub fn open(paginate: bool) -> Result<Self> {
        if !paginate {
            return Ok(Self::Stdout(io::stdout()));
        }

        let pager = pager_command(std::env::var("PAGER").ok().as_deref());
        let (program, args) = pager
            .split_first()
            .ok_or_else(|| CliError::user("empty pager command"))?;
        tracing::debug!(pager = %program, "Spawning pager");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| CliError::user(format!("unable to start pager {program}: {e}")))?;
        Ok(Self::Pager(child))
    }

    /// Flush and, for a pager, close its input and wait for it to exit.
    pub fn finish(self) -> Result<()> {
        match self {
            Self::Stdout(mut out) => out.flush()?,
            Self::Pager(mut child) => {
                drop(child.stdin.take());
                let status = child.wait()?;
                if !status.success() {
                    tracing::warn!(%status, "Pager exited with failure");
                }
            }
        }
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::Pager(child) => pager_stdin(child)?.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::Pager(child) => pager_stdin(child)?.flush(),
        }
    }
}

fn pager_stdin(child: &mut Child) -> io::Result<&mut std::process::ChildStdin> {
    child
        .stdin
        .as_mut()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "pager input is closed"))
}

/// Split a `$PAGER` value into program and arguments.
fn pager_command(env: Option<&str>) -> Vec<String> {
    let words: Vec<String> = env
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        vec![DEFAULT_PAGER.to_string()]
    } else {
        words
    }
}
