// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Runs the dependency-listing command through a shell with a bounded timeout.

use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

/// Result type for listing operations.
pub type ListingResult<T> = std::result::Result<T, ListingError>;

/// Errors that can occur while capturing the dependency listing.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Shell not found for listing command: {command}")]
    CommandNotFound { command: String },
    #[error("Listing command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Listing command timed out after {timeout:?}: {command}")]
    CommandTimeout { command: String, timeout: Duration },
    #[error("Failed to walk install directory: {dir:?}")]
    WalkDirFailed {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("No regular files found under install directory: {dir:?}")]
    NoFilesFound { dir: PathBuf },
    #[error("Failed to create scratch file for listing output")]
    ScratchFileFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read listing output: {path:?}")]
    ReadOutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run a shell command, waiting at most `timeout` for it to finish.
///
/// The exit status is returned as-is: the listing tool legitimately exits
/// non-zero whenever a library cannot be found, so only execution and
/// timeout failures are errors.
///
/// # Errors
/// Returns an error if the shell cannot be spawned, the wait itself fails,
/// the child is terminated by a signal, or the timeout elapses (in which
/// case the child is killed).
pub(crate) fn run_with_timeout(command: &str, timeout: Duration) -> ListingResult<ExitStatus> {
    let mut child = match std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(ListingError::CommandNotFound {
                    command: command.to_string(),
                });
            }
            return Err(ListingError::CommandFailed {
                command: command.to_string(),
                source: e,
            });
        }
    };

    wait_with_timeout(&mut child, timeout, command)
}

/// Wait for a child process to complete with a timeout.
///
/// If the timeout is reached, the process is killed and `CommandTimeout`
/// is returned.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
) -> ListingResult<ExitStatus> {
    if let Some(status) = child
        .wait_timeout(timeout)
        .map_err(|e| ListingError::CommandFailed {
            command: command.to_string(),
            source: e,
        })?
    {
        // Check if the process completed or was terminated by a signal.
        if status.code().is_some() {
            Ok(status)
        } else if let Some(signal) = status.signal() {
            Err(ListingError::CommandFailed {
                command: command.to_string(),
                source: std::io::Error::other(format!("Process terminated by signal: {signal}")),
            })
        } else {
            Err(ListingError::CommandFailed {
                command: command.to_string(),
                source: std::io::Error::other("Unknown process termination"),
            })
        }
    } else {
        // Timeout has been reached - kill the process
        let _ = child.kill();
        let _ = child.wait();
        Err(ListingError::CommandTimeout {
            command: command.to_string(),
            timeout,
        })
    }
}
