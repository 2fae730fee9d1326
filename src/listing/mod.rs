// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Captures dependency-listing output for an install tree and parses it into records.

mod parser;
mod shell;

pub use parser::{parse_listing, ParseError, Records};
pub use shell::{ListingError, ListingResult};

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::sink::LogSink;

/// Default timeout for the dependency-listing command (one hour).
pub const DEFAULT_LISTING_TIMEOUT: Duration = Duration::from_secs(3600);

/// One dependency of one file, as reported by the listing tool.
///
/// `resolved` is the full text after the `=>` arrow, so it carries the
/// load address when the tool prints one, and the literal `not found`
/// marker when resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub owning_file: String,
    pub name: String,
    pub resolved: String,
}

/// Run the dependency-listing tool over every regular file under
/// `install_dir` and return its captured output.
///
/// The listing command is logged through the sink before it runs. Its
/// output goes to a scratch file that is deleted when this function
/// returns, on success and on error alike. The tool's own exit status is
/// ignored: it exits non-zero whenever any library is missing.
///
/// # Errors
/// Returns an error if the install tree cannot be walked or contains no
/// regular files, if the scratch file cannot be created or read back, or
/// if the command cannot be run or exceeds `timeout`.
pub fn capture_listing(
    install_dir: &Path,
    timeout: Duration,
    sink: &mut dyn LogSink,
) -> ListingResult<String> {
    let files = count_regular_files(install_dir)?;
    if files == 0 {
        return Err(ListingError::NoFilesFound {
            dir: install_dir.to_path_buf(),
        });
    }
    eprintln!(
        "Capturing dependency listing: install_dir={}, files={}",
        install_dir.display(),
        files
    );

    let scratch = NamedTempFile::new().map_err(|e| ListingError::ScratchFileFailed { source: e })?;
    let command = format!(
        "find '{}'/ -type f | xargs ldd > '{}' 2>/dev/null",
        install_dir.display(),
        scratch.path().display()
    );
    sink.log(&format!("Executing `{command}`"));

    let _status = shell::run_with_timeout(&command, timeout)?;

    fs::read_to_string(scratch.path()).map_err(|e| ListingError::ReadOutputFailed {
        path: scratch.path().to_path_buf(),
        source: e,
    })
    // scratch dropped here: the listing output file is removed unconditionally
}

fn count_regular_files(dir: &Path) -> ListingResult<usize> {
    let mut files = 0;
    for entry in WalkDir::new(dir) {
        let e = entry.map_err(|e| ListingError::WalkDirFailed {
            dir: dir.to_path_buf(),
            source: e,
        })?;
        if e.file_type().is_file() {
            files += 1;
        }
    }
    Ok(files)
}
