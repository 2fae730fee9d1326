// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Turns a non-empty report into the build-failure signal.

use thiserror::Error;

use super::Report;
use crate::sink::LogSink;

/// The expected failure mode: unsafe or unresolved dependencies were
/// found. The full report has been rendered through the sink by the time
/// this is returned.
#[derive(Debug, Error)]
#[error(
    "Health check failed: {unresolved} unresolved and {unreliable} unreliable dependencies across {files} files"
)]
pub struct HealthCheckFailed {
    pub unresolved: usize,
    pub unreliable: usize,
    pub files: usize,
}

/// Validate the report.
///
/// An empty report is a pass and produces no output. A non-empty report is
/// rendered through the sink and returned as `HealthCheckFailed`.
///
/// # Errors
/// Returns `HealthCheckFailed` if the report contains any failure entries.
pub fn validate_report(report: &Report, sink: &mut dyn LogSink) -> Result<(), HealthCheckFailed> {
    if report.is_empty() {
        return Ok(());
    }
    report.render(sink);
    Err(HealthCheckFailed {
        unresolved: report.unresolved.len(),
        unreliable: report.unreliable.len(),
        files: report.libraries.len() + report.binaries.len(),
    })
}
