// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use path_clean::PathClean;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use args::Args;
use health_check::listing::{capture_listing, parse_listing};
use health_check::report::{summarize_report, validate_report, Allowlist, Platform, Report};
use health_check::sink::{ConsoleSink, LogSink};

fn main() -> Result<()> {
    let args = Args::parse();
    let install_dir = args.install_dir.clean();
    let install_dir_str = install_dir.to_string_lossy().to_string();
    let mut sink = ConsoleSink::default();

    let allowlist = create_allowlist(args.platform, args.allowlist.as_ref())?;
    let output = capture_output(&install_dir, args.timeout, &mut sink)?;
    let records = parse_listing(&output, &mut sink, args.verbose)
        .with_context(|| format!("Failed to parse dependency listing for {install_dir_str}"))?;

    let trace: Option<&mut dyn LogSink> = if args.verbose { Some(&mut sink) } else { None };
    let report = Report::new(&records, &allowlist, &install_dir_str, trace);

    if let Some(dest) = &args.report {
        write_report_to_file(&report, dest)?;
    }
    summarize_report(&report);
    validate_report(&report, &mut sink)?;
    Ok(())
}

fn create_allowlist(platform: Platform, path: Option<&PathBuf>) -> Result<Allowlist> {
    if let Some(allowlist) = path {
        Allowlist::with_patterns_file(platform, allowlist)
            .with_context(|| "Failed to build allow-list from patterns file")
    } else {
        Ok(Allowlist::for_platform(platform))
    }
}

/// Capture the dependency listing for the install tree.
///
/// # Errors
/// Returns an error if the tree is empty or the listing command cannot be
/// run within the timeout.
fn capture_output(install_dir: &Path, timeout: u64, sink: &mut dyn LogSink) -> Result<String> {
    let output = capture_listing(install_dir, Duration::from_secs(timeout), sink)
        .with_context(|| format!("Failed to capture listing: {}", install_dir.display()))?;

    eprintln!(
        "Capture completed: install_dir={}, bytes={}",
        install_dir.display(),
        output.len()
    );
    Ok(output)
}

/// Write the report to a file.
///
/// # Errors
/// Returns an error if the report cannot be serialized to JSON or if the file cannot be created.
fn write_report_to_file(report: &Report, dest: &Path) -> Result<()> {
    eprintln!("Writing report to file: file={}", dest.display());
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to serialize report to JSON: {}", dest.display()))?;
    Ok(())
}
