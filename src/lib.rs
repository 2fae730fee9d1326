// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for auditing installed package trees for unsafe shared-library dependencies.
//!
//! This crate provides functionality to:
//! - Capture dependency-listing (`ldd`) output for every file in an install tree
//! - Parse the per-file dependency graph from the captured text
//! - Classify each dependency against an allow-list of platform libraries
//! - Aggregate failures and render a deterministic health-check report

pub mod listing;
pub mod report;
pub mod sink;

// Re-export key types for convenience
pub use listing::{capture_listing, parse_listing, DependencyRecord, ListingError, ParseError};
pub use report::{
    summarize_report, validate_report, Allowlist, HealthCheckFailed, Platform, Report,
};
pub use sink::{ConsoleSink, LogSink, MemorySink};
