// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Report struct and public API for classifying and aggregating dependency records.

mod allowlist;
mod classifier;
mod console;
mod failures;
mod totals;
mod validate;

pub use allowlist::{Allowlist, Platform};
pub use console::summarize_report;
pub use failures::FailureEntry;
pub use validate::{validate_report, HealthCheckFailed};

use serde::Serialize;

use crate::listing::DependencyRecord;
use crate::sink::LogSink;
use classifier::{classify, Classification};
use failures::FailureTable;
use totals::ReportTotals;

/// Path segment marking the package's bundled library directory. Owning
/// files whose path contains it are reported as libraries, the rest as
/// binaries.
pub(crate) const EMBEDDED_LIB_SEGMENT: &str = "embedded/lib";

/// Outcome of one audit pass: every unsafe dependency, aggregated and
/// partitioned for rendering.
#[derive(Debug, Serialize)]
pub struct Report {
    install_dir: String,
    totals: ReportTotals,
    libraries: Vec<String>,
    binaries: Vec<String>,
    unresolved: Vec<String>,
    unreliable: Vec<String>,
    failures: Vec<FailureEntry>,
}

impl Report {
    /// Classify every record against the allow-list and aggregate the
    /// unsafe ones.
    ///
    /// With a trace sink, every record's verdict is logged as it is
    /// reached.
    #[must_use]
    pub fn new(
        records: &[DependencyRecord],
        allowlist: &Allowlist,
        install_dir: &str,
        mut trace: Option<&mut dyn LogSink>,
    ) -> Self {
        let mut table = FailureTable::default();
        let mut safe = 0usize;
        for record in records {
            match classify(record, allowlist, install_dir) {
                Classification::Safe => {
                    safe += 1;
                    if let Some(sink) = trace.as_deref_mut() {
                        sink.log(&format!(
                            "    -> PASSED: {} is either allow-listed or safely provided.",
                            record.name
                        ));
                    }
                }
                Classification::Unsafe => {
                    if let Some(sink) = trace.as_deref_mut() {
                        sink.log(&format!(
                            "    -> FAILED: {} has unsafe dependencies",
                            record.owning_file
                        ));
                    }
                    table.record(record);
                }
            }
        }

        let failures = table.into_entries();

        let mut unresolved = Vec::new();
        let mut unreliable = Vec::new();
        let mut libraries = Vec::new();
        let mut binaries = Vec::new();
        for entry in &failures {
            if entry.is_unresolved() {
                push_unique(&mut unresolved, &entry.dependency);
            } else {
                push_unique(&mut unreliable, &entry.resolved);
            }
            if entry.owning_file.contains(EMBEDDED_LIB_SEGMENT) {
                push_unique(&mut libraries, &entry.owning_file);
            } else {
                push_unique(&mut binaries, &entry.owning_file);
            }
        }

        let totals = ReportTotals::calculate(records.len(), safe, &failures, &unresolved, &unreliable);

        Self {
            install_dir: install_dir.to_string(),
            totals,
            libraries,
            binaries,
            unresolved,
            unreliable,
            failures,
        }
    }

    /// True when the audit found nothing to flag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn install_dir(&self) -> &str {
        &self.install_dir
    }

    #[must_use]
    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    /// Render the failure report through the sink.
    ///
    /// The order is fixed: banner, flagged libraries, flagged binaries,
    /// unresolved names, unreliable paths, then one detail block per
    /// failure entry.
    pub fn render(&self, sink: &mut dyn LogSink) {
        sink.log("*** Health Check Failed, Summary follows:");
        sink.log("*** The following bundled libraries have unsafe or unmet dependencies:");
        for library in &self.libraries {
            sink.log(&format!("    --> {library}"));
        }
        sink.log("*** The following bundled binaries have unsafe or unmet dependencies:");
        for binary in &self.binaries {
            sink.log(&format!("    --> {binary}"));
        }
        if !self.unresolved.is_empty() {
            sink.log("*** The following requirements could not be resolved:");
            for name in &self.unresolved {
                sink.log(&format!("    --> {name}"));
            }
        }
        if !self.unreliable.is_empty() {
            sink.log("*** The following libraries cannot be guaranteed to be on target systems:");
            for path in &self.unreliable {
                sink.log(&format!("    --> {path}"));
            }
        }
        sink.log("*** The precise failures were:");
        for entry in &self.failures {
            sink.log(&format!("    --> {}", entry.owning_file));
            sink.log(&format!("    DEPENDS ON: {}", entry.dependency));
            sink.log(&format!("      COUNT: {}", entry.count));
            sink.log(&format!("      PROVIDED BY: {}", entry.resolved));
            sink.log(&format!("      FAILED BECAUSE: {}", entry.reason()));
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
