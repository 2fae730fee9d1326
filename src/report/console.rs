// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints report summaries to the console.

use comfy_table::{Cell, Table};

use super::Report;

/// Summarize the report to the console.
///
/// Prints the install directory, classification statistics, and a table of
/// flagged files with their dependencies.
pub fn summarize_report(report: &Report) {
    println!("Install directory: {}", report.install_dir);
    println!("Dependency records: {}\n", report.totals.records);

    println!("{}\n", classification_table(report));

    if !report.is_empty() {
        println!("{}\n", failure_kind_table(report));
        println!("{}", flagged_files_table(report));
        println!(
            "\nTotal: {} file(s) with flagged dependencies",
            report.libraries.len() + report.binaries.len()
        );
    }
}

/// Create a table with the default preset styling.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

/// Create a table showing classification statistics.
fn classification_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table
        .set_header(vec![
            Cell::new("Classification").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Count").add_attribute(comfy_table::Attribute::Bold),
        ])
        .add_row(vec![Cell::new("Safe"), Cell::new(report.totals.safe)])
        .add_row(vec![Cell::new("Flagged"), Cell::new(report.totals.flagged)])
        .add_row(vec![
            Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(report.totals.records).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

/// Create a table showing failure kind statistics.
fn failure_kind_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table
        .set_header(vec![
            Cell::new("Failure Kind").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Count").add_attribute(comfy_table::Attribute::Bold),
        ])
        .add_row(vec![
            Cell::new("Unresolved names"),
            Cell::new(report.totals.unresolved),
        ])
        .add_row(vec![
            Cell::new("Unreliable paths"),
            Cell::new(report.totals.unreliable),
        ])
        .add_row(vec![
            Cell::new("Distinct failures").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(report.totals.distinct_failures).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

/// Create a table showing flagged dependencies for each owning file.
fn flagged_files_table(report: &Report) -> Table {
    let mut table = default_table_preset();
    table.set_header(vec![
        Cell::new("File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Flagged Dependencies").add_attribute(comfy_table::Attribute::Bold),
    ]);

    for owning_file in report.libraries.iter().chain(&report.binaries) {
        let dependencies: Vec<&str> = report
            .failures
            .iter()
            .filter(|entry| &entry.owning_file == owning_file)
            .map(|entry| entry.dependency.as_str())
            .collect();
        // Every flagged file lives under the install directory; strip the
        // prefix for a more readable table.
        let display_path = owning_file
            .strip_prefix(report.install_dir.as_str())
            .map_or(owning_file.as_str(), |rest| rest.trim_start_matches('/'));
        table.add_row(vec![
            Cell::new(display_path),
            Cell::new(dependencies.join(", ")),
        ]);
    }
    table
}
