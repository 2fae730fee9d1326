// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Parses dependency-listing output line by line into `DependencyRecord`s.
//!
//! The listing tool prints one header line per analysed file followed by
//! one indented line per dependency. The parser walks the text once,
//! carrying the current owning file, and reports lines it cannot classify
//! through the sink without aborting.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use super::DependencyRecord;
use crate::sink::LogSink;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):$").expect("header pattern must compile"));
static DEPENDENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(.+) =>\s+(.+)$").expect("dependency pattern must compile"));
static DIRECT_MAPPED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(.+) \(.+\)$").expect("direct-map pattern must compile"));

// Runtime-internal libraries of a bundled JVM; their entries carry no
// information about the install tree itself.
const JVM_INTERNAL_PREFIXES: [&str; 3] = ["libjvm.so", "libjava.so", "libmawt.so"];

/// Errors that abort the parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Dependency line encountered before any file header: {line}")]
    UnattributedDependency { line: String },
}

/// What a single line of listing output turned out to be.
enum LineKind<'l> {
    Header(&'l str),
    Dependency { name: &'l str, resolved: &'l str },
    Ignored,
    Blank,
    Unrecognized,
}

fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = HEADER_RE.captures(line) {
        return LineKind::Header(caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = DEPENDENCY_RE.captures(line) {
        return LineKind::Dependency {
            name: caps.get(1).map_or("", |m| m.as_str()),
            resolved: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    // The remaining shapes all require the dependency-line indent.
    let indented = line.starts_with(|c: char| c.is_whitespace());
    if indented && DIRECT_MAPPED_RE.is_match(line) {
        // Direct-mapped object with no arrow, e.g. `linux-gate.so.1 (0x...)`.
        return LineKind::Ignored;
    }
    if indented && line.trim_start() == "statically linked" {
        return LineKind::Ignored;
    }
    if indented
        && JVM_INTERNAL_PREFIXES
            .iter()
            .any(|prefix| line.trim_start().starts_with(prefix))
    {
        return LineKind::Ignored;
    }
    if indented && line.trim_start() == "not a dynamic executable" {
        // Non-executable files are listed too; nothing to check for them.
        return LineKind::Ignored;
    }
    LineKind::Unrecognized
}

/// Lazy, single-pass stream of dependency records over listing output.
///
/// Unrecognized lines are logged through the sink and skipped. With
/// `verbose`, every header and dependency line is traced as well.
pub struct Records<'t, 's> {
    lines: std::str::Lines<'t>,
    owning_file: Option<String>,
    sink: &'s mut dyn LogSink,
    verbose: bool,
}

impl<'t, 's> Records<'t, 's> {
    pub fn new(output: &'t str, sink: &'s mut dyn LogSink, verbose: bool) -> Self {
        Self {
            lines: output.lines(),
            owning_file: None,
            sink,
            verbose,
        }
    }
}

impl Iterator for Records<'_, '_> {
    type Item = Result<DependencyRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            match classify_line(line) {
                LineKind::Header(path) => {
                    self.owning_file = Some(path.to_string());
                    if self.verbose {
                        self.sink
                            .log(&format!("*** Analysing dependencies for {path}"));
                    }
                }
                LineKind::Dependency { name, resolved } => {
                    let Some(owning_file) = &self.owning_file else {
                        return Some(Err(ParseError::UnattributedDependency {
                            line: line.to_string(),
                        }));
                    };
                    if self.verbose {
                        self.sink.log(&format!("  --> Dependency: {name}"));
                        self.sink.log(&format!("  --> Provided by: {resolved}"));
                    }
                    return Some(Ok(DependencyRecord {
                        owning_file: owning_file.clone(),
                        name: name.to_string(),
                        resolved: resolved.to_string(),
                    }));
                }
                LineKind::Ignored | LineKind::Blank => {}
                LineKind::Unrecognized => {
                    let owner = self.owning_file.as_deref().unwrap_or("");
                    self.sink
                        .log(&format!("*** Line did not match for {owner}\n{line}"));
                }
            }
        }
        None
    }
}

/// Parse complete listing output into a vector of records.
///
/// # Errors
/// Returns an error if a dependency line appears before any file header
/// has named its owner.
pub fn parse_listing(
    output: &str,
    sink: &mut dyn LogSink,
    verbose: bool,
) -> Result<Vec<DependencyRecord>, ParseError> {
    Records::new(output, sink, verbose).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn parse(output: &str) -> (Result<Vec<DependencyRecord>, ParseError>, MemorySink) {
        let mut sink = MemorySink::new();
        let result = parse_listing(output, &mut sink, false);
        (result, sink)
    }

    #[test]
    fn test_header_attributes_following_dependencies() {
        let output = "/bin/ls:\n\tlibc.so.6 => /lib/libc.so.6 (0x00007f1)\n";
        let (result, sink) = parse(output);
        let records = result.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owning_file, "/bin/ls");
        assert_eq!(records[0].name, "libc.so.6");
        // The resolved text keeps the load address, as the listing prints it.
        assert_eq!(records[0].resolved, "/lib/libc.so.6 (0x00007f1)");
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_not_found_dependency() {
        let output = "/opt/pkg/bin/app:\n\tlibcustom.so => not found\n";
        let (result, _) = parse(output);
        let records = result.unwrap();
        assert_eq!(records[0].resolved, "not found");
    }

    #[test]
    fn test_header_switches_owning_file() {
        let output = "/bin/a:\n\tlibx.so => /lib/libx.so (0x1)\n/bin/b:\n\tliby.so => /lib/liby.so (0x2)\n";
        let (result, _) = parse(output);
        let records = result.unwrap();
        assert_eq!(records[0].owning_file, "/bin/a");
        assert_eq!(records[1].owning_file, "/bin/b");
    }

    #[test]
    fn test_direct_mapped_lines_emit_nothing() {
        let output = "/bin/ls:\n\tlinux-gate.so.1 (0xb7777000)\n";
        let (result, sink) = parse(output);
        assert!(result.unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_statically_linked_and_non_dynamic_lines_emit_nothing() {
        let output = "/bin/busybox:\n\tstatically linked\n/opt/pkg/README:\n\tnot a dynamic executable\n";
        let (result, sink) = parse(output);
        assert!(result.unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_jvm_internal_lines_emit_nothing() {
        let output = "/opt/pkg/jre/lib/libawt.so:\n\tlibjvm.so\n\tlibjava.so\n\tlibmawt.so\n";
        let (result, sink) = parse(output);
        assert!(result.unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_jvm_dependency_with_arrow_is_still_a_record() {
        // The arrow form is a real dependency line and wins over the prefix match.
        let output = "/opt/pkg/bin/app:\n\tlibjvm.so => /opt/pkg/jre/lib/libjvm.so (0x1)\n";
        let (result, _) = parse(output);
        let records = result.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "libjvm.so");
    }

    #[test]
    fn test_blank_lines_are_skipped_silently() {
        let output = "/bin/ls:\n\n\tlibc.so.6 => /lib/libc.so.6 (0x1)\n\n";
        let (result, sink) = parse(output);
        assert_eq!(result.unwrap().len(), 1);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_unrecognized_line_is_reported_and_skipped() {
        let output = "/bin/ls:\nsomething completely different\n\tlibc.so.6 => /lib/libc.so.6 (0x1)\n";
        let (result, sink) = parse(output);
        let records = result.unwrap();
        // Parsing continued past the odd line.
        assert_eq!(records.len(), 1);
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(
            sink.lines()[0],
            "*** Line did not match for /bin/ls\nsomething completely different"
        );
    }

    #[test]
    fn test_dependency_before_any_header_is_fatal() {
        let output = "\tlibc.so.6 => /lib/libc.so.6 (0x1)\n";
        let (result, _) = parse(output);
        assert_eq!(
            result,
            Err(ParseError::UnattributedDependency {
                line: "\tlibc.so.6 => /lib/libc.so.6 (0x1)".to_string()
            })
        );
    }

    #[test]
    fn test_vdso_with_empty_resolution_keeps_address_text() {
        let output = "/bin/ls:\n\tlinux-vdso.so.1 =>  (0x00007ffd2e5f2000)\n";
        let (result, _) = parse(output);
        let records = result.unwrap();
        assert_eq!(records[0].name, "linux-vdso.so.1");
        assert_eq!(records[0].resolved, "(0x00007ffd2e5f2000)");
    }

    #[test]
    fn test_verbose_traces_headers_and_dependencies() {
        let output = "/bin/ls:\n\tlibc.so.6 => /lib/libc.so.6 (0x1)\n";
        let mut sink = MemorySink::new();
        let records = parse_listing(output, &mut sink, true).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            sink.lines(),
            &[
                "*** Analysing dependencies for /bin/ls".to_string(),
                "  --> Dependency: libc.so.6".to_string(),
                "  --> Provided by: /lib/libc.so.6 (0x1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_stream_is_lazy() {
        let output = "/bin/ls:\n\tliba.so => /lib/liba.so (0x1)\n\tlibb.so => /lib/libb.so (0x2)\n";
        let mut sink = MemorySink::new();
        let mut records = Records::new(output, &mut sink, false);
        let first = records.next().unwrap().unwrap();
        assert_eq!(first.name, "liba.so");
        let second = records.next().unwrap().unwrap();
        assert_eq!(second.name, "libb.so");
        assert!(records.next().is_none());
    }
}
