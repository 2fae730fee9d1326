// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Allow-list registry: pattern sets describing libraries assumed present
//! on every supported target system, and files exempt from checking.

use anyhow::{Context, Result};
use clap::ValueEnum;
use regex::RegexSet;
use std::fs;
use std::path::Path;

// Libraries provided by every supported target system. Patterns are
// unanchored regex searches against the dependency name.
static BASE_LIBRARY_PATTERNS: &[&str] = &[
    r"ld-linux",
    r"libc\.so",
    r"libcrypt\.so",
    r"libdl",
    r"libfreebl\d\.so",
    r"libgcc_s\.so",
    r"libm\.so",
    r"libnsl\.so",
    r"libpthread",
    r"libresolv\.so",
    r"librt\.so",
    r"libstdc\+\+\.so",
    r"libutil\.so",
    r"linux-vdso.+",
];

// Additional libraries shipped with Solaris.
static PLATFORM_LIBRARY_PATTERNS: &[&str] = &[
    r"libaio\.so",
    r"libavl\.so",
    r"libcrypt_[di]\.so",
    r"libcrypto.so",
    r"libcurses\.so",
    r"libdoor\.so",
    r"libgen\.so",
    r"libmd5\.so",
    r"libmd\.so",
    r"libmp\.so",
    r"libscf\.so",
    r"libsec\.so",
    r"libsocket\.so",
    r"libssl.so",
    r"libthread.so",
    r"libuutil\.so",
    r"libz.so",
];

// Files whose entire dependency list is exempt from checking, matched
// against the owning file's path.
static EXEMPT_FILE_PATTERNS: &[&str] = &[r"jre/bin/javaws", r"jre/bin/policytool", r"jre/lib"];

/// Target platform the audited package is built for.
///
/// Selecting `solaris` merges the Solaris library set into the base set;
/// the classifier always queries a single merged set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Linux,
    Solaris,
}

/// Immutable pattern sets the classifier matches against.
pub struct Allowlist {
    libraries: RegexSet,
    exempt_files: RegexSet,
}

impl Allowlist {
    /// Build the registry for a target platform from the static tables.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self::build(platform, &[]).expect("static allow-list patterns must compile")
    }

    /// Build the registry with extra library patterns read from a file.
    ///
    /// Each line in the file is one regex. Empty lines and lines starting
    /// with `#` are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a pattern in it is
    /// not a valid regex.
    pub fn with_patterns_file<P: AsRef<Path>>(platform: Platform, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read allow-list file: {}",
                path.as_ref().display()
            )
        })?;

        let extra: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(std::string::ToString::to_string)
            .collect();

        Self::build(platform, &extra).with_context(|| {
            format!(
                "Invalid pattern in allow-list file: {}",
                path.as_ref().display()
            )
        })
    }

    fn build(platform: Platform, extra: &[String]) -> std::result::Result<Self, regex::Error> {
        let mut patterns: Vec<&str> = BASE_LIBRARY_PATTERNS.to_vec();
        if platform == Platform::Solaris {
            patterns.extend_from_slice(PLATFORM_LIBRARY_PATTERNS);
        }
        patterns.extend(extra.iter().map(String::as_str));
        Ok(Self {
            libraries: RegexSet::new(patterns)?,
            exempt_files: RegexSet::new(EXEMPT_FILE_PATTERNS)?,
        })
    }

    /// Check if a dependency name matches any library pattern.
    #[must_use]
    pub(crate) fn is_library_allowed(&self, name: &str) -> bool {
        self.libraries.is_match(name)
    }

    /// Check if an owning file's path matches any exempt-file pattern.
    #[must_use]
    pub(crate) fn is_file_exempt(&self, path: &str) -> bool {
        self.exempt_files.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_base_patterns_match_versioned_names() {
        let allowlist = Allowlist::for_platform(Platform::Linux);
        assert!(allowlist.is_library_allowed("libc.so.6"));
        assert!(allowlist.is_library_allowed("ld-linux-x86-64.so.2"));
        assert!(allowlist.is_library_allowed("libstdc++.so.6"));
        assert!(allowlist.is_library_allowed("linux-vdso.so.1"));
        assert!(!allowlist.is_library_allowed("libssl.so.1.0.0"));
        assert!(!allowlist.is_library_allowed("libcustom.so"));
    }

    #[test]
    fn test_platform_patterns_only_merge_on_solaris() {
        let linux = Allowlist::for_platform(Platform::Linux);
        let solaris = Allowlist::for_platform(Platform::Solaris);
        assert!(!linux.is_library_allowed("libsocket.so.1"));
        assert!(solaris.is_library_allowed("libsocket.so.1"));
        assert!(solaris.is_library_allowed("libssl.so.1.0.0"));
        // Base patterns stay present on both platforms.
        assert!(solaris.is_library_allowed("libc.so.6"));
    }

    #[test]
    fn test_exempt_file_patterns_match_anywhere_in_path() {
        let allowlist = Allowlist::for_platform(Platform::Linux);
        assert!(allowlist.is_file_exempt("/opt/pkg/embedded/jre/lib/libawt.so"));
        assert!(allowlist.is_file_exempt("/opt/pkg/jre/bin/javaws"));
        assert!(!allowlist.is_file_exempt("/opt/pkg/bin/app"));
    }

    #[test]
    fn test_patterns_file_extends_library_set() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# extra libraries known to exist on targets").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r"libextra\.so").unwrap();
        file.flush().unwrap();

        let allowlist = Allowlist::with_patterns_file(Platform::Linux, file.path()).unwrap();
        assert!(allowlist.is_library_allowed("libextra.so.1"));
        assert!(allowlist.is_library_allowed("libc.so.6"));
        assert!(!allowlist.is_library_allowed("libother.so"));
    }

    #[test]
    fn test_invalid_pattern_in_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lib[unclosed").unwrap();
        file.flush().unwrap();

        let result = Allowlist::with_patterns_file(Platform::Linux, file.path());
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("Invalid pattern"));
    }

    #[test]
    fn test_missing_patterns_file_is_an_error() {
        let result = Allowlist::with_patterns_file(Platform::Linux, "/nonexistent/allowlist.txt");
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("Failed to read"));
    }
}
