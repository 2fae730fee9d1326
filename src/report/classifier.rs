// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Decides whether a single dependency record is safe to ship.

use super::allowlist::Allowlist;
use crate::listing::DependencyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification {
    Safe,
    Unsafe,
}

/// Classify one dependency record.
///
/// A record is UNSAFE only when the dependency name matches no library
/// pattern, the owning file matches no exempt-file pattern, and the
/// resolved text does not contain the install directory. The resolved-path
/// test is evaluated independently of the allow-list disjunction; folding
/// it into the disjunction changes the verdict when the install directory
/// itself matches an allow-list pattern.
pub(crate) fn classify(
    record: &DependencyRecord,
    allowlist: &Allowlist,
    install_dir: &str,
) -> Classification {
    let allow_listed = allowlist.is_library_allowed(&record.name)
        || allowlist.is_file_exempt(&record.owning_file);

    if !allow_listed && !record.resolved.contains(install_dir) {
        Classification::Unsafe
    } else {
        Classification::Safe
    }
}
