// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

use health_check::Platform;

#[derive(Parser)]
#[command(name = "health_check")]
#[command(version)]
#[command(about = "Audits an installed package tree for unsafe or unresolved shared-library dependencies")]
pub(crate) struct Args {
    /// Path to the package installation directory to audit.
    pub install_dir: PathBuf,

    /// Path to write the audit results in JSON format.
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(
        long,
        long_help = "Path to a text file of additional allow-list patterns.\n\
                Each line contains one regex matched against dependency names.\n\
                Empty lines and lines starting with # are ignored."
    )]
    pub allowlist: Option<PathBuf>,

    /// Target platform whose system libraries are assumed present.
    #[arg(long, value_enum, default_value_t = Platform::Linux)]
    pub platform: Platform,

    /// Timeout in seconds for the dependency-listing command.
    #[arg(long, default_value_t = health_check::listing::DEFAULT_LISTING_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Trace every analysed file and dependency verdict.
    #[arg(short, long)]
    pub verbose: bool,
}
