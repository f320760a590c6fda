// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line surface of both binaries.
//!
//! Command output goes to stdout. Failures end as a single line on stderr
//! and exit status 1.

pub mod gasfree;
pub mod wallet;

use std::process::ExitCode;

use crate::error::CliError;

/// Print help for a run without a command and exit with `status`.
pub fn usage(mut help: clap::Command, status: ExitCode) -> ExitCode {
    if let Err(e) = help.print_help() {
        tracing::warn!(error = %e, "failed to print usage");
        return ExitCode::FAILURE;
    }
    status
}

/// Print `error` the way every command reports failures.
pub fn report_failure(error: &CliError) -> ExitCode {
    tracing::debug!(error = ?error, "command failed");
    eprintln!("{}", error.report_line());
    ExitCode::FAILURE
}
