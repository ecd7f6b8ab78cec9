// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    exit_codes::MatrixExitCode,
    output::{NO_HEADING_TARGET, Styles},
};
use junit_matrix_runner::errors::*;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders. Errors are printed with display_to_stderr, which
// colorizes them.

/// An expected failure, reported to the user with an exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("input error")]
    InputError {
        #[from]
        err: InputError,
    },
    #[error("aggregation error")]
    AggregateError {
        #[from]
        err: AggregateError,
    },
    #[error("no test results found")]
    NoResults { input_count: usize },
    #[error("export error")]
    ExportError {
        #[from]
        err: ExportError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::InputError { .. } => {
                MatrixExitCode::INVALID_INPUT
            }
            Self::AggregateError { .. } => MatrixExitCode::AGGREGATION_FAILED,
            Self::NoResults { .. } => MatrixExitCode::NO_RESULTS,
            Self::ExportError { err } => match err {
                ExportError::Render { .. } => MatrixExitCode::EXPORT_FAILED,
                _ => MatrixExitCode::WRITE_OUTPUT_ERROR,
            },
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &Styles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse junit-matrix config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::InputError { err } => {
                match err {
                    InputError::NotFound { path } => {
                        error!("input `{}` does not exist", path.style(styles.bold));
                    }
                    other => error!("{other}"),
                }
                err.source()
            }
            Self::AggregateError { err } => {
                error!(
                    "failed to merge group `{}` into the matrix",
                    err.group().style(styles.bold)
                );
                err.source()
            }
            Self::NoResults { input_count } => {
                error!(
                    "no test results found in {} {}",
                    input_count.style(styles.bold),
                    if *input_count == 1 { "input" } else { "inputs" },
                );
                None
            }
            Self::ExportError { err } => {
                error!("{err}");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
