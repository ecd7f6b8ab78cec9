// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate the JUnit reports of many test runs into one matrix.
//!
//! Every test becomes a row, and every input (a directory of reports, a list of report files, or a
//! zip archive over HTTP) becomes a column group. The matrix is rendered as HTML or XML, so tests
//! that fail only on some runs or some platforms are easy to spot.
//!
//! ```text
//! junit-matrix ci/linux ci/macos ci/windows
//! junit-matrix -xml -o - reports/run-1 reports/run-2
//! ```

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::MatrixExitCode;
#[doc(hidden)]
pub use output::OutputWriter;
