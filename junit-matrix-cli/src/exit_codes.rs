// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `junit-matrix`.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum MatrixExitCode {}

impl MatrixExitCode {
    /// No errors occurred and the matrix was written.
    pub const OK: i32 = 0;

    /// No inputs were passed in. Usage is printed to stderr.
    pub const NO_ARGUMENTS: i32 = 1;

    /// An input doesn't exist, or the config is invalid.
    pub const INVALID_INPUT: i32 = 2;

    /// A group couldn't be merged into the matrix.
    pub const AGGREGATION_FAILED: i32 = 3;

    /// Every input was skipped or empty, so there was nothing to render.
    pub const NO_RESULTS: i32 = 4;

    /// Writing the output file or standard output failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 5;

    /// Rendering the matrix failed.
    pub const EXPORT_FAILED: i32 = 6;
}
