// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the aggregation engine.

use smol_str::SmolStr;
use thiserror::Error;

/// An index passed to [`ResultMatrix::get`](crate::ResultMatrix::get) was out of range.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("index {index} is out of range for a matrix of {len} tests")]
pub struct IndexOutOfRange {
    /// The index that was requested.
    pub index: usize,

    /// The number of tests in the matrix.
    pub len: usize,
}

/// An error that occurs while merging a group of runs into a
/// [`ResultMatrix`](crate::ResultMatrix).
///
/// Returned by [`ResultMatrix::merge_with_policy`](crate::ResultMatrix::merge_with_policy). When
/// this error is returned the matrix has not been modified.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeError {
    /// A test appeared more than once within a single group, and the duplicate policy was
    /// [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject).
    #[error("test `{full_name}` appears {count} times in group `{group}`")]
    DuplicateInGroup {
        /// The group label.
        group: SmolStr,

        /// The full name of the duplicated test.
        full_name: String,

        /// The number of times the test was seen in the group.
        count: usize,
    },
}
