// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Aggregate the results of many JUnit test runs into one matrix.
//!
//! Every uniquely-named test becomes a row (a [`TestHistory`]), and every merged group of runs
//! becomes a column. The matrix keeps tests in the order they were first seen, and keeps every
//! occurrence of a test, so flaky or environment-specific failures stand out.
//!
//! ```
//! use junit_matrix::{ResultMatrix, RunResultSet, TestRecord, TestStatus};
//!
//! let mut run_a = RunResultSet::new("a/TEST-foo.xml");
//! run_a.push(TestRecord::new("pkg.Foo.testX", TestStatus::Pass));
//!
//! let mut run_b = RunResultSet::new("b/TEST-foo.xml");
//! run_b.push(TestRecord::new("pkg.Foo.testX", TestStatus::Fail));
//!
//! let mut matrix = ResultMatrix::new();
//! matrix.merge([run_a], "a");
//! matrix.merge([run_b], "b");
//!
//! let history = matrix.find_by_full_name("pkg.Foo.testX").unwrap();
//! assert_eq!(history.len(), 2);
//! ```

pub mod errors;
mod history;
mod labels;
mod matrix;
mod record;

pub use history::*;
pub use labels::*;
pub use matrix::*;
pub use record::*;
