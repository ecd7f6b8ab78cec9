// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Loading, aggregating and rendering JUnit reports for
//! [junit-matrix](https://crates.io/crates/junit-matrix-cli).
//!
//! The flow of operations is:
//!
//! 1. Read the [`MatrixConfig`](config::MatrixConfig).
//! 2. Resolve each command-line argument to an [`InputSource`](input::InputSource).
//! 3. Use an [`Aggregator`](aggregate::Aggregator) to expand and parse every input, and merge the
//!    results into a [`ResultMatrix`](junit_matrix::ResultMatrix).
//! 4. Render the matrix with [`export::write_output`].

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod export;
pub mod input;
pub mod parse;
pub mod remote;
