// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading groups of reports and merging them into a matrix.
//!
//! Progress and problems are reported through [`AggregateEvent`]s, so callers decide how they're
//! shown.

use crate::{
    config::{MatrixConfig, OnFailure},
    errors::{AggregateError, ExpandError, ReportParseError},
    input::InputSource,
    parse::parse_report,
};
use camino::Utf8PathBuf;
use junit_matrix::{ReportGroup, ResultMatrix};
use thiserror::Error;

/// Something that happened while aggregating inputs.
#[derive(Debug)]
#[non_exhaustive]
pub enum AggregateEvent<'a> {
    /// Report files were found for a group, and are about to be parsed.
    GroupStarted {
        /// The group label.
        group: &'a str,

        /// The number of report files in the group.
        file_count: usize,
    },

    /// Entries in a list file don't exist. The rest of the list is still used.
    ListEntriesMissing {
        /// The group label.
        group: &'a str,

        /// The entries that don't exist.
        missing: &'a [Utf8PathBuf],
    },

    /// A group was skipped.
    GroupSkipped {
        /// The group label.
        group: &'a str,

        /// Why the group was skipped.
        reason: &'a SkipReason,
    },

    /// A group was merged into the matrix.
    GroupMerged {
        /// The group label.
        group: &'a str,

        /// The number of reports in the group.
        run_count: usize,

        /// The number of test records in the group.
        record_count: usize,
    },
}

/// The reason a group was skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SkipReason {
    /// The input couldn't be expanded into report files.
    #[error(transparent)]
    Expand(ExpandError),

    /// The input contains no report files.
    #[error("no JUnit reports found")]
    NoReports,

    /// A report in the group couldn't be parsed.
    #[error(transparent)]
    Parse(ReportParseError),

    /// The group couldn't be merged, and `aggregation.on-failure` is `skip`.
    #[error(transparent)]
    Aggregate(AggregateError),
}

/// Loads inputs as groups and merges them into a [`ResultMatrix`].
#[derive(Clone, Copy, Debug)]
pub struct Aggregator<'cfg> {
    config: &'cfg MatrixConfig,
}

impl<'cfg> Aggregator<'cfg> {
    /// Creates a new aggregator.
    pub fn new(config: &'cfg MatrixConfig) -> Self {
        Self { config }
    }

    /// Merges every input, in order, into a new matrix.
    ///
    /// Groups that can't be loaded are skipped. A group that can't be merged is either skipped or
    /// returned as an error, depending on the configured [`OnFailure`].
    pub fn aggregate<'a>(
        &self,
        inputs: impl IntoIterator<Item = &'a InputSource>,
        mut callback: impl FnMut(AggregateEvent<'_>),
    ) -> Result<ResultMatrix, AggregateError> {
        let mut matrix = ResultMatrix::new();
        let policy = self.config.duplicate_policy();

        for input in inputs {
            let group = input.label();
            let report_group = match self.load_group(input, &mut callback) {
                Ok(report_group) => report_group,
                Err(reason) => {
                    callback(AggregateEvent::GroupSkipped {
                        group,
                        reason: &reason,
                    });
                    continue;
                }
            };

            let run_count = report_group.runs().len();
            let record_count = report_group.record_count();
            let (name, runs) = report_group.into_parts();
            match matrix.merge_with_policy(runs, name.clone(), policy) {
                Ok(()) => callback(AggregateEvent::GroupMerged {
                    group,
                    run_count,
                    record_count,
                }),
                Err(error) => {
                    let error = AggregateError::new(name, error);
                    match self.config.on_failure() {
                        OnFailure::Abort => return Err(error),
                        OnFailure::Skip => callback(AggregateEvent::GroupSkipped {
                            group,
                            reason: &SkipReason::Aggregate(error),
                        }),
                    }
                }
            }
        }

        Ok(matrix)
    }

    fn load_group(
        &self,
        input: &InputSource,
        callback: &mut impl FnMut(AggregateEvent<'_>),
    ) -> Result<ReportGroup, SkipReason> {
        let group = input.label();
        let expanded = input
            .expand(self.config.max_download_size())
            .map_err(SkipReason::Expand)?;
        if !expanded.missing.is_empty() {
            callback(AggregateEvent::ListEntriesMissing {
                group,
                missing: &expanded.missing,
            });
        }
        if expanded.files.is_empty() {
            return Err(SkipReason::NoReports);
        }

        callback(AggregateEvent::GroupStarted {
            group,
            file_count: expanded.files.len(),
        });
        let runs = expanded
            .files
            .iter()
            .map(|file| parse_report(file))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SkipReason::Parse)?;
        Ok(ReportGroup::new(group, runs))
    }
}
