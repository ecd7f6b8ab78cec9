// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use smol_str::SmolStr;
use std::{fmt, time::Duration};

/// The outcome of a single test within a single run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum TestStatus {
    /// The test passed.
    Pass,

    /// The test failed in an expected way, typically an assertion.
    Fail,

    /// The test failed in an unexpected way, for example an uncaught exception.
    Error,

    /// The test was not run.
    Skipped,
}

impl TestStatus {
    /// Returns a short lowercase identifier for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        }
    }

    /// Returns true if this status is a failure or an error.
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::Fail | TestStatus::Error)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test's outcome within one run.
///
/// A record is created by a report parser and is attributed to a group when it is merged into a
/// [`ResultMatrix`](crate::ResultMatrix). Since merging takes ownership of the record, the group
/// can only ever be assigned once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestRecord {
    full_name: String,
    status: TestStatus,
    duration: Option<Duration>,
    message: Option<String>,
    group: Option<SmolStr>,
    group_index: Option<usize>,
}

impl TestRecord {
    /// Creates a new record for the test with the given fully qualified name.
    pub fn new(full_name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            full_name: full_name.into(),
            status,
            duration: None,
            message: None,
            group: None,
            group_index: None,
        }
    }

    /// Creates a new record from a JUnit-style class name and test name.
    ///
    /// The full name is `classname.name`, or just `name` if there's no class name.
    pub fn from_parts(classname: Option<&str>, name: &str, status: TestStatus) -> Self {
        let full_name = match classname {
            Some(classname) if !classname.is_empty() => format!("{classname}.{name}"),
            _ => name.to_owned(),
        };
        Self::new(full_name, status)
    }

    /// Sets the outcome of the test.
    pub fn set_status(&mut self, status: TestStatus) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets the time taken by the test.
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the message attached to a failure, error or skip.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the fully qualified name of the test.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the outcome of the test.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Returns the time taken by the test, if known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Returns the message attached to the outcome, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the label of the group this record was merged under.
    ///
    /// This is `None` until the record has been merged into a matrix.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the position of the group this record was merged under, in
    /// [`ResultMatrix::groups`](crate::ResultMatrix::groups).
    ///
    /// Labels may repeat across merges, so this is what identifies a column. It's `None` until
    /// the record has been merged into a matrix.
    pub fn group_index(&self) -> Option<usize> {
        self.group_index
    }

    pub(crate) fn set_group(&mut self, index: usize, group: SmolStr) {
        debug_assert!(self.group.is_none(), "group is assigned exactly once");
        self.group_index = Some(index);
        self.group = Some(group);
    }
}

/// The ordered test records produced by parsing one report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunResultSet {
    source: String,
    records: Vec<TestRecord>,
}

impl RunResultSet {
    /// Creates an empty result set for the given source, typically the report's path.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, record: TestRecord) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Appends several records, in order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = TestRecord>) -> &mut Self {
        self.records.extend(records);
        self
    }

    /// Returns the source this result set was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the records in report order.
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for RunResultSet {
    type Item = TestRecord;
    type IntoIter = std::vec::IntoIter<TestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// A named collection of runs that share a source, such as a directory or an archive.
///
/// A group becomes one column of the matrix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportGroup {
    name: SmolStr,
    runs: Vec<RunResultSet>,
}

impl ReportGroup {
    /// Creates a new group.
    pub fn new(name: impl Into<SmolStr>, runs: impl IntoIterator<Item = RunResultSet>) -> Self {
        Self {
            name: name.into(),
            runs: runs.into_iter().collect(),
        }
    }

    /// Returns the name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the runs in this group.
    pub fn runs(&self) -> &[RunResultSet] {
        &self.runs
    }

    /// Returns the total number of records across all runs.
    pub fn record_count(&self) -> usize {
        self.runs.iter().map(RunResultSet::len).sum()
    }

    /// Returns true if no run in this group has any records.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(RunResultSet::is_empty)
    }

    /// Splits the group into its name and runs.
    pub fn into_parts(self) -> (SmolStr, Vec<RunResultSet>) {
        (self.name, self.runs)
    }
}
