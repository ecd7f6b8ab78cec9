// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{TestRecord, TestStatus};

/// Every recorded outcome of one test, across all merged groups.
///
/// Occurrences are kept in merge order: groups in the order they were merged, and within a group,
/// runs and records in the order they were provided. Nothing is deduplicated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestHistory {
    full_name: String,
    occurrences: Vec<TestRecord>,
}

impl TestHistory {
    pub(crate) fn new(first: TestRecord) -> Self {
        Self {
            full_name: first.full_name().to_owned(),
            occurrences: vec![first],
        }
    }

    /// Appends an occurrence.
    pub(crate) fn add(&mut self, record: TestRecord) {
        debug_assert_eq!(
            record.full_name(),
            self.full_name,
            "all occurrences share the history's full name"
        );
        self.occurrences.push(record);
    }

    /// Returns the fully qualified name of the test.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns all occurrences in merge order.
    pub fn occurrences(&self) -> &[TestRecord] {
        &self.occurrences
    }

    /// Returns the occurrences that were merged under the given group label.
    ///
    /// If several merges used the same label, this returns the occurrences from all of them. Use
    /// [`occurrences_in_group`](Self::occurrences_in_group) to get a single column.
    pub fn occurrences_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a TestRecord> {
        self.occurrences
            .iter()
            .filter(move |record| record.group() == Some(group))
    }

    /// Returns the occurrences merged by the group at `index` in
    /// [`ResultMatrix::groups`](crate::ResultMatrix::groups).
    pub fn occurrences_in_group(&self, index: usize) -> impl Iterator<Item = &TestRecord> {
        self.occurrences
            .iter()
            .filter(move |record| record.group_index() == Some(index))
    }

    /// Returns the statuses of all occurrences, in merge order.
    pub fn statuses(&self) -> impl ExactSizeIterator<Item = TestStatus> + '_ {
        self.occurrences.iter().map(TestRecord::status)
    }

    /// Returns the number of occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Returns true if there are no occurrences.
    ///
    /// Histories in a matrix are created with their first occurrence, so this is false for them.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}
