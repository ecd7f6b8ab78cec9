// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    RunResultSet, TestHistory, TestRecord,
    errors::{IndexOutOfRange, MergeError},
    shorten_group_labels,
};
use indexmap::IndexMap;
use smol_str::{SmolStr, format_smolstr};
use std::collections::HashSet;

/// What to do when a test appears more than once within a single merged group.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DuplicatePolicy {
    /// Record every appearance as a separate occurrence.
    #[default]
    Keep,

    /// Record only the first appearance within the group.
    First,

    /// Refuse to merge the group.
    Reject,
}

/// Test results from many groups of runs, aggregated by test name.
///
/// ```text
///                 group1  group2  group3
/// testMyTest      pass    fail    pass
/// testOtherTest   fail    pass    pass
/// ```
///
/// Tests are stored in an insertion-ordered map keyed by full name: the first time a name is seen
/// fixes its row permanently. Groups are registered once per merge call, in call order.
#[derive(Clone, Debug)]
pub struct ResultMatrix {
    histories: IndexMap<String, TestHistory>,
    groups: Vec<SmolStr>,
    next_group_num: usize,
}

impl Default for ResultMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultMatrix {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self {
            histories: IndexMap::new(),
            groups: Vec::new(),
            next_group_num: 1,
        }
    }

    /// Merges a group of runs under the given label.
    ///
    /// The label is registered even if `runs` is empty. Every record is attributed to the group
    /// and appended to the history for its full name, creating that history at the end of the
    /// matrix if the name hasn't been seen before.
    pub fn merge(
        &mut self,
        runs: impl IntoIterator<Item = RunResultSet>,
        group_label: impl Into<SmolStr>,
    ) {
        let group_label = group_label.into();
        let group_index = self.push_group(&group_label);
        for record in runs.into_iter().flatten() {
            self.insert(record, group_index, &group_label);
        }
    }

    /// Merges a group of runs under an automatically generated label, and returns that label.
    ///
    /// Labels are `Group1`, `Group2` and so on. The counter belongs to this matrix and is only
    /// advanced by this method.
    pub fn merge_auto(&mut self, runs: impl IntoIterator<Item = RunResultSet>) -> SmolStr {
        let group_label = format_smolstr!("Group{}", self.next_group_num);
        self.next_group_num += 1;
        self.merge(runs, group_label.clone());
        group_label
    }

    /// Merges a group of runs, applying `policy` to tests that appear more than once within the
    /// group.
    ///
    /// With [`DuplicatePolicy::Keep`] this is the same as [`merge`](Self::merge). With
    /// [`DuplicatePolicy::Reject`], the group is checked before anything is modified, so on error
    /// the matrix (including its list of groups) is unchanged.
    pub fn merge_with_policy(
        &mut self,
        runs: impl IntoIterator<Item = RunResultSet>,
        group_label: impl Into<SmolStr>,
        policy: DuplicatePolicy,
    ) -> Result<(), MergeError> {
        let group_label = group_label.into();
        match policy {
            DuplicatePolicy::Keep => {
                self.merge(runs, group_label);
            }
            DuplicatePolicy::First => {
                let group_index = self.push_group(&group_label);
                let mut seen = HashSet::new();
                for record in runs.into_iter().flatten() {
                    if seen.insert(record.full_name().to_owned()) {
                        self.insert(record, group_index, &group_label);
                    }
                }
            }
            DuplicatePolicy::Reject => {
                let runs: Vec<_> = runs.into_iter().collect();
                if let Some((full_name, count)) = first_duplicate(&runs) {
                    return Err(MergeError::DuplicateInGroup {
                        group: group_label,
                        full_name,
                        count,
                    });
                }
                self.merge(runs, group_label);
            }
        }
        Ok(())
    }

    /// Finds a test by its full name, for example `org.example.ClassName.testMethod`.
    pub fn find_by_full_name(&self, full_name: &str) -> Option<&TestHistory> {
        self.histories.get(full_name)
    }

    /// Returns true if a test with the given full name has been merged.
    pub fn contains_by_name(&self, full_name: &str) -> bool {
        self.histories.contains_key(full_name)
    }

    /// Returns the test at `index`, in first-seen order.
    pub fn get(&self, index: usize) -> Result<&TestHistory, IndexOutOfRange> {
        self.histories
            .get_index(index)
            .map(|(_, history)| history)
            .ok_or(IndexOutOfRange {
                index,
                len: self.histories.len(),
            })
    }

    /// Returns the number of distinct tests.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Returns true if no tests have been merged.
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Returns all test histories in first-seen order.
    pub fn histories(&self) -> impl ExactSizeIterator<Item = &TestHistory> + DoubleEndedIterator {
        self.histories.values()
    }

    /// Returns the group labels, one per merge call, in call order.
    pub fn groups(&self) -> &[SmolStr] {
        &self.groups
    }

    /// Returns the group labels with their shared prefix and suffix removed.
    ///
    /// See [`shorten_group_labels`] for details.
    pub fn short_group_labels(&self) -> Vec<String> {
        shorten_group_labels(&self.groups)
    }

    fn push_group(&mut self, group_label: &SmolStr) -> usize {
        self.groups.push(group_label.clone());
        self.groups.len() - 1
    }

    fn insert(&mut self, mut record: TestRecord, group_index: usize, group_label: &SmolStr) {
        record.set_group(group_index, group_label.clone());
        match self.histories.get_mut(record.full_name()) {
            Some(history) => history.add(record),
            None => {
                let full_name = record.full_name().to_owned();
                self.histories.insert(full_name, TestHistory::new(record));
            }
        }
    }
}

/// Returns the first full name (in record order) that occurs more than once, with its count.
fn first_duplicate(runs: &[RunResultSet]) -> Option<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for record in runs.iter().flat_map(RunResultSet::records) {
        *counts.entry(record.full_name()).or_default() += 1;
    }
    counts
        .into_iter()
        .find(|(_, count)| *count > 1)
        .map(|(full_name, count)| (full_name.to_owned(), count))
}
