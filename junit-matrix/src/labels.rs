// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Returns the differing parts of a set of group labels.
///
/// The longest prefix shared by all labels is removed, then the longest suffix shared by what
/// remains. For example, `{reports/run-1/results.xml, reports/run-2/results.xml}` becomes
/// `{1, 2}`. Labels are returned in input order.
///
/// Labels are compared character by character, never splitting a UTF-8 sequence. A few rules keep
/// the output usable as column headers:
///
/// * With fewer than two labels there's nothing to compare against, so the input is returned
///   unchanged.
/// * If the labels share no prefix, the input is returned unchanged. The suffix is only looked at
///   once a prefix has been removed.
/// * A label is never shortened to nothing. If removing the prefix would empty a label, the input
///   is returned unchanged; if removing the suffix would, only the prefix is removed. In
///   particular, identical labels are returned unchanged.
pub fn shorten_group_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let unchanged = || -> Vec<String> { labels.iter().map(|l| l.as_ref().to_owned()).collect() };
    if labels.len() < 2 {
        return unchanged();
    }

    let chars: Vec<Vec<char>> = labels
        .iter()
        .map(|label| label.as_ref().chars().collect())
        .collect();
    let chars: Vec<&[char]> = chars.iter().map(Vec::as_slice).collect();

    let prefix_len = common_prefix_len(&chars);
    if prefix_len == 0 || prefix_len >= min_len(&chars) {
        return unchanged();
    }
    let stripped: Vec<&[char]> = chars.iter().map(|label| &label[prefix_len..]).collect();

    let mut suffix_len = common_suffix_len(&stripped);
    if suffix_len >= min_len(&stripped) {
        suffix_len = 0;
    }
    stripped
        .iter()
        .map(|label| label[..label.len() - suffix_len].iter().collect())
        .collect()
}

fn min_len(labels: &[&[char]]) -> usize {
    labels.iter().map(|label| label.len()).min().unwrap_or(0)
}

fn common_prefix_len(labels: &[&[char]]) -> usize {
    let Some((first, rest)) = labels.split_first() else {
        return 0;
    };
    first
        .iter()
        .enumerate()
        .take_while(|&(idx, c)| rest.iter().all(|label| label.get(idx) == Some(c)))
        .count()
}

fn common_suffix_len(labels: &[&[char]]) -> usize {
    let Some((first, rest)) = labels.split_first() else {
        return 0;
    };
    first
        .iter()
        .rev()
        .enumerate()
        .take_while(|&(idx, c)| {
            rest.iter()
                .all(|label| label.len() > idx && label[label.len() - 1 - idx] == *c)
        })
        .count()
}
