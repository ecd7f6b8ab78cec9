// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ExportOptions, format_time};
use junit_matrix::{ResultMatrix, TestHistory, TestRecord};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use std::io;

static AGGREGATED_TAG: &str = "aggregated";
static GROUPS_TAG: &str = "groups";
static GROUP_TAG: &str = "group";
static TESTS_TAG: &str = "tests";
static TEST_TAG: &str = "test";
static RESULT_TAG: &str = "result";

pub(super) fn serialize_xml(
    matrix: &ResultMatrix,
    options: &ExportOptions,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    let mut aggregated_tag = BytesStart::new(AGGREGATED_TAG);
    aggregated_tag.push_attribute(("title", options.title.as_str()));
    writer.write_event(Event::Start(aggregated_tag))?;

    serialize_groups(matrix, options, &mut writer)?;

    serialize_start_tag(TESTS_TAG, &mut writer)?;
    for history in matrix.histories() {
        serialize_history(history, &mut writer)?;
    }
    serialize_end_tag(TESTS_TAG, &mut writer)?;

    serialize_end_tag(AGGREGATED_TAG, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

fn serialize_groups(
    matrix: &ResultMatrix,
    options: &ExportOptions,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_start_tag(GROUPS_TAG, writer)?;
    for (name, label) in matrix.groups().iter().zip(options.display_labels(matrix)) {
        let mut group_tag = BytesStart::new(GROUP_TAG);
        group_tag.extend_attributes([("name", name.as_str()), ("short", label.as_str())]);
        writer.write_event(Event::Empty(group_tag))?;
    }
    serialize_end_tag(GROUPS_TAG, writer)
}

fn serialize_history(
    history: &TestHistory,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut test_tag = BytesStart::new(TEST_TAG);
    test_tag.push_attribute(("name", history.full_name()));
    writer.write_event(Event::Start(test_tag))?;

    for record in history.occurrences() {
        serialize_record(record, writer)?;
    }

    serialize_end_tag(TEST_TAG, writer)
}

fn serialize_record(
    record: &TestRecord,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut result_tag = BytesStart::new(RESULT_TAG);
    if let Some(group) = record.group() {
        result_tag.push_attribute(("group", group));
    }
    result_tag.push_attribute(("status", record.status().as_str()));
    if let Some(duration) = record.duration() {
        result_tag.push_attribute(("time", format_time(duration).as_str()));
    }
    if let Some(message) = record.message() {
        result_tag.push_attribute(("message", message));
    }
    writer.write_event(Event::Empty(result_tag))
}

fn serialize_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{options, sample_matrix};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_sample() {
        let mut buf = Vec::new();
        serialize_xml(&sample_matrix(), &options(true), &mut buf).expect("serialized");

        let expected = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <aggregated title="Nightly &amp; weekly">
                <groups>
                    <group name="reports/run-1/results" short="1"/>
                    <group name="reports/run-2/results" short="2"/>
                </groups>
                <tests>
                    <test name="org.example.ParserTest.parsesEmpty">
                        <result group="reports/run-1/results" status="pass"/>
                        <result group="reports/run-2/results" status="pass"/>
                    </test>
                    <test name="org.example.ParserTest.parsesNested">
                        <result group="reports/run-1/results" status="fail" time="1.500" message="expected &lt;3&gt;, got &quot;2&quot;"/>
                        <result group="reports/run-2/results" status="pass"/>
                    </test>
                    <test name="org.example.IoTest.readsPipe">
                        <result group="reports/run-2/results" status="skipped"/>
                    </test>
                </tests>
            </aggregated>
        "#};
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn serialize_empty_matrix() {
        let mut buf = Vec::new();
        serialize_xml(&ResultMatrix::new(), &options(false), &mut buf).expect("serialized");
        let output = String::from_utf8(buf).unwrap();
        assert!(
            output.contains(r#"<aggregated title="Nightly &amp; weekly">"#),
            "output: {output}"
        );
        assert!(output.contains("<groups>"), "output: {output}");
        assert!(!output.contains("<test "), "output: {output}");
    }
}
