// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ExportOptions, format_time};
use itertools::Itertools;
use junit_matrix::{ResultMatrix, TestHistory, TestRecord, TestStatus};
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io;
use swrite::{SWrite, swrite};

static STYLE: &str = "
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.2em 0.5em; }
th { background: #eee; }
td.name { font-family: monospace; }
tr.mixed { background: #fff4d6; }
span.pass { color: #2a7d2a; }
span.fail { color: #c62828; }
span.error { color: #8e24aa; }
span.skipped { color: #777; }
";

pub(super) fn serialize_html(
    matrix: &ResultMatrix,
    options: &ExportOptions,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);
    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;

    let mut html_tag = BytesStart::new("html");
    html_tag.push_attribute(("lang", "en"));
    writer.write_event(Event::Start(html_tag))?;

    writer.write_event(Event::Start(BytesStart::new("head")))?;
    let mut meta_tag = BytesStart::new("meta");
    meta_tag.push_attribute(("charset", "utf-8"));
    writer.write_event(Event::Empty(meta_tag))?;
    serialize_text_element("title", &options.title, &mut writer)?;
    writer.write_event(Event::Start(BytesStart::new("style")))?;
    writer.write_event(Event::Text(BytesText::from_escaped(STYLE)))?;
    writer.write_event(Event::End(BytesEnd::new("style")))?;
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("body")))?;
    serialize_text_element("h1", &options.title, &mut writer)?;
    serialize_table(matrix, options, &mut writer)?;
    writer.write_event(Event::End(BytesEnd::new("body")))?;

    writer.write_event(Event::End(BytesEnd::new("html")))?;

    // Add a trailing newline.
    writer.write_indent()
}

fn serialize_table(
    matrix: &ResultMatrix,
    options: &ExportOptions,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("table")))?;

    writer.write_event(Event::Start(BytesStart::new("thead")))?;
    writer.write_event(Event::Start(BytesStart::new("tr")))?;
    serialize_text_element("th", "Test", writer)?;
    for (group, label) in matrix.groups().iter().zip(options.display_labels(matrix)) {
        let mut th_tag = BytesStart::new("th");
        th_tag.push_attribute(("title", group.as_str()));
        writer.write_event(Event::Start(th_tag))?;
        writer.write_event(Event::Text(BytesText::new(&label)))?;
        writer.write_event(Event::End(BytesEnd::new("th")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("tr")))?;
    writer.write_event(Event::End(BytesEnd::new("thead")))?;

    writer.write_event(Event::Start(BytesStart::new("tbody")))?;
    for history in matrix.histories() {
        serialize_row(matrix, history, writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tbody")))?;

    writer.write_event(Event::End(BytesEnd::new("table")))
}

fn serialize_row(
    matrix: &ResultMatrix,
    history: &TestHistory,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut tr_tag = BytesStart::new("tr");
    if is_mixed(history) {
        tr_tag.push_attribute(("class", "mixed"));
    }
    writer.write_event(Event::Start(tr_tag))?;

    let mut name_tag = BytesStart::new("td");
    name_tag.push_attribute(("class", "name"));
    writer.write_event(Event::Start(name_tag))?;
    writer.write_event(Event::Text(BytesText::new(history.full_name())))?;
    writer.write_event(Event::End(BytesEnd::new("td")))?;

    for group_index in 0..matrix.groups().len() {
        writer.write_event(Event::Start(BytesStart::new("td")))?;
        let mut occurrences = history.occurrences_in_group(group_index).peekable();
        if occurrences.peek().is_none() {
            // Keeps an empty cell on one line.
            writer.write_event(Event::Text(BytesText::new("")))?;
        }
        for record in occurrences {
            serialize_marker(record, writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("td")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("tr")))
}

fn serialize_marker(
    record: &TestRecord,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let status = record.status();
    let mut tooltip = status.as_str().to_owned();
    if let Some(duration) = record.duration() {
        swrite!(tooltip, " ({}s)", format_time(duration));
    }
    if let Some(message) = record.message() {
        tooltip.push_str(": ");
        tooltip.push_str(message);
    }

    let mut span_tag = BytesStart::new("span");
    span_tag.extend_attributes([("class", status.as_str()), ("title", tooltip.as_str())]);
    writer.write_event(Event::Start(span_tag))?;
    writer.write_event(Event::Text(BytesText::new(marker(status))))?;
    writer.write_event(Event::End(BytesEnd::new("span")))
}

fn serialize_text_element(
    tag_name: &'static str,
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

fn marker(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pass => "\u{2713}",
        TestStatus::Fail => "\u{2717}",
        TestStatus::Error => "!",
        TestStatus::Skipped => "-",
    }
}

/// A row is flagged if not every occurrence of the test had the same outcome, whether the
/// outcomes differ between groups or between runs of one group.
fn is_mixed(history: &TestHistory) -> bool {
    !history.statuses().all_equal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{options, sample_matrix};
    use junit_matrix::RunResultSet;
    use pretty_assertions::assert_eq;

    fn render(options: &ExportOptions) -> String {
        let mut buf = Vec::new();
        serialize_html(&sample_matrix(), options, &mut buf).expect("serialized");
        String::from_utf8(buf).expect("valid UTF-8")
    }

    #[test]
    fn document_structure() {
        let output = render(&options(true));
        assert!(output.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"), "{output}");
        assert!(output.ends_with("</html>\n"), "{output}");
        assert!(output.contains("<title>Nightly &amp; weekly</title>"), "{output}");
        assert!(output.contains("<h1>Nightly &amp; weekly</h1>"), "{output}");
        assert!(output.contains("tr.mixed {"), "{output}");
    }

    #[test]
    fn headers_use_short_labels() {
        let output = render(&options(true));
        assert!(
            output.contains(r#"<th title="reports/run-1/results">1</th>"#),
            "{output}"
        );
        assert!(
            output.contains(r#"<th title="reports/run-2/results">2</th>"#),
            "{output}"
        );

        let output = render(&options(false));
        assert!(
            output.contains(r#"<th title="reports/run-1/results">reports/run-1/results</th>"#),
            "{output}"
        );
    }

    #[test]
    fn rows_and_markers() {
        let output = render(&options(true));
        let rows: Vec<_> = output
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("<tr"))
            .collect();
        assert_eq!(
            rows,
            vec!["<tr>", "<tr>", r#"<tr class="mixed">"#, "<tr>"],
            "header row, then one row per test"
        );

        assert!(
            output.contains(
                r#"<span class="fail" title="fail (1.500s): expected &lt;3&gt;, got &quot;2&quot;">✗</span>"#
            ),
            "{output}"
        );
        assert!(
            output.contains(r#"<span class="skipped" title="skipped">-</span>"#),
            "{output}"
        );
        // readsPipe didn't run in the first group.
        assert_eq!(output.matches("<td></td>").count(), 1, "{output}");
    }

    #[test]
    fn mixed_rows() {
        let matrix = sample_matrix();
        let mixed: Vec<_> = matrix
            .histories()
            .filter(|history| is_mixed(history))
            .map(|history| history.full_name())
            .collect();
        assert_eq!(mixed, vec!["org.example.ParserTest.parsesNested"]);
    }

    #[test]
    fn flaky_within_one_group_is_mixed() {
        let mut run = RunResultSet::new("run.xml");
        run.push(TestRecord::new("t", TestStatus::Pass))
            .push(TestRecord::new("t", TestStatus::Fail));
        let mut matrix = ResultMatrix::new();
        matrix.merge([run], "only");
        let history = matrix.find_by_full_name("t").unwrap();
        assert!(is_mixed(history));
    }

    #[test]
    fn repeated_labels_render_separate_columns() {
        let mut matrix = ResultMatrix::new();
        for status in [TestStatus::Pass, TestStatus::Fail] {
            let mut run = RunResultSet::new("TEST-t.xml");
            run.push(TestRecord::new("t", status));
            matrix.merge([run], "reports");
        }

        let mut buf = Vec::new();
        serialize_html(&matrix, &options(false), &mut buf).expect("serialized");
        let output = String::from_utf8(buf).expect("valid UTF-8");

        assert_eq!(output.matches("<span class=").count(), 2, "{output}");
        let cells: Vec<_> = output
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("<span class="))
            .collect();
        assert_eq!(
            cells,
            vec![
                r#"<span class="pass" title="pass">✓</span>"#,
                r#"<span class="fail" title="fail">✗</span>"#,
            ]
        );
    }
}
