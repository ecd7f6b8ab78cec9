// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading JUnit XML reports into run result sets.
//!
//! Both `<testsuites>` and bare `<testsuite>` roots are accepted, and suites may nest. Every
//! `<testcase>` becomes one [`TestRecord`] named `classname.name`.

use crate::errors::{ReportParseError, ReportParseErrorKind};
use camino::Utf8Path;
use junit_matrix::{RunResultSet, TestRecord, TestStatus};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{fs::File, io::BufRead, io::BufReader, time::Duration};
use tracing::trace;

/// Parses the JUnit report at `path` into a single run.
pub fn parse_report(path: &Utf8Path) -> Result<RunResultSet, ReportParseError> {
    let file = File::open(path)
        .map_err(|error| ReportParseError::new(path, ReportParseErrorKind::Read(error)))?;
    parse_junit_xml(path.as_str(), BufReader::new(file))
        .map_err(|kind| ReportParseError::new(path, kind))
}

/// Parses a JUnit report from `reader`. `source` identifies the report in the returned run.
pub fn parse_junit_xml(
    source: &str,
    reader: impl BufRead,
) -> Result<RunResultSet, ReportParseErrorKind> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);

    let mut run = RunResultSet::new(source);
    let mut buf = Vec::new();
    let mut seen_root = false;
    let mut pending: Option<PendingCase> = None;
    // quick-xml doesn't report elements left open at end of input, so track them here.
    let mut open_elements: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        if let Event::Start(start) = &event {
            open_elements.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
        }
        match &event {
            Event::Start(start) | Event::Empty(start) if !seen_root => {
                check_root(start)?;
                seen_root = true;
            }
            Event::Start(start) | Event::Empty(start) => {
                let is_empty = matches!(event, Event::Empty(_));
                match start.local_name().as_ref() {
                    b"testcase" => {
                        let case = PendingCase::from_start(start)?;
                        if is_empty {
                            run.push(case.finish());
                        } else {
                            pending = Some(case);
                        }
                    }
                    b"failure" => set_outcome(&mut pending, TestStatus::Fail, start)?,
                    b"error" => set_outcome(&mut pending, TestStatus::Error, start)?,
                    b"skipped" => set_outcome(&mut pending, TestStatus::Skipped, start)?,
                    _ => {}
                }
            }
            Event::End(end) => {
                open_elements.pop();
                if end.local_name().as_ref() == b"testcase" {
                    if let Some(case) = pending.take() {
                        run.push(case.finish());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ReportParseErrorKind::Empty);
    }
    if let Some(element) = open_elements.pop() {
        return Err(ReportParseErrorKind::Truncated { element });
    }
    trace!(source, records = run.len(), "parsed report");
    Ok(run)
}

fn check_root(start: &BytesStart<'_>) -> Result<(), ReportParseErrorKind> {
    match start.local_name().as_ref() {
        b"testsuites" | b"testsuite" => Ok(()),
        other => Err(ReportParseErrorKind::UnexpectedRoot {
            root: String::from_utf8_lossy(other).into_owned(),
        }),
    }
}

fn set_outcome(
    pending: &mut Option<PendingCase>,
    status: TestStatus,
    start: &BytesStart<'_>,
) -> Result<(), ReportParseErrorKind> {
    // Only the first outcome element of a test case counts.
    let Some(case) = pending else {
        return Ok(());
    };
    if case.outcome_seen {
        return Ok(());
    }
    case.outcome_seen = true;
    case.record.set_status(status);

    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"message" {
            case.record.set_message(attr.unescape_value()?.into_owned());
        }
    }
    Ok(())
}

struct PendingCase {
    record: TestRecord,
    outcome_seen: bool,
}

impl PendingCase {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ReportParseErrorKind> {
        let mut name = None;
        let mut classname = None;
        let mut time = None;
        for attr in start.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"name" => name = Some(attr.unescape_value()?.into_owned()),
                b"classname" => classname = Some(attr.unescape_value()?.into_owned()),
                b"time" => time = parse_time(&attr.unescape_value()?),
                _ => {}
            }
        }

        let Some(name) = name else {
            return Err(ReportParseErrorKind::MissingTestName { classname });
        };
        let mut record = TestRecord::from_parts(classname.as_deref(), &name, TestStatus::Pass);
        if let Some(time) = time {
            record.set_duration(time);
        }
        Ok(Self {
            record,
            outcome_seen: false,
        })
    }

    fn finish(self) -> TestRecord {
        self.record
    }
}

/// Parses a `time` attribute in seconds. Some reporters use `,` as a thousands separator.
fn parse_time(time: &str) -> Option<Duration> {
    let secs: f64 = time.trim().replace(',', "").parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
