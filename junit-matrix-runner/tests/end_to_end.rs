// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino_tempfile_ext::prelude::*;
use indoc::indoc;
use junit_matrix::TestStatus;
use junit_matrix_runner::{
    aggregate::Aggregator,
    config::{MatrixConfig, OutputFormat, OutputTarget},
    export::{ExportOptions, write_output},
    input::InputSource,
};
use pretty_assertions::assert_eq;

const LINUX: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuites>
        <testsuite name="org.example.ParserTest">
            <testcase name="parsesEmpty" classname="org.example.ParserTest" time="0.010"/>
            <testcase name="parsesNested" classname="org.example.ParserTest" time="0.125">
                <failure message="expected 3, got 2"/>
            </testcase>
        </testsuite>
    </testsuites>
"#};

const WINDOWS: &str = indoc! {r#"
    <testsuite name="org.example.ParserTest">
        <testcase name="parsesEmpty" classname="org.example.ParserTest"/>
        <testcase name="parsesNested" classname="org.example.ParserTest"/>
        <testcase name="parsesCrlf" classname="org.example.ParserTest">
            <skipped message="not on this platform"/>
        </testcase>
    </testsuite>
"#};

#[test]
fn directories_to_xml() {
    let temp_dir = Utf8TempDir::new().unwrap();
    temp_dir.child("ci/linux/TEST-parser.xml").write_str(LINUX).unwrap();
    temp_dir
        .child("ci/windows/TEST-parser.xml")
        .write_str(WINDOWS)
        .unwrap();

    let config = MatrixConfig::from_sources(temp_dir.path(), None, |_| {})
        .expect("default config is valid");
    let args = [
        temp_dir.path().join("ci/linux"),
        temp_dir.path().join("ci/windows"),
    ];
    let inputs = InputSource::resolve_all(args.iter().map(|arg| arg.as_str()))
        .expect("inputs exist");

    let matrix = Aggregator::new(&config)
        .aggregate(&inputs, |_| {})
        .expect("aggregation succeeds");

    let names: Vec<_> = matrix.histories().map(|h| h.full_name()).collect();
    assert_eq!(
        names,
        vec![
            "org.example.ParserTest.parsesEmpty",
            "org.example.ParserTest.parsesNested",
            "org.example.ParserTest.parsesCrlf",
        ]
    );
    let nested = matrix
        .find_by_full_name("org.example.ParserTest.parsesNested")
        .expect("parsesNested was merged");
    assert_eq!(
        nested.statuses().collect::<Vec<_>>(),
        vec![TestStatus::Fail, TestStatus::Pass]
    );

    let output = temp_dir.path().join("matrix.xml");
    write_output(
        &matrix,
        OutputFormat::Xml,
        &ExportOptions::from_config(&config),
        &OutputTarget::File(output.clone()),
    )
    .expect("output written");

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(
        contents.contains(r#"short="linux"/>"#) && contents.contains(r#"short="windows"/>"#),
        "{contents}"
    );
    assert!(
        contents.contains(r#"status="skipped" message="not on this platform"/>"#),
        "{contents}"
    );
}
