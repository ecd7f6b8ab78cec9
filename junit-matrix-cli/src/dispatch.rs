// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    exit_codes::MatrixExitCode,
    output::{OutputContext, OutputOpts, OutputWriter, Stream, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{CommandFactory, Parser};
use display_error_chain::DisplayErrorChain;
use junit_matrix_runner::{
    aggregate::{AggregateEvent, Aggregator},
    config::{MatrixConfig, OutputFormat, OutputTarget, UnknownConfigKeys},
    errors::ExportError,
    export::{self, ExportOptions},
    input::InputSource,
};
use std::ffi::OsString;
use tracing::{debug, info, warn};

/// Aggregate JUnit reports from many test runs into one matrix.
///
/// Each INPUT becomes one column group. An input can be a directory (scanned recursively for
/// `*.xml` reports), a `.txt` file listing report files and directories, a single report file, or
/// an `http(s)://` URL to a zip archive of reports.
#[derive(Debug, Parser)]
#[command(
    name = "junit-matrix",
    version,
    styles = clap_styles::style(),
    max_term_width = 100
)]
pub struct JunitMatrixApp {
    /// Render the matrix as XML instead of HTML (also accepted as `-xml`)
    #[arg(long)]
    xml: bool,

    /// Write the matrix to PATH, or to standard output with `-`
    ///
    /// [default: AGGREGATED_TEST.xml, with .html appended for HTML output]
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output_path: Option<Utf8PathBuf>,

    /// Config file [default: .config/junit-matrix.toml in the current directory]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    #[command(flatten)]
    output: OutputOpts,

    /// Report directories, list files, report files or archive URLs
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,
}

impl JunitMatrixApp {
    /// Parses arguments, accepting the single-dash `-xml` spelling.
    pub fn parse_args(args: impl IntoIterator<Item = OsString>) -> Self {
        Self::parse_from(normalize_args(args))
    }

    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<i32> {
        if self.inputs.is_empty() {
            let help = Self::command().render_help().to_string();
            // If stderr is gone there's nowhere left to report to.
            _ = output_writer.emit(Stream::Stderr, help.as_bytes());
            return Ok(MatrixExitCode::NO_ARGUMENTS);
        }

        let config = MatrixConfig::from_sources(
            Utf8Path::new("."),
            self.config_file.as_deref(),
            warn_unknown_keys,
        )?;
        if let Some(config_file) = config.config_file() {
            debug!("read config from `{config_file}`");
        }

        let inputs = InputSource::resolve_all(&self.inputs)?;
        let matrix = Aggregator::new(&config).aggregate(&inputs, log_event)?;
        if matrix.is_empty() {
            return Err(ExpectedError::NoResults {
                input_count: inputs.len(),
            });
        }

        let format = if self.xml {
            OutputFormat::Xml
        } else {
            config.output_format()
        };
        let target = match &self.output_path {
            Some(path) => OutputTarget::from_path(path),
            None => config.output_target(format),
        };
        let options = ExportOptions::from_config(&config);

        match &target {
            OutputTarget::Stdout => {
                let mut document = Vec::new();
                export::render(&matrix, format, &options, &mut document)?;
                output_writer
                    .emit(Stream::Stdout, &document)
                    .map_err(ExportError::Stdout)?;
            }
            OutputTarget::File(path) => {
                export::write_output(&matrix, format, &options, &target)?;
                info!(
                    "wrote {} matrix of {} tests across {} groups to `{path}`",
                    format,
                    matrix.len(),
                    matrix.groups().len(),
                );
            }
        }

        Ok(MatrixExitCode::OK)
    }
}

/// Rewrites `-xml` to `--xml`, so the single-dash spelling keeps working.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg == "-xml" {
                OsString::from("--xml")
            } else {
                arg
            }
        })
        .collect()
}

fn warn_unknown_keys(unknown: UnknownConfigKeys) {
    let keys = unknown
        .keys
        .iter()
        .map(|key| format!("  - {key}"))
        .collect::<Vec<_>>()
        .join("\n");
    warn!(
        "ignoring unknown configuration keys in `{}`:\n{keys}",
        unknown.config_file
    );
}

fn log_event(event: AggregateEvent<'_>) {
    match event {
        AggregateEvent::GroupStarted { group, file_count } => {
            debug!("loading {file_count} reports for group `{group}`");
        }
        AggregateEvent::ListEntriesMissing { group, missing } => {
            for path in missing {
                warn!("in group `{group}`: listed report `{path}` does not exist");
            }
        }
        AggregateEvent::GroupSkipped { group, reason } => {
            warn!(
                "skipping group `{group}`: {}",
                DisplayErrorChain::new(reason)
            );
        }
        AggregateEvent::GroupMerged {
            group,
            run_count,
            record_count,
        } => {
            info!("merged group `{group}`: {record_count} results from {run_count} reports");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile_ext::prelude::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn verify_app() {
        JunitMatrixApp::command().debug_assert();
    }

    #[test_case(&["junit-matrix", "-xml", "a"], &["junit-matrix", "--xml", "a"] ; "single dash")]
    #[test_case(&["junit-matrix", "--xml", "a"], &["junit-matrix", "--xml", "a"] ; "double dash")]
    #[test_case(&["junit-matrix", "-o", "-xml"], &["junit-matrix", "-o", "--xml"] ; "always rewritten")]
    #[test_case(&["junit-matrix", "a", "b"], &["junit-matrix", "a", "b"] ; "unchanged")]
    fn normalize(input: &[&str], expected: &[&str]) {
        assert_eq!(normalize_args(os_args(input)), os_args(expected));
    }

    #[test]
    fn parse_flags() {
        let app = JunitMatrixApp::parse_args(os_args(&[
            "junit-matrix",
            "-xml",
            "-o",
            "-",
            "--config-file",
            "ci.toml",
            "-v",
            "reports/run-1",
            "https://ci.example.com/a.zip",
        ]));
        assert!(app.xml);
        assert_eq!(app.output_path.as_deref(), Some(Utf8Path::new("-")));
        assert_eq!(app.config_file.as_deref(), Some(Utf8Path::new("ci.toml")));
        assert!(app.output.verbose);
        assert_eq!(
            app.inputs,
            vec!["reports/run-1", "https://ci.example.com/a.zip"]
        );
    }

    fn captured() -> OutputWriter {
        OutputWriter::Captured {
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn no_inputs_prints_usage() {
        let app = JunitMatrixApp::parse_args(os_args(&["junit-matrix"]));
        let mut output = captured();
        let code = app.exec(&mut output).expect("no error");
        assert_eq!(code, MatrixExitCode::NO_ARGUMENTS);

        let OutputWriter::Captured { stdout, stderr } = output else {
            unreachable!("captured writer")
        };
        assert!(stdout.is_empty());
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(stderr.contains("Usage:"), "stderr: {stderr}");
    }

    #[test]
    fn stdout_receives_whole_document() {
        let temp_dir = Utf8TempDir::new().unwrap();
        temp_dir
            .child("run-1/TEST-a.xml")
            .write_str(r#"<testsuite><testcase name="t" classname="C"/></testsuite>"#)
            .unwrap();
        let input = temp_dir.path().join("run-1");

        let app = JunitMatrixApp::parse_args(os_args(&[
            "junit-matrix",
            "--xml",
            "-o",
            "-",
            input.as_str(),
        ]));
        let mut output = captured();
        let code = app.exec(&mut output).expect("no error");
        assert_eq!(code, MatrixExitCode::OK);

        let OutputWriter::Captured { stdout, stderr } = output else {
            unreachable!("captured writer")
        };
        assert!(stderr.is_empty());
        let stdout = String::from_utf8(stdout).unwrap();
        assert!(stdout.starts_with("<?xml"), "stdout: {stdout}");
        assert!(stdout.ends_with("</aggregated>\n"), "stdout: {stdout}");
        assert!(
            stdout.contains(r#"<result group="#) && stdout.contains(r#"status="pass"/>"#),
            "stdout: {stdout}"
        );
    }
}
