// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while loading, aggregating and exporting test results.

use camino::Utf8PathBuf;
use config::ConfigError;
use junit_matrix::errors::MergeError;
use smol_str::SmolStr;
use std::io;
use thiserror::Error;

/// An error that occurred while reading the junit-matrix config.
#[derive(Debug, Error)]
#[error("failed to parse junit-matrix config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while reading the config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the layered config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error that occurred while resolving command-line inputs.
///
/// These errors are fatal: they are reported before any results are merged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InputError {
    /// An input path does not exist.
    #[error("input `{path}` does not exist")]
    NotFound {
        /// The path that was given.
        path: Utf8PathBuf,
    },

    /// An input path could not be inspected.
    #[error("error reading metadata for input `{path}`")]
    Metadata {
        /// The path that was given.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurred while expanding one input into report files.
///
/// Expansion errors cause the input's group to be skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpandError {
    /// A `.txt` list of paths could not be read.
    #[error("error reading list file `{path}`")]
    ListRead {
        /// The list file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A directory could not be scanned.
    #[error("error scanning directory `{dir}`")]
    DirWalk {
        /// The directory being scanned.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: walkdir::Error,
    },

    /// A path found while scanning was not valid UTF-8.
    #[error("path found while scanning `{dir}` is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// The directory being scanned.
        dir: Utf8PathBuf,

        /// The offending path.
        path: std::path::PathBuf,
    },

    /// A remote archive could not be fetched.
    #[error(transparent)]
    Remote(#[from] RemoteFetchError),
}

/// An error that occurred while fetching a remote archive of reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteFetchError {
    /// The HTTP request failed, or the body exceeded the size limit.
    #[error("error downloading `{url}`")]
    Download {
        /// The URL being downloaded.
        url: String,

        /// The underlying error.
        #[source]
        error: Box<ureq::Error>,
    },

    /// A temporary directory to extract the archive into could not be created.
    #[error("error creating temporary directory for `{url}`")]
    TempDir {
        /// The URL being downloaded.
        url: String,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The downloaded archive could not be extracted.
    #[error("error extracting zip archive downloaded from `{url}`")]
    Extract {
        /// The URL being downloaded.
        url: String,

        /// The underlying error.
        #[source]
        error: zip::result::ZipError,
    },
}

/// An error that occurred while parsing a JUnit report.
///
/// Parse errors cause the report's group to be skipped.
#[derive(Debug, Error)]
#[error("error parsing JUnit report `{path}`")]
pub struct ReportParseError {
    path: Utf8PathBuf,
    #[source]
    kind: ReportParseErrorKind,
}

impl ReportParseError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, kind: ReportParseErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns the path to the report.
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ReportParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a JUnit report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportParseErrorKind {
    /// The report could not be read.
    #[error("error reading file")]
    Read(#[source] io::Error),

    /// The report is not well-formed XML.
    #[error("invalid XML")]
    Xml(#[source] quick_xml::Error),

    /// The root element is not `testsuites` or `testsuite`.
    #[error("expected a <testsuites> or <testsuite> root element, found <{root}>")]
    UnexpectedRoot {
        /// The root element that was found.
        root: String,
    },

    /// The report has no root element.
    #[error("report is empty")]
    Empty,

    /// The report ends while an element is still open, typically because it was only partly
    /// written.
    #[error("report ends before <{element}> is closed")]
    Truncated {
        /// The innermost element that was still open.
        element: String,
    },

    /// A `testcase` element has no `name` attribute.
    #[error("<testcase> without a name attribute (classname: {})", .classname.as_deref().unwrap_or("(none)"))]
    MissingTestName {
        /// The class name of the test case, if present.
        classname: Option<String>,
    },
}

impl From<quick_xml::Error> for ReportParseErrorKind {
    fn from(error: quick_xml::Error) -> Self {
        Self::Xml(error)
    }
}

impl From<quick_xml::events::attributes::AttrError> for ReportParseErrorKind {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(error.into())
    }
}

/// An error that occurred while aggregating loaded groups.
#[derive(Debug, Error)]
#[error("error aggregating group `{group}`")]
pub struct AggregateError {
    group: SmolStr,
    #[source]
    error: MergeError,
}

impl AggregateError {
    pub(crate) fn new(group: SmolStr, error: MergeError) -> Self {
        Self { group, error }
    }

    /// Returns the label of the group that failed.
    pub fn group(&self) -> &str {
        &self.group
    }
}

/// An error that occurred while exporting the matrix.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Rendering the matrix failed.
    #[error("error rendering {format} output")]
    Render {
        /// The format being rendered.
        format: &'static str,

        /// The underlying error.
        #[source]
        error: quick_xml::Error,
    },

    /// Writing the output file failed.
    #[error("error writing output to `{path}`")]
    Write {
        /// The output path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: atomicwrites::Error<io::Error>,
    },

    /// Writing to standard output failed.
    #[error("error writing output to stdout")]
    Stdout(#[source] io::Error),
}
