// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolving command-line inputs into report files.
//!
//! Each input becomes one group. An input can be:
//!
//! * a directory, which is scanned recursively for `*.xml` files;
//! * a `.txt` file listing report files and directories, one per line;
//! * a single report file;
//! * an `http://` or `https://` URL to a zip archive of reports.

use crate::{
    errors::{ExpandError, InputError},
    remote,
};
use bytesize::ByteSize;
use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use std::{fs, io};
use tracing::debug;
use walkdir::WalkDir;

/// A single command-line input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    /// A local directory, list file or report file.
    Path(Utf8PathBuf),

    /// A remote zip archive of reports.
    Remote(String),
}

impl InputSource {
    /// Resolves a command-line argument.
    ///
    /// Local paths must exist. Remote inputs aren't checked until they're fetched.
    pub fn resolve(arg: &str) -> Result<Self, InputError> {
        if remote::is_remote(arg) {
            return Ok(Self::Remote(arg.to_owned()));
        }

        let path = Utf8PathBuf::from(arg);
        match fs::metadata(&path) {
            Ok(_) => Ok(Self::Path(path)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(InputError::NotFound { path })
            }
            Err(error) => Err(InputError::Metadata { path, error }),
        }
    }

    /// Resolves every argument, stopping at the first that fails.
    pub fn resolve_all<I, S>(args: I) -> Result<Vec<Self>, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter()
            .map(|arg| Self::resolve(arg.as_ref()))
            .collect()
    }

    /// Returns the group label for this input: the argument as it was given.
    pub fn label(&self) -> &str {
        match self {
            Self::Path(path) => path.as_str(),
            Self::Remote(url) => url,
        }
    }

    /// Expands this input into the report files it refers to.
    ///
    /// Remote archives are downloaded and extracted into a temporary directory that lives as
    /// long as the returned value.
    pub fn expand(&self, max_download_size: ByteSize) -> Result<ExpandedInput, ExpandError> {
        match self {
            Self::Path(path) if path.is_dir() => Ok(ExpandedInput::new(walk_reports(path)?)),
            Self::Path(path) if is_list_file(path) => read_list(path),
            Self::Path(path) => Ok(ExpandedInput::new(vec![path.clone()])),
            Self::Remote(url) => {
                let dir = remote::fetch_archive(url, max_download_size)?;
                let files = walk_reports(dir.path())?;
                Ok(ExpandedInput {
                    files,
                    missing: Vec::new(),
                    _temp_dir: Some(dir),
                })
            }
        }
    }
}

/// The report files an input expanded to.
#[derive(Debug)]
pub struct ExpandedInput {
    /// Report files, in a stable order.
    pub files: Vec<Utf8PathBuf>,

    /// Entries in a list file that don't exist.
    pub missing: Vec<Utf8PathBuf>,

    _temp_dir: Option<Utf8TempDir>,
}

impl ExpandedInput {
    fn new(files: Vec<Utf8PathBuf>) -> Self {
        Self {
            files,
            missing: Vec::new(),
            _temp_dir: None,
        }
    }
}

fn is_list_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

fn is_report_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Returns all `*.xml` files under `dir`, sorted by path.
fn walk_reports(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ExpandError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|error| ExpandError::DirWalk {
            dir: dir.to_owned(),
            error,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path =
            Utf8PathBuf::from_path_buf(entry.into_path()).map_err(|path| ExpandError::NonUtf8Path {
                dir: dir.to_owned(),
                path,
            })?;
        if is_report_file(&path) {
            files.push(path);
        }
    }
    debug!(%dir, files = files.len(), "scanned directory");
    Ok(files)
}

/// Reads a list file. Relative entries are resolved against the list's directory.
fn read_list(list: &Utf8Path) -> Result<ExpandedInput, ExpandError> {
    let contents = fs::read_to_string(list).map_err(|error| ExpandError::ListRead {
        path: list.to_owned(),
        error,
    })?;
    let base = list.parent().unwrap_or(Utf8Path::new(""));

    let mut expanded = ExpandedInput::new(Vec::new());
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = base.join(line);
        if entry.is_dir() {
            expanded.files.extend(walk_reports(&entry)?);
        } else if entry.is_file() {
            expanded.files.push(entry);
        } else {
            expanded.missing.push(entry);
        }
    }
    Ok(expanded)
}
