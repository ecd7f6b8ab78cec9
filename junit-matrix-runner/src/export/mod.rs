// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering a [`ResultMatrix`] as XML or HTML.

mod html;
mod xml;

use crate::{
    config::{MatrixConfig, OutputFormat, OutputTarget},
    errors::ExportError,
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use junit_matrix::ResultMatrix;
use std::{
    io::{self, Write},
    time::Duration,
};
use tracing::debug;

/// Options that control how a matrix is rendered.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// The title of the rendered document.
    pub title: String,

    /// Whether group labels are shortened for display.
    pub shorten_labels: bool,
}

impl ExportOptions {
    /// Reads export options from the config.
    pub fn from_config(config: &MatrixConfig) -> Self {
        Self {
            title: config.title().to_owned(),
            shorten_labels: config.shorten_labels(),
        }
    }

    /// Returns the display label for each group, in group order.
    pub(crate) fn display_labels(&self, matrix: &ResultMatrix) -> Vec<String> {
        if self.shorten_labels {
            matrix.short_group_labels()
        } else {
            matrix.groups().iter().map(|group| group.to_string()).collect()
        }
    }
}

/// Renders `matrix` in the given format to `writer`.
pub fn render(
    matrix: &ResultMatrix,
    format: OutputFormat,
    options: &ExportOptions,
    writer: impl io::Write,
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Html => html::serialize_html(matrix, options, writer),
        OutputFormat::Xml => xml::serialize_xml(matrix, options, writer),
    }
    .map_err(|error| ExportError::Render {
        format: format.as_str(),
        error,
    })
}

/// Renders `matrix` and writes it to `target`.
///
/// Files are replaced atomically, so an existing file is left untouched if rendering or writing
/// fails.
pub fn write_output(
    matrix: &ResultMatrix,
    format: OutputFormat,
    options: &ExportOptions,
    target: &OutputTarget,
) -> Result<(), ExportError> {
    let mut buf = Vec::new();
    render(matrix, format, options, &mut buf)?;

    match target {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&buf)
                .and_then(|()| stdout.flush())
                .map_err(ExportError::Stdout)?;
        }
        OutputTarget::File(path) => {
            AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
                .write(|file| file.write_all(&buf))
                .map_err(|error| ExportError::Write {
                    path: path.clone(),
                    error,
                })?;
            debug!(%path, %format, bytes = buf.len(), "wrote matrix");
        }
    }
    Ok(())
}

// Times are shown as seconds with 3 decimal places.
fn format_time(time: Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
