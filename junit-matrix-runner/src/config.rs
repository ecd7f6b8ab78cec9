// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for junit-matrix.
//!
//! The built-in defaults in `default-config.toml` are overlaid with the repository config at
//! `.config/junit-matrix.toml`, or with a file passed in explicitly.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use bytesize::ByteSize;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use junit_matrix::DuplicatePolicy;
use serde::Deserialize;
use std::{collections::BTreeSet, fmt};

/// Overall configuration for junit-matrix.
#[derive(Clone, Debug)]
pub struct MatrixConfig {
    config_file: Option<Utf8PathBuf>,
    inner: MatrixConfigDeserialize,
}

impl MatrixConfig {
    /// The default location of the config within the current directory.
    pub const CONFIG_PATH: &'static str = ".config/junit-matrix.toml";

    /// Contains the default config as a TOML file.
    ///
    /// The repository config is layered on top of this.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// The output file used when none is configured.
    pub const DEFAULT_OUTPUT_PATH: &'static str = "AGGREGATED_TEST.xml";

    /// Reads the config from the given sources.
    ///
    /// If `config_file` is `None`, the config at [`Self::CONFIG_PATH`] under `base_dir` is used if
    /// it exists. An explicitly passed file must exist.
    ///
    /// Keys that aren't recognized are passed to `unknown_callback`.
    pub fn from_sources(
        base_dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(UnknownConfigKeys),
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = base_dir.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (inner, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            unknown_callback(UnknownConfigKeys {
                config_file: config_file.clone(),
                keys: unknown,
            });
        }

        let config_file = config_file.exists().then_some(config_file);
        Ok(Self { config_file, inner })
    }

    /// Returns the config file that was read, if any.
    pub fn config_file(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref()
    }

    /// Returns the configured output format.
    pub fn output_format(&self) -> OutputFormat {
        self.inner.output.format
    }

    /// Returns where the rendered matrix should go.
    ///
    /// If no path is configured, [`Self::DEFAULT_OUTPUT_PATH`] is used, with `.html` appended for
    /// HTML output. The path `-` means standard output.
    pub fn output_target(&self, format: OutputFormat) -> OutputTarget {
        match &self.inner.output.path {
            Some(path) => OutputTarget::from_path(path),
            None => {
                let mut path = Utf8PathBuf::from(Self::DEFAULT_OUTPUT_PATH);
                if format == OutputFormat::Html {
                    path.set_extension("xml.html");
                }
                OutputTarget::File(path)
            }
        }
    }

    /// Returns the title shown in rendered output.
    pub fn title(&self) -> &str {
        &self.inner.output.title
    }

    /// Returns true if group labels should be shortened in rendered output.
    pub fn shorten_labels(&self) -> bool {
        self.inner.labels.shorten
    }

    /// Returns how tests that appear more than once in a group are handled.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.inner.aggregation.duplicates.into()
    }

    /// Returns what happens when a group fails to aggregate.
    pub fn on_failure(&self) -> OnFailure {
        self.inner.aggregation.on_failure
    }

    /// Returns the largest remote archive that will be downloaded.
    pub fn max_download_size(&self) -> ByteSize {
        self.inner.input.max_download_size
    }

    /// Returns the built-in default config.
    #[cfg(test)]
    pub(crate) fn default_config() -> Self {
        let (inner, unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");
        assert!(unknown.is_empty(), "default config has no unknown keys");
        Self {
            config_file: None,
            inner,
        }
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(MatrixConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: MatrixConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // The key is already part of the serde_path_to_error path.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

/// Keys in a config file that junit-matrix doesn't recognize.
#[derive(Clone, Debug)]
pub struct UnknownConfigKeys {
    /// The config file the keys were found in.
    pub config_file: Utf8PathBuf,

    /// The unknown keys, as dotted paths.
    pub keys: BTreeSet<String>,
}

/// The format the matrix is rendered in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// A self-contained HTML page.
    Html,

    /// An XML document.
    Xml,
}

impl OutputFormat {
    /// Returns the name of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the rendered matrix is written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,

    /// A file, replaced atomically.
    File(Utf8PathBuf),
}

impl OutputTarget {
    /// Interprets a user-provided path, with `-` meaning standard output.
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Self {
        let path = path.as_ref();
        if path == "-" {
            Self::Stdout
        } else {
            Self::File(path.to_owned())
        }
    }
}

/// What happens when a group fails to aggregate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum OnFailure {
    /// Stop and report the error.
    Abort,

    /// Skip the group with a warning, and carry on with the rest.
    Skip,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
enum DuplicatesSetting {
    Keep,
    First,
    Reject,
}

impl From<DuplicatesSetting> for DuplicatePolicy {
    fn from(setting: DuplicatesSetting) -> Self {
        match setting {
            DuplicatesSetting::Keep => Self::Keep,
            DuplicatesSetting::First => Self::First,
            DuplicatesSetting::Reject => Self::Reject,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct MatrixConfigDeserialize {
    output: OutputConfig,
    labels: LabelsConfig,
    aggregation: AggregationConfig,
    input: InputConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct OutputConfig {
    format: OutputFormat,
    #[serde(default)]
    path: Option<Utf8PathBuf>,
    title: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct LabelsConfig {
    shorten: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AggregationConfig {
    duplicates: DuplicatesSetting,
    on_failure: OnFailure,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct InputConfig {
    max_download_size: ByteSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use camino_tempfile_ext::prelude::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = MatrixConfig::default_config();
        assert_eq!(config.output_format(), OutputFormat::Html);
        assert_eq!(
            config.output_target(OutputFormat::Html),
            OutputTarget::File("AGGREGATED_TEST.xml.html".into())
        );
        assert_eq!(
            config.output_target(OutputFormat::Xml),
            OutputTarget::File("AGGREGATED_TEST.xml".into())
        );
        assert_eq!(config.title(), "Aggregated test results");
        assert!(config.shorten_labels());
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Keep);
        assert_eq!(config.on_failure(), OnFailure::Abort);
        assert_eq!(config.max_download_size(), ByteSize::mb(256));
    }

    #[test]
    fn repo_config_overrides_defaults() {
        let temp_dir = Utf8TempDir::new().unwrap();
        temp_dir
            .child(MatrixConfig::CONFIG_PATH)
            .write_str(indoc! {r#"
                [output]
                format = "xml"
                path = "-"

                [aggregation]
                duplicates = "reject"
                on-failure = "skip"

                [input]
                max-download-size = "1KiB"
            "#})
            .unwrap();

        let mut unknown = Vec::new();
        let config = MatrixConfig::from_sources(temp_dir.path(), None, |keys| unknown.push(keys))
            .expect("config is valid");
        assert!(unknown.is_empty(), "no unknown keys: {unknown:?}");

        assert_eq!(
            config.config_file(),
            Some(temp_dir.path().join(MatrixConfig::CONFIG_PATH).as_path())
        );
        assert_eq!(config.output_format(), OutputFormat::Xml);
        assert_eq!(config.output_target(OutputFormat::Xml), OutputTarget::Stdout);
        assert_eq!(config.title(), "Aggregated test results");
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Reject);
        assert_eq!(config.on_failure(), OnFailure::Skip);
        assert_eq!(config.max_download_size(), ByteSize::kib(1));
    }

    #[test]
    fn missing_repo_config_uses_defaults() {
        let temp_dir = Utf8TempDir::new().unwrap();
        let config = MatrixConfig::from_sources(temp_dir.path(), None, |_| {
            panic!("no unknown keys expected")
        })
        .expect("defaults are valid");
        assert_eq!(config.config_file(), None);
        assert_eq!(config.output_format(), OutputFormat::Html);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let temp_dir = Utf8TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let error = MatrixConfig::from_sources(temp_dir.path(), Some(&path), |_| {})
            .expect_err("missing file is an error");
        assert_eq!(error.config_file(), &path);
        assert!(
            matches!(error.kind(), ConfigParseErrorKind::BuildError(_)),
            "unexpected error kind: {:?}",
            error.kind()
        );
    }

    #[test]
    fn unknown_keys_are_reported() {
        let temp_dir = Utf8TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            indoc! {r#"
                [output]
                colour = "always"

                [extra]
                key = 1
            "#},
        )
        .unwrap();

        let mut unknown = Vec::new();
        MatrixConfig::from_sources(temp_dir.path(), Some(&path), |keys| unknown.push(keys))
            .expect("unknown keys are not an error");
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].config_file, path);
        assert_eq!(
            unknown[0].keys.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["extra", "output.colour"],
        );
    }

    #[test]
    fn invalid_value_reports_path() {
        let temp_dir = Utf8TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            indoc! {r#"
                [aggregation]
                duplicates = "sometimes"
            "#},
        )
        .unwrap();

        let error = MatrixConfig::from_sources(temp_dir.path(), Some(&path), |_| {})
            .expect_err("invalid value is an error");
        match error.kind() {
            ConfigParseErrorKind::DeserializeError(error) => {
                assert_eq!(error.path().to_string(), "aggregation.duplicates");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
