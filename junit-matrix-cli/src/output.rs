// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output: log formatting on stderr, colors, and where finished documents go.

use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Style, style};
use std::{
    fmt,
    io::{self, Write},
    sync::Once,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub(crate) mod clap_styles {
    use clap::builder::{
        Styles,
        styling::{AnsiColor, Effects, Style},
    };

    const HEADING: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
    const LITERAL: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
    const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
    const ERROR: Style = AnsiColor::Red.on_default().effects(Effects::BOLD);

    pub(crate) const fn style() -> Styles {
        Styles::styled()
            .header(HEADING)
            .usage(HEADING)
            .literal(LITERAL)
            .placeholder(PLACEHOLDER)
            .error(ERROR)
            .valid(LITERAL)
            .invalid(ERROR)
    }
}

/// Log filter, in `tracing` target syntax (for example `debug` or `junit_matrix_runner=trace`).
pub(crate) static LOG_ENV: &str = "JUNIT_MATRIX_LOG";

/// Events with this target are printed without a level heading.
pub(crate) const NO_HEADING_TARGET: &str = "junit_matrix::no_heading";

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Log each report as it's loaded
    #[arg(long, short, global = true, env = "JUNIT_MATRIX_VERBOSE")]
    pub(crate) verbose: bool,

    /// Color log output on stderr: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    /// Installs the stderr logger and returns the styles errors are printed with.
    pub(crate) fn init(self) -> OutputContext {
        let styles = Styles::new(self.color.enabled_for_stderr());
        let default_level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        init_logger(default_level, styles.clone());
        OutputContext { styles }
    }
}

/// Styles chosen at startup, kept around for error reporting.
#[derive(Clone, Debug)]
#[must_use]
pub struct OutputContext {
    styles: Styles,
}

impl OutputContext {
    /// Returns the styles for messages printed to stderr.
    pub fn stderr_styles(&self) -> Styles {
        self.styles.clone()
    }
}

/// When to color log output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Color if stderr is a terminal that supports it.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

impl Color {
    fn enabled_for_stderr(self) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(supports_color::Stream::Stderr).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// The stylesheet for everything junit-matrix prints to stderr. Plain when color is off.
#[derive(Clone, Debug, Default)]
pub struct Styles {
    error: Style,
    warning: Style,
    info: Style,
    debug: Style,
    pub(crate) bold: Style,
}

impl Styles {
    fn new(colorize: bool) -> Self {
        if !colorize {
            return Self::default();
        }
        Self {
            error: style().red().bold(),
            warning: style().yellow().bold(),
            info: style().bold(),
            debug: style().dimmed(),
            bold: style().bold(),
        }
    }

    fn heading(&self, level: Level) -> (&'static str, Style) {
        match level {
            Level::ERROR => ("error", self.error),
            Level::WARN => ("warning", self.warning),
            Level::INFO => ("info", self.info),
            Level::DEBUG => ("debug", self.debug),
            Level::TRACE => ("trace", self.debug),
        }
    }
}

static INIT_LOGGER: Once = Once::new();

fn init_logger(default_level: LevelFilter, styles: Styles) {
    INIT_LOGGER.call_once(|| {
        let filter = std::env::var(LOG_ENV).unwrap_or_default();
        let default_targets = || Targets::new().with_default(default_level);
        let (targets, invalid) = if filter.is_empty() {
            (default_targets(), None)
        } else {
            match filter.parse::<Targets>() {
                Ok(targets) => (targets, None),
                Err(error) => (default_targets(), Some(error)),
            }
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(HeadingFormatter { styles })
            .with_writer(io::stderr)
            .with_filter(targets);
        tracing_subscriber::registry().with(layer).init();

        if let Some(error) = invalid {
            warn!("ignoring invalid {LOG_ENV} value `{filter}`: {error}");
        }
    });
}

/// Prints `<level>: <message>`, dropping every field except the message.
struct HeadingFormatter {
    styles: Styles,
}

impl<S, N> FormatEvent<S, N> for HeadingFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (heading, style) = self.styles.heading(*metadata.level());
            write!(writer, "{}: ", heading.style(style))?;
        }

        let mut message = MessageField::default();
        event.record(&mut message);
        writeln!(writer, "{}", message.0)
    }
}

#[derive(Default)]
struct MessageField(String);

impl Visit for MessageField {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            // Messages built with format_args! arrive here; their Debug output is the text.
            self.0 = format!("{value:?}");
        }
    }
}

/// Which standard stream a document goes to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

/// Where finished documents (the usage text and rendered matrices) are written.
///
/// Documents are always complete by the time they're emitted, so a failure never leaves half a
/// matrix on stdout.
#[derive(Debug, Default)]
pub enum OutputWriter {
    /// The process's standard streams.
    #[default]
    Terminal,

    /// In-memory buffers, for tests.
    #[cfg(test)]
    Captured {
        /// Everything emitted to stdout.
        stdout: Vec<u8>,
        /// Everything emitted to stderr.
        stderr: Vec<u8>,
    },
}

impl OutputWriter {
    /// Writes `document` to `stream` in full, then flushes it.
    pub(crate) fn emit(&mut self, stream: Stream, document: &[u8]) -> io::Result<()> {
        match self {
            Self::Terminal => match stream {
                Stream::Stdout => write_flushed(io::stdout().lock(), document),
                Stream::Stderr => write_flushed(io::stderr().lock(), document),
            },
            #[cfg(test)]
            Self::Captured { stdout, stderr } => {
                let buf = match stream {
                    Stream::Stdout => stdout,
                    Stream::Stderr => stderr,
                };
                buf.extend_from_slice(document);
                Ok(())
            }
        }
    }
}

fn write_flushed(mut writer: impl Write, document: &[u8]) -> io::Result<()> {
    writer.write_all(document)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_styles_without_color() {
        let styles = Styles::new(false);
        let (heading, style) = styles.heading(Level::WARN);
        assert_eq!(heading, "warning");
        assert_eq!(format!("{}", heading.style(style)), "warning");
    }

    #[test]
    fn captured_streams_stay_apart() {
        let mut output = OutputWriter::Captured {
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        output.emit(Stream::Stdout, b"<html/>").unwrap();
        output.emit(Stream::Stderr, b"Usage:").unwrap();

        let OutputWriter::Captured { stdout, stderr } = output else {
            unreachable!("captured writer")
        };
        assert_eq!(stdout, b"<html/>");
        assert_eq!(stderr, b"Usage:");
    }
}
