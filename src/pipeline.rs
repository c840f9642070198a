use crate::config::OutputMode;
use crate::normalizer::{normalize, TimestampError};
use crate::output::{format_line, Writer};
use crate::parsers::CombinedMatcher;
use anyhow::Result;
use memchr::{memchr_iter, memrchr};
use std::io::Write;
use tracing::debug;

/// Why a line was echoed instead of converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unparsed {
    NotUtf8,
    NoMatch,
    Timestamp(TimestampError),
}

/// Result of processing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome<'a> {
    /// Reformatted line, without terminator.
    Converted(String),
    /// The input line, untouched, to be emitted as-is.
    Unparsed { line: &'a [u8], reason: Unparsed },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub lines: usize,
    pub converted: usize,
    pub passed_through: usize,
    pub timestamp_errors: usize,
}

pub struct Converter {
    matcher: CombinedMatcher,
    mode: OutputMode,
}

impl Converter {
    pub fn new(mode: OutputMode) -> Result<Self> {
        Ok(Self {
            matcher: CombinedMatcher::new()?,
            mode,
        })
    }

    pub fn convert_line<'a>(&self, line: &'a [u8]) -> LineOutcome<'a> {
        let unparsed = |reason: Unparsed| LineOutcome::Unparsed { line, reason };

        let Ok(text) = std::str::from_utf8(line) else {
            return unparsed(Unparsed::NotUtf8);
        };
        let Some(record) = self.matcher.match_line(text) else {
            return unparsed(Unparsed::NoMatch);
        };
        match normalize(&record.timestamp) {
            Ok(epoch) => LineOutcome::Converted(format_line(self.mode, &record, epoch)),
            Err(e) => unparsed(Unparsed::Timestamp(e)),
        }
    }
}

/// Convert every line of `input` in order, one output line per input line.
pub fn run<W: Write>(
    converter: &Converter,
    input: &[u8],
    writer: &mut Writer<W>,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    for line in lines(input) {
        stats.lines += 1;
        match converter.convert_line(line) {
            LineOutcome::Converted(out) => {
                stats.converted += 1;
                writer.write_line(&out)?;
            }
            LineOutcome::Unparsed { line, reason } => {
                stats.passed_through += 1;
                match &reason {
                    Unparsed::Timestamp(e) => {
                        stats.timestamp_errors += 1;
                        debug!(line = stats.lines, error = %e, "passing line through");
                    }
                    other => debug!(line = stats.lines, reason = ?other, "passing line through"),
                }
                writer.write_verbatim(line)?;
            }
        }
    }
    Ok(stats)
}

/// Split on `\n`, keeping each terminator; a final unterminated line is kept too.
fn lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let tail_start = memrchr(b'\n', bytes).map_or(0, |nl| nl + 1);
    let tail = (tail_start < bytes.len()).then(|| &bytes[tail_start..]);

    let mut start = 0usize;
    memchr_iter(b'\n', bytes)
        .map(move |nl| {
            let line = &bytes[start..=nl];
            start = nl + 1;
            line
        })
        .chain(tail)
}
