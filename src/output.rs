use crate::config::OutputMode;
use crate::parsers::CombinedRecord;
use anyhow::Result;
use std::io::{BufWriter, Write};

// bodyfile 3.x: MD5|name|inode|mode_as_string|UID|GID|size|atime|mtime|ctime|crtime
const BODYFILE_MD5: &str = "0";
const BODYFILE_INODE: &str = "99999999";
const BODYFILE_MODE: &str = "-/rrwxrwxrwx";
const BODYFILE_UID: &str = "0";
const BODYFILE_GID: &str = "0";

pub fn format_line(mode: OutputMode, record: &CombinedRecord<'_>, epoch: i64) -> String {
    match mode {
        OutputMode::Apache => format_apache(record, epoch),
        OutputMode::Bodyfile => format_bodyfile(record, epoch),
    }
}

/// Combined format with `[%t]` replaced by the bare epoch value.
pub fn format_apache(record: &CombinedRecord<'_>, epoch: i64) -> String {
    format!(
        "{} {} {} {} \"{}\" {} {} \"{}\" \"{}\"",
        record.client_ip,
        record.ident,
        record.auth_user,
        epoch,
        record.client_request,
        record.server_status,
        record.bytes_sent,
        record.referer,
        record.user_agent
    )
}

/// One timeline entry named `(client ip)"request"`. The log carries a single
/// time per request so all four time columns get it, and the size column is
/// `%O` as logged, `-` included.
pub fn format_bodyfile(record: &CombinedRecord<'_>, epoch: i64) -> String {
    format!(
        "{}|({})\"{}\"|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        BODYFILE_MD5,
        record.client_ip,
        record.client_request,
        BODYFILE_INODE,
        BODYFILE_MODE,
        BODYFILE_UID,
        BODYFILE_GID,
        record.bytes_sent,
        epoch,
        epoch,
        epoch,
        epoch
    )
}

/// Buffered line sink for stdout (or anything else in tests).
pub struct Writer<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    /// A converted line; the newline is added here.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    /// An unconverted line, exactly as read, terminator included.
    pub fn write_verbatim(&mut self, raw: &[u8]) -> Result<()> {
        self.inner.write_all(raw)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
