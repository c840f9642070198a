use anyhow::Result;
use regex::{Captures, Regex};

/// `%h %l %u %t "%r" %>s %O "%{Referer}i" "%{User-Agent}i"`
///
/// Character classes are spelled out so the grammar stays ASCII-only even with
/// the regex crate's Unicode mode on. Outside quotes, fields are separated by
/// a single space or tab. `%l` and `%u` may be empty.
const COMBINED_PATTERN: &str = concat!(
    r"\A(?P<client_ip>[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)[ \t]",
    r"(?P<ident>-|[A-Za-z0-9_]*)[ \t]",
    r"(?P<auth_user>-|[A-Za-z0-9_]*)[ \t]",
    r"\[(?P<full_date>",
    r"(?P<day>[0-9]+)/",
    r"(?P<month>[A-Za-z]+)/",
    r"(?P<year>[0-9]{4}):",
    r"(?P<hour>[0-9]{2}):",
    r"(?P<minute>[0-9]{2}):",
    r"(?P<second>[0-9]{2})[ \t]",
    r"(?P<offset>[+-][0-9]{4}))\][ \t]",
    r#""(?P<client_request>[^"]*)"[ \t]"#,
    r"(?P<server_status>-|[0-9]+)[ \t]",
    r"(?P<bytes_sent>-|[0-9]+)[ \t]",
    r#""(?P<referer>[^"]*)"[ \t]"#,
    r#""(?P<user_agent>[^"]*)"\r?\n?\z"#,
);

/// The bracketed `%t` field, still as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTimestamp<'a> {
    /// Everything between the brackets, e.g. `10/Oct/2000:13:55:36 -0700`.
    pub full_date: &'a str,
    pub day: &'a str,
    pub month: &'a str,
    pub year: &'a str,
    pub hour: &'a str,
    pub minute: &'a str,
    pub second: &'a str,
    pub offset: &'a str,
}

/// One decomposed combined-format line. Fields borrow from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedRecord<'a> {
    pub client_ip: &'a str,
    pub ident: &'a str,
    pub auth_user: &'a str,
    pub timestamp: LogTimestamp<'a>,
    pub client_request: &'a str,
    pub server_status: &'a str,
    pub bytes_sent: &'a str,
    pub referer: &'a str,
    pub user_agent: &'a str,
}

/// Matcher for Apache "combined" lines. Build once per run.
pub struct CombinedMatcher {
    line_re: Regex,
}

impl CombinedMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_re: Regex::new(COMBINED_PATTERN)?,
        })
    }

    /// Decompose `line` (trailing newline allowed). `None` on any deviation
    /// from the grammar; there is no partial extraction.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<CombinedRecord<'a>> {
        let caps = self.line_re.captures(line)?;

        Some(CombinedRecord {
            client_ip: field(&caps, "client_ip")?,
            ident: field(&caps, "ident")?,
            auth_user: field(&caps, "auth_user")?,
            timestamp: LogTimestamp {
                full_date: field(&caps, "full_date")?,
                day: field(&caps, "day")?,
                month: field(&caps, "month")?,
                year: field(&caps, "year")?,
                hour: field(&caps, "hour")?,
                minute: field(&caps, "minute")?,
                second: field(&caps, "second")?,
                offset: field(&caps, "offset")?,
            },
            client_request: field(&caps, "client_request")?,
            server_status: field(&caps, "server_status")?,
            bytes_sent: field(&caps, "bytes_sent")?,
            referer: field(&caps, "referer")?,
            user_agent: field(&caps, "user_agent")?,
        })
    }
}

#[inline]
fn field<'a>(caps: &Captures<'a>, name: &str) -> Option<&'a str> {
    caps.name(name).map(|m| m.as_str())
}
