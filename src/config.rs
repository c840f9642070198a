use std::path::PathBuf;

/// How each matched line is rendered. Chosen once for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Combined format with the bracketed timestamp replaced by epoch seconds.
    #[default]
    Apache,
    /// Bodyfile 3.x timeline record, for mactime.
    Bodyfile,
}

impl OutputMode {
    pub fn from_mactime(mactime: bool) -> Self {
        if mactime {
            OutputMode::Bodyfile
        } else {
            OutputMode::Apache
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target_file: PathBuf,
    pub mode: OutputMode,
}
