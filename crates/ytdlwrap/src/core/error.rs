use thiserror::Error;

/// Centralized error type for the crate
///
/// Ordinary tool failures (non-zero exit codes) are never reported through this
/// enum; they end up in [`crate::RunResult`] with `success == false`. Only
/// conditions the caller has to handle out of band live here.
///
/// # Example
///
/// ```
/// use ytdlwrap::YtdlError;
///
/// fn describe(err: &YtdlError) -> &'static str {
///     match err {
///         YtdlError::Cancelled => "cancelled",
///         YtdlError::ProcessStart { .. } => "yt-dlp is missing",
///         _ => "other",
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum YtdlError {
    /// Unrecognized flag or malformed option line
    #[error("Invalid option{}: {text}", .line.map(|l| format!(" in line {l}")).unwrap_or_default())]
    Format {
        /// 1-based index of the offending line when parsing a list of lines
        line: Option<usize>,
        text: String,
    },

    /// A value token could not be converted to the option's value kind
    #[error("Invalid value '{value}' for option '{flag}': {reason}")]
    ValueConversion { flag: String, value: String, reason: String },

    /// Host OS has no binary-name or process-tree-kill strategy
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The executable could not be spawned
    #[error("Failed to start '{program}': {source}")]
    ProcessStart {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Requested concurrency outside the allowed range
    #[error("Number of processes must be between 1 and {max}, got {requested}")]
    CapacityOutOfRange { requested: usize, max: usize },

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result with YtdlError
pub type YtdlResult<T> = Result<T, YtdlError>;

impl YtdlError {
    /// Create a format error for a single option line
    pub fn format<S: Into<String>>(text: S) -> Self {
        YtdlError::Format {
            line: None,
            text: text.into(),
        }
    }

    /// Create a value conversion error
    pub fn value_conversion<F, V, R>(flag: F, value: V, reason: R) -> Self
    where
        F: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        YtdlError::ValueConversion {
            flag: flag.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error represents a caller-triggered cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, YtdlError::Cancelled)
    }

    /// Attach a 1-based line index to a format error, leave others untouched
    pub(crate) fn at_line(self, index: usize) -> Self {
        match self {
            YtdlError::Format { text, .. } => YtdlError::Format {
                line: Some(index),
                text,
            },
            other => other,
        }
    }
}
