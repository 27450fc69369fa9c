use std::path::PathBuf;

/// Result alias that carries the custom [`VisualiserError`] type.
pub type Result<T> = std::result::Result<T, VisualiserError>;

/// Common error type for the core crate.
///
/// Malformed MIDI bytes, stray note-offs and pruned link targets never show
/// up here; they are absorbed where they occur. What remains is fatal to the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum VisualiserError {
    /// Free-form message for failures that do not deserve their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The MIDI character device could not be opened at startup.
    #[error("MIDI device `{}` is unavailable: {source}", path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The rendering backend reported a failure.
    #[error("render backend: {0}")]
    Render(String),
}

impl VisualiserError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        Self::Render(msg.into())
    }
}

impl From<&str> for VisualiserError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VisualiserError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_names_the_path() {
        let err = VisualiserError::DeviceUnavailable {
            path: PathBuf::from("/dev/midi9"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such device"),
        };

        let text = format!("{err}");
        assert!(text.contains("/dev/midi9"));
        assert!(text.contains("no such device"));
    }

    #[test]
    fn strings_convert_into_messages() {
        let err: VisualiserError = "boom".into();
        assert!(matches!(err, VisualiserError::Message(ref m) if m == "boom"));
    }
}
