use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input file not found: '{}'", .0.display())]
    MissingInput(PathBuf),

    #[error("invalid data format in '{}': {reason}", .path.display())]
    MalformedData { path: PathBuf, reason: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Errors that only cost the current frame; the run goes on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingInput(_) | Self::MalformedData { .. })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_input_errors_are_recoverable() {
        assert!(Error::MissingInput(PathBuf::from("a.data")).is_recoverable());
        assert!(Error::malformed("a.data", "line 1").is_recoverable());

        assert!(!Error::config("x").is_recoverable());
        assert!(!Error::render("x").is_recoverable());
        assert!(!Error::animation("x").is_recoverable());
        assert!(!Error::Io(std::io::Error::other("disk full")).is_recoverable());
    }

    #[test]
    fn messages_name_the_file() {
        let err = Error::malformed("out_3.data", "line 2: expected 3 fields, found 1");
        let msg = err.to_string();
        assert!(msg.contains("out_3.data"));
        assert!(msg.contains("line 2"));

        let err = Error::MissingInput(PathBuf::from("gone.data"));
        assert!(err.to_string().contains("gone.data"));
    }
}
