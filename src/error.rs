//! Application-wide error types.
//!
//! Library modules return specific error variants via `thiserror`, while
//! the CLI layer uses `anyhow` for convenient propagation.
//!
//! Recoverable conditions inside the parsing and similarity chains (a
//! malformed NFO, an undecodable backup image) are expressed as `None`
//! within those modules and never surface here; the variants below are the
//! per-directory outcomes the orchestrator downgrades to skips, plus the
//! genuinely fatal configuration errors rejected before traversal.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory has no live cover file
    #[error("no cover file in {0}")]
    MissingCover(PathBuf),

    /// No NFO file in the directory yielded a usable rating
    #[error("no rating found in {0}")]
    NoRatingFound(PathBuf),

    /// The live cover is stamped and no clean backup exists
    #[error("no clean base to render onto in {0} (cover is stamped, no unmarked backup)")]
    UnsafeBaseUnavailable(PathBuf),

    /// No clean backup to restore from
    #[error("no clean backup to restore from in {0}")]
    NoCleanBackup(PathBuf),

    /// Image decode/encode error
    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// EXIF segment read/write error
    #[error("metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Configuration error (bad color, unusable root path)
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an image error.
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingCover(PathBuf::from("/library/Heat (1995)"));
        assert!(err.to_string().contains("Heat (1995)"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::NoCleanBackup(PathBuf::from("/library/x")).context("restoring cover");
        let msg = err.to_string();
        assert!(msg.contains("restoring cover"));
        assert!(msg.contains("backup"));
    }

    #[test]
    fn test_metadata_error() {
        let err = Error::metadata("/library/x/folder.jpg", "truncated EXIF segment");
        let msg = err.to_string();
        assert!(msg.contains("folder.jpg"));
        assert!(msg.contains("truncated EXIF segment"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::config("bad hex color"));
        let with_ctx = result.with_context("parsing --star-color");
        assert!(
            with_ctx
                .unwrap_err()
                .to_string()
                .contains("parsing --star-color")
        );
    }
}
