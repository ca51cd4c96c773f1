//! Error kinds shared across the archiver, matching the failure taxonomy
//! the migration core is designed against: `Network`, `HttpStatus`,
//! `UrlValidation`, `Parse`, `FileIO`, `Pool`, `Fatal`.

/// An error produced anywhere in the archive pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("http status {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid url: {0}")]
    UrlValidation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("file io error at {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no pool instance available within timeout")]
    Pool,

    #[error("fatal: {0}")]
    Fatal(String),
}

impl Error {
    /// Whether this error must abort the whole archive operation.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
