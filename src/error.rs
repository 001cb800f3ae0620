use std::path::PathBuf;

#[derive(Debug, thiserror::Error,)]
pub enum DumpReaderError {
    #[error("Malformed XML: {source}")]
    MalformedDocument {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync,>,
    },
    #[error("File not found or could not be read: {path} - {source}")]
    FileReadError {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch XML from {url}: {reason}")]
    FetchError { url: String, reason: String, },
    #[error("{0}")]
    InvalidImage(String,),
    #[error("Internal error: {0}")]
    InternalError(String,),
    #[error("The provided path is a directory: {path}. Use --directory-path to process directories.")]
    IsADirectory { path: PathBuf, },
}

impl DumpReaderError {
    pub(crate) fn malformed(
        source: impl Into<Box<dyn std::error::Error + Send + Sync,>,>,
    ) -> Self {
        DumpReaderError::MalformedDocument { source: source.into(), }
    }

    /// True when the input text could not be parsed as XML.
    pub fn is_malformed(&self,) -> bool {
        matches!(self, DumpReaderError::MalformedDocument { .. })
    }
}
