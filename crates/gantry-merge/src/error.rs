/// Errors from descriptor construction and merging.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// An artifact declaration carried a URL that does not parse.
    ///
    /// This is bad user input, not an engine fault; the message names the
    /// offending declaration.
    #[error("URL for artifact '{artifact}' can't be parsed: {url}")]
    InvalidArtifactUrl {
        /// Name of the declared artifact.
        artifact: String,
        /// The string that failed to parse.
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
