use std::io;

/// Errors from binary store and cache operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A temporary backing file could not be created.
    #[error("could not allocate a binary store file: {source}")]
    Allocation {
        #[source]
        source: io::Error,
    },

    /// I/O failure while writing to or flushing a store.
    #[error("problems writing to {store}: {source}")]
    Write {
        /// Diagnostic label identifying the backing file.
        store: String,
        #[source]
        source: io::Error,
    },

    /// I/O or decode failure while reading a block back.
    #[error("problems reading from {block}: {source}")]
    Read {
        /// Diagnostic label identifying the block and backing file.
        block: String,
        #[source]
        source: io::Error,
    },

    /// I/O failure while closing a store or deleting its backing file.
    #[error("problems closing {store}: {source}")]
    Close {
        /// Diagnostic label identifying the backing file.
        store: String,
        #[source]
        source: io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
