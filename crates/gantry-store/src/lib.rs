//! Binary result stores for the Gantry resolution engine.
//!
//! During a single dependency resolution, intermediate and final models are
//! computed once and consumed by several downstream stages, often from other
//! worker threads. This crate persists those models to temporary binary files
//! and answers later reads without recomputation. Everything is scoped to one
//! resolution session; when the session's factory closes, every file it
//! created is reclaimed.
//!
//! # Key Types
//!
//! - [`BinaryStore`] / [`BlockHandle`] — an append-then-read byte stream on a
//!   temporary file, addressed block by block
//! - [`StoreRegistry`] — one store per (logical id, thread), owned by the
//!   session
//! - [`BlockCodec`] / [`BincodeCodec`] — the byte-block codec seam and its
//!   bundled default
//! - [`CachedStore`] / [`CachedStoreFactory`] — in-memory whole-object caches
//!   keyed by configuration path
//! - [`ResultsStoreFactory`] — the façade the resolution engine holds for the
//!   lifetime of one resolution

pub mod binary;
pub mod cached;
pub mod codec;
pub mod error;
pub mod factory;
pub mod registry;
pub mod temp;

pub use binary::{BinaryStore, BlockHandle};
pub use cached::{CachedStore, CachedStoreFactory};
pub use codec::{BincodeCodec, BlockCodec};
pub use error::{StoreError, StoreResult};
pub use factory::ResultsStoreFactory;
pub use registry::{StoreKey, StoreRegistry};
pub use temp::{SessionTempFiles, TempFileProvider};
