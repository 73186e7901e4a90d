use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::codec::BlockCodec;
use crate::error::{StoreError, StoreResult};

/// Buffered writer that tracks how many bytes it has accepted.
///
/// The count is the logical stream length, which block offsets are
/// measured against.
struct CountingWriter {
    inner: BufWriter<File>,
    written: u64,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write-side state, behind the store's mutex.
///
/// `output` is `None` once the store is closed. `block_start` is the offset
/// recorded by the first write since the last flush; `None` means no block
/// is open.
struct StoreInner {
    output: Option<CountingWriter>,
    block_start: Option<u64>,
}

/// Append-then-read binary stream on a temporary file.
///
/// Values are appended through a [`BlockCodec`]; a `flush` ends the current
/// block and returns a [`BlockHandle`] addressing it, so one store hosts many
/// independently readable blocks. Writes are expected from the owning thread
/// only, but the state sits behind a mutex so the registry may close the
/// store from any thread. Closing deletes the backing file.
pub struct BinaryStore {
    /// Path to the backing file.
    path: PathBuf,
    /// Diagnostic label used in error messages.
    label: String,
    /// Guarded write-side state.
    inner: Mutex<StoreInner>,
}

impl BinaryStore {
    /// Open a store on the given file, creating it if needed.
    pub fn create(path: PathBuf) -> StoreResult<Self> {
        let open = || -> io::Result<CountingWriter> {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let written = file.metadata()?.len();
            Ok(CountingWriter {
                inner: BufWriter::new(file),
                written,
            })
        };
        let output = open().map_err(|source| StoreError::Allocation { source })?;

        Ok(Self {
            label: format!("binary store in {}", path.display()),
            path,
            inner: Mutex::new(StoreInner {
                output: Some(output),
                block_start: None,
            }),
        })
    }

    /// Append one value to the current block.
    ///
    /// The first write after a flush records the stream length as the new
    /// block's start offset. Fails once the store is closed.
    pub fn write<C: BlockCodec>(&self, codec: &C, value: &C::Value) -> StoreResult<()> {
        let mut guard = self.inner.lock().expect("store lock poisoned");
        let inner = &mut *guard;
        let Some(output) = inner.output.as_mut() else {
            return Err(self.write_error(closed_error()));
        };

        if inner.block_start.is_none() {
            inner.block_start = Some(output.written);
        }
        codec.encode(value, output).map_err(|e| self.write_error(e))
    }

    /// End the current block: flush buffered output and hand back a handle
    /// addressing everything written since the previous flush.
    ///
    /// With no intervening writes the block is empty and the handle's offset
    /// is the current stream end.
    pub fn flush(&self) -> StoreResult<BlockHandle> {
        let mut guard = self.inner.lock().expect("store lock poisoned");
        let inner = &mut *guard;
        let Some(output) = inner.output.as_mut() else {
            return Err(self.write_error(closed_error()));
        };

        output.flush().map_err(|e| self.write_error(e))?;
        let offset = inner.block_start.take().unwrap_or(output.written);

        debug!(file = %self.path.display(), offset, "flushed block");
        Ok(BlockHandle {
            path: self.path.clone(),
            offset,
            label: self.label.clone(),
            cursor: None,
        })
    }

    /// Flush remaining output, then drop the writer and delete the backing file.
    ///
    /// Idempotent. Both steps run even if the first fails; the first failure
    /// is returned.
    pub fn close(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let Some(mut output) = inner.output.take() else {
            return Ok(());
        };
        inner.block_start = None;

        let mut result = Ok(());
        if let Err(source) = output.flush() {
            result = Err(StoreError::Close {
                store: self.label.clone(),
                source,
            });
        }
        drop(output);

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            // Already reclaimed, nothing left to do.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                if result.is_ok() {
                    result = Err(StoreError::Close {
                        store: self.label.clone(),
                        source,
                    });
                }
            }
        }

        debug!(file = %self.path.display(), "binary store closed");
        result
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            store: self.label.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for BinaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryStore")
            .field("path", &self.path)
            .finish()
    }
}

fn closed_error() -> io::Error {
    io::Error::other("store is closed")
}

/// Address of one flushed block, plus a lazily-opened read cursor.
///
/// The (file, offset) pair is fixed at flush time. The cursor opens on the
/// first `read` and continues sequentially across reads until `release` (or
/// dropping the handle) discards it. A released handle stays usable: the
/// next read re-opens the file and starts again from the block offset.
///
/// Handles are `Send` and may be read on a different thread than the writer.
/// Reads take `&mut self`, so a cursor can never be shared between threads.
pub struct BlockHandle {
    path: PathBuf,
    offset: u64,
    label: String,
    cursor: Option<BufReader<File>>,
}

impl BlockHandle {
    /// Read the next value, starting at the block offset on first use.
    ///
    /// On any failure the cursor is released before the error is returned,
    /// so a failed read never leaks an open file descriptor.
    pub fn read<C: BlockCodec>(&mut self, codec: &C) -> StoreResult<C::Value> {
        match self.read_next(codec) {
            Ok(value) => Ok(value),
            Err(source) => {
                self.release();
                Err(StoreError::Read {
                    block: format!("block at offset {} of {}", self.offset, self.label),
                    source,
                })
            }
        }
    }

    fn read_next<C: BlockCodec>(&mut self, codec: &C) -> io::Result<C::Value> {
        let cursor = match &mut self.cursor {
            Some(cursor) => cursor,
            cursor @ None => {
                let mut file = File::open(&self.path)?;
                file.seek(SeekFrom::Start(self.offset))?;
                debug!(file = %self.path.display(), offset = self.offset, "opened block read cursor");
                cursor.insert(BufReader::new(file))
            }
        };
        codec.decode(cursor)
    }

    /// Drop the read cursor. No-op when it is not open.
    pub fn release(&mut self) {
        if self.cursor.take().is_some() {
            debug!(file = %self.path.display(), offset = self.offset, "released block read cursor");
        }
    }

    /// Start offset of this block in the backing file.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl std::fmt::Debug for BlockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockHandle")
            .field("path", &self.path)
            .field("offset", &self.offset)
            .field("cursor_open", &self.cursor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BincodeCodec;
    use std::io::Read;

    fn store_in(dir: &tempfile::TempDir, name: &str) -> BinaryStore {
        BinaryStore::create(dir.path().join(name)).unwrap()
    }

    fn string_codec() -> BincodeCodec<String> {
        BincodeCodec::new()
    }

    // -----------------------------------------------------------------------
    // Round-trip law
    // -----------------------------------------------------------------------

    #[test]
    fn block_reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "roundtrip.bin");
        let codec = string_codec();

        store.write(&codec, &"alpha".to_string()).unwrap();
        store.write(&codec, &"beta".to_string()).unwrap();
        let mut block = store.flush().unwrap();

        assert_eq!(block.read(&codec).unwrap(), "alpha");
        assert_eq!(block.read(&codec).unwrap(), "beta");
    }

    #[test]
    fn blocks_on_one_store_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "blocks.bin");
        let codec = string_codec();

        store.write(&codec, &"first block".to_string()).unwrap();
        let mut first = store.flush().unwrap();
        store.write(&codec, &"second block".to_string()).unwrap();
        let mut second = store.flush().unwrap();

        // Read out of write order.
        assert_eq!(second.read(&codec).unwrap(), "second block");
        assert_eq!(first.read(&codec).unwrap(), "first block");
        assert!(second.offset() > first.offset());
    }

    #[test]
    fn block_bytes_match_the_raw_file_region() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "raw.bin");
        let codec = string_codec();

        store.write(&codec, &"padding".to_string()).unwrap();
        store.flush().unwrap();
        store.write(&codec, &"target".to_string()).unwrap();
        let block = store.flush().unwrap();

        // The same bytes must decode straight out of the file slice.
        let mut expected = Vec::new();
        codec.encode(&"target".to_string(), &mut expected).unwrap();

        let mut file = File::open(store.path()).unwrap();
        file.seek(SeekFrom::Start(block.offset())).unwrap();
        let mut actual = vec![0u8; expected.len()];
        file.read_exact(&mut actual).unwrap();
        assert_eq!(actual, expected);
    }

    // -----------------------------------------------------------------------
    // Empty blocks
    // -----------------------------------------------------------------------

    #[test]
    fn flush_without_writes_yields_block_at_stream_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "empty.bin");
        let codec = string_codec();

        store.write(&codec, &"data".to_string()).unwrap();
        let first = store.flush().unwrap();
        let mut empty = store.flush().unwrap();

        let file_len = fs::metadata(store.path()).unwrap().len();
        assert_eq!(first.offset(), 0);
        assert_eq!(empty.offset(), file_len);
        // Nothing to decode in an empty block.
        assert!(empty.read(&codec).is_err());
    }

    #[test]
    fn flush_on_a_fresh_store_yields_offset_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "fresh.bin");
        let empty = store.flush().unwrap();
        assert_eq!(empty.offset(), 0);
    }

    // -----------------------------------------------------------------------
    // Cursor lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn release_rewinds_the_next_read_to_the_block_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "release.bin");
        let codec = string_codec();

        store.write(&codec, &"one".to_string()).unwrap();
        store.write(&codec, &"two".to_string()).unwrap();
        let mut block = store.flush().unwrap();

        assert_eq!(block.read(&codec).unwrap(), "one");
        block.release();
        // A fresh cursor starts at the block offset again.
        assert_eq!(block.read(&codec).unwrap(), "one");
        assert_eq!(block.read(&codec).unwrap(), "two");
    }

    #[test]
    fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "idem.bin");
        let mut block = store.flush().unwrap();
        block.release();
        block.release();
    }

    #[test]
    fn failed_read_releases_the_cursor_and_reports_the_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "corrupt.bin");
        let codec = string_codec();

        store.write(&codec, &"fragile".to_string()).unwrap();
        let mut block = store.flush().unwrap();

        // Corrupt one payload byte (past the 8-byte frame header).
        let path = store.path().to_path_buf();
        let mut bytes = fs::read(&path).unwrap();
        bytes[8] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        let err = block.read(&codec).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.to_string().contains("block at offset 0"));

        // Restore the byte; the released cursor re-opens from the offset.
        bytes[8] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();
        assert_eq!(block.read(&codec).unwrap(), "fragile");
    }

    #[test]
    fn handle_can_be_read_on_another_thread() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "send.bin");
        let codec = string_codec();

        store.write(&codec, &"cross-thread".to_string()).unwrap();
        let mut block = store.flush().unwrap();

        let value = std::thread::spawn(move || block.read(&string_codec()).unwrap())
            .join()
            .expect("reader thread should not panic");
        assert_eq!(value, "cross-thread");
    }

    // -----------------------------------------------------------------------
    // Close semantics
    // -----------------------------------------------------------------------

    #[test]
    fn close_deletes_the_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "close.bin");
        let codec = string_codec();

        store.write(&codec, &"doomed".to_string()).unwrap();
        assert!(store.path().exists());

        store.close().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "twice.bin");
        store.close().unwrap();
        store.close().unwrap();
    }

    #[test]
    fn close_tolerates_an_already_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "gone.bin");
        fs::remove_file(store.path()).unwrap();
        store.close().unwrap();
    }

    #[test]
    fn write_after_close_fails_with_the_store_label() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "late.bin");
        store.close().unwrap();

        let err = store.write(&string_codec(), &"too late".to_string()).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(err.to_string().contains("binary store in"));
        assert!(err.to_string().contains("late.bin"));
    }

    #[test]
    fn flush_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "flushlate.bin");
        store.close().unwrap();
        assert!(store.flush().is_err());
    }
}
