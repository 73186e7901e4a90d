use std::io::{self, Read, Write};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Byte-block codec: how one value becomes bytes in a store and back.
///
/// The codec is supplied per call; stores never interpret the bytes they
/// carry. Streams arrive already open and positioned, and implementations
/// must consume exactly the bytes they wrote so that values written back to
/// back decode back to back.
pub trait BlockCodec {
    /// The value type this codec carries.
    type Value;

    /// Serialize one value onto the stream.
    fn encode(&self, value: &Self::Value, out: &mut dyn Write) -> io::Result<()>;

    /// Read one value off the stream.
    fn decode(&self, input: &mut dyn Read) -> io::Result<Self::Value>;
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Default codec for any serde value.
///
/// On-stream format per value:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode)]
/// ```
///
/// The checksum turns silent corruption of a temporary file into a decode
/// error instead of a wrong resolution result.
pub struct BincodeCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeCodec<T> {
    /// Create a codec for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BincodeCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BincodeCodec")
    }
}

impl<T> BlockCodec for BincodeCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn encode(&self, value: &T, out: &mut dyn Write) -> io::Result<()> {
        let payload = bincode::serialize(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        out.write_all(&length.to_le_bytes())?;
        out.write_all(&crc.to_le_bytes())?;
        out.write_all(&payload)
    }

    fn decode(&self, input: &mut dyn Read) -> io::Result<T> {
        let mut header = [0u8; HEADER_SIZE];
        input.read_exact(&mut header)?;

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        // take() bounds the read, so a corrupted length field cannot demand
        // an oversized upfront allocation.
        let mut payload = Vec::with_capacity(length.min(64 * 1024) as usize);
        input.take(length as u64).read_to_end(&mut payload)?;
        if payload.len() != length as usize {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("value truncated: expected {length} bytes, got {}", payload.len()),
            ));
        }

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"),
            ));
        }

        bincode::deserialize(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
