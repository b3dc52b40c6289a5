//! Binary serialization of integer-output transducers.
//!
//! - [`raw`] -- Fixed-width little-endian `i32` records, one header per state
//! - [`compressed`] -- Varint stream with in-degree renumbering and output bitmaps
//!
//! Both decoders read states strictly in sequential id order until the buffer
//! is exhausted and reject any inconsistency; there is no partial recovery.

pub mod compressed;
pub mod raw;

use log::debug;

use crate::fst::Fst;
use crate::{FstError, Result};

/// Serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Raw,
    Compressed,
}

impl Fst<i32> {
    /// Serialize with the given codec.
    pub fn to_bytes(&self, codec: Codec) -> Vec<u8> {
        let bytes = match codec {
            Codec::Raw => raw::encode(self),
            Codec::Compressed => compressed::encode(self),
        };
        debug!(
            "encoded {} states as {:?}: {} bytes",
            self.state_count(),
            codec,
            bytes.len()
        );
        bytes
    }

    /// Deserialize a buffer produced by [`Fst::to_bytes`] with the same codec.
    pub fn from_bytes(data: &[u8], codec: Codec) -> Result<Self> {
        match codec {
            Codec::Raw => raw::decode(data),
            Codec::Compressed => compressed::decode(data),
        }
    }
}

/// Cursor over an input buffer with bounds-checked reads.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FstError::TooShort {
                expected: self.pos + len,
                actual: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_i32_le(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_pod<P: bytemuck::Pod>(&mut self) -> Result<P> {
        let bytes = self.take(size_of::<P>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub(crate) fn read_varint(&mut self) -> Result<u32> {
        crate::varint::read_u32(self.data, &mut self.pos)
    }
}

/// Map a stored code point back to a `char`.
pub(crate) fn decode_symbol(value: u32) -> Result<char> {
    char::from_u32(value)
        .ok_or_else(|| FstError::Corrupt(format!("invalid input symbol {value:#x}")))
}
