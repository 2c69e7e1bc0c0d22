
use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Largest key id this implementation can carry.
///
/// The header format tops out at 2^64-1, which a u64 represents exactly,
/// so no narrower range check applies here.
pub const MAX_KEY_ID: u64 = u64::MAX;

/// Metadata byte plus up to 8 key id bytes and 8 counter bytes.
pub const MAX_HEADER_LEN: usize = 17;

/// Parsed or generated SFrame header.
///
/// The first byte describes the layout of the rest, MSB first:
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |R| LEN |X|  K  |
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// `LEN`+1 is the byte length of the big-endian counter that closes the
/// header. With `X` clear, `K` is the key id itself (0..7); with `X` set,
/// `K`+1 big-endian bytes of key id precede the counter.
///
/// <https://tools.ietf.org/html/draft-omara-sframe-00#section-4.2>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    key_id: u64,
    counter: u64,
    data: Bytes,
    raw_counter: Bytes,
}

/// Byte length of the minimal big-endian encoding of `v`. Zero still
/// occupies one byte.
fn min_be_len(v: u64) -> usize {
    (8 - v.leading_zeros() as usize / 8).max(1)
}

fn put_be_min(writer: &mut BytesMut, v: u64) {
    writer.put_slice(&v.to_be_bytes()[8 - min_be_len(v)..]);
}

impl Header {
    /// Serializes `(key_id, counter)` with minimal-length encodings.
    pub fn new(key_id: u64, counter: u64) -> Self {
        let counter_len = min_be_len(counter);
        let extended = key_id > 7;

        let k = if extended {
            min_be_len(key_id) as u8 - 1
        } else {
            key_id as u8
        };
        let metadata = ((counter_len as u8 - 1) << 4) | (u8::from(extended) << 3) | k;

        let mut data = BytesMut::with_capacity(MAX_HEADER_LEN);
        data.put_u8(metadata);
        if extended {
            put_be_min(&mut data, key_id);
        }
        let counter_offset = data.len();
        put_be_min(&mut data, counter);

        let data = data.freeze();
        let raw_counter = data.slice(counter_offset..);

        Header {
            key_id,
            counter,
            data,
            raw_counter,
        }
    }

    /// Parses the header that `buf` begins with. `buf` may continue with
    /// payload; exactly `self.len()` bytes are consumed.
    pub fn parse(buf: &[u8]) -> Result<Header> {
        if buf.is_empty() {
            return Err(Error::FrameTooShort(0, 1));
        }

        let metadata = buf[0];
        let counter_len = ((metadata >> 4) & 0x07) as usize + 1;
        let extended = metadata & 0x08 != 0;
        let k = metadata & 0x07;

        let (key_id, counter_offset) = if extended {
            let key_id_len = k as usize + 1;
            if buf.len() < 1 + key_id_len + counter_len {
                return Err(Error::FrameTooShort(buf.len(), 1 + key_id_len + counter_len));
            }
            (BigEndian::read_uint(&buf[1..], key_id_len), 1 + key_id_len)
        } else {
            if buf.len() < 1 + counter_len {
                return Err(Error::FrameTooShort(buf.len(), 1 + counter_len));
            }
            (k as u64, 1)
        };

        let counter = BigEndian::read_uint(&buf[counter_offset..], counter_len);

        let data = Bytes::copy_from_slice(&buf[..counter_offset + counter_len]);
        let raw_counter = data.slice(counter_offset..);

        Ok(Header {
            key_id,
            counter,
            data,
            raw_counter,
        })
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Serialized length in bytes, always in `2..=17`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// The exact header bytes, fed to the AEAD as associated data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The counter bytes as they appear on the wire, used verbatim to
    /// build the initialization vector.
    pub fn raw_counter(&self) -> &[u8] {
        &self.raw_counter
    }
}
