use aes::cipher::generic_array::GenericArray;
use aes::cipher::{KeyIvInit, StreamCipher};
use bytes::Bytes;

use super::{frame_initialization_vector, CipherInner, FrameCipher, NONCE_LEN};
use crate::cipher_suite::CipherSuiteVariant;
use crate::error::{Error, Result};
use crate::header::Header;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// AES-CTR cipher authenticated by the outer truncated HMAC-SHA-256 tag.
pub(crate) struct CipherAesCmHmacSha256 {
    inner: CipherInner,
    encryption_key: Vec<u8>,
}

impl CipherAesCmHmacSha256 {
    pub(crate) fn new(
        variant: CipherSuiteVariant,
        encryption_key: Vec<u8>,
        salt: [u8; NONCE_LEN],
        auth_key: &[u8],
    ) -> Result<Self> {
        let inner = CipherInner::new(variant, salt, auth_key)?;

        Ok(CipherAesCmHmacSha256 {
            inner,
            encryption_key,
        })
    }

    /// The counter block is the 96 bit frame nonce followed by a 32 bit
    /// block counter starting at zero.
    fn apply_keystream(&self, iv: &[u8; NONCE_LEN], buf: &mut [u8]) {
        let mut counter_block = [0u8; 16];
        counter_block[..NONCE_LEN].copy_from_slice(iv);

        let key = GenericArray::from_slice(&self.encryption_key);
        let nonce = GenericArray::from_slice(&counter_block);
        let mut stream = Aes128Ctr::new(key, nonce);
        stream.apply_keystream(buf);
    }
}

impl FrameCipher for CipherAesCmHmacSha256 {
    fn auth_tag_len(&self) -> usize {
        self.inner.auth_tag_len()
    }

    fn encrypt_frame(&self, header: &Header, plaintext: &[u8], skip: usize) -> Result<Bytes> {
        if plaintext.len() < skip {
            return Err(Error::FrameTooShort(plaintext.len(), skip));
        }

        let iv = frame_initialization_vector(header.raw_counter(), self.inner.salt())?;

        let mut writer =
            Vec::with_capacity(plaintext.len() + header.len() + self.auth_tag_len());
        writer.extend_from_slice(&plaintext[..skip]);
        writer.extend_from_slice(header.data());
        writer.extend_from_slice(&plaintext[skip..]);
        self.apply_keystream(&iv, &mut writer[skip + header.len()..]);

        self.inner.append_auth_tag(&mut writer, skip);

        Ok(Bytes::from(writer))
    }

    fn decrypt_frame(&self, header: &Header, encrypted: &[u8], skip: usize) -> Result<Bytes> {
        let min_len = skip + header.len() + self.auth_tag_len();
        if encrypted.len() < min_len {
            return Err(Error::FrameTooShort(encrypted.len(), min_len));
        }

        let tag_offset = encrypted.len() - self.auth_tag_len();
        self.inner
            .verify_auth_tag(&encrypted[skip..tag_offset], &encrypted[tag_offset..])?;

        let iv = frame_initialization_vector(header.raw_counter(), self.inner.salt())?;

        let mut writer = Vec::with_capacity(tag_offset - header.len());
        writer.extend_from_slice(&encrypted[..skip]);
        writer.extend_from_slice(&encrypted[skip + header.len()..tag_offset]);
        self.apply_keystream(&iv, &mut writer[skip..]);

        Ok(Bytes::from(writer))
    }
}
