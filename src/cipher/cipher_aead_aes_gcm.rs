use aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use bytes::Bytes;

use super::{frame_initialization_vector, CipherInner, FrameCipher, NONCE_LEN};
use crate::cipher_suite::CipherSuiteVariant;
use crate::error::{Error, Result};
use crate::header::Header;

/// Length of the tag GCM folds into its ciphertext.
pub(crate) const GCM_NATIVE_TAG_LEN: usize = 16;

enum GcmCipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

/// AEAD cipher based on AES-GCM.
///
/// The ciphertext core keeps the native GCM tag and the frame is still
/// closed by the outer truncated HMAC, a deliberate deviation from the
/// base draft kept for wire compatibility with the existing deployment.
pub(crate) struct CipherAeadAesGcm {
    inner: CipherInner,
    cipher: GcmCipher,
}

impl CipherAeadAesGcm {
    pub(crate) fn new(
        variant: CipherSuiteVariant,
        encryption_key: &[u8],
        salt: [u8; NONCE_LEN],
        auth_key: &[u8],
    ) -> Result<Self> {
        let inner = CipherInner::new(variant, salt, auth_key)?;

        let cipher = match variant {
            CipherSuiteVariant::AesGcm128Sha256 => GcmCipher::Aes128(
                Aes128Gcm::new_from_slice(encryption_key)
                    .map_err(|e| Error::Unknown(e.to_string()))?,
            ),
            CipherSuiteVariant::AesGcm256Sha512 => GcmCipher::Aes256(
                Aes256Gcm::new_from_slice(encryption_key)
                    .map_err(|e| Error::Unknown(e.to_string()))?,
            ),
            variant => {
                return Err(Error::Unknown(format!(
                    "{variant:?} is not an AEAD cipher suite"
                )))
            }
        };

        Ok(CipherAeadAesGcm { inner, cipher })
    }
}

impl GcmCipher {
    fn encrypt(&self, iv: &[u8; NONCE_LEN], payload: Payload<'_, '_>) -> Result<Vec<u8>> {
        match self {
            GcmCipher::Aes128(cipher) => cipher.encrypt(Nonce::from_slice(iv), payload),
            GcmCipher::Aes256(cipher) => cipher.encrypt(Nonce::from_slice(iv), payload),
        }
        .map_err(|_| Error::EncryptionFailure)
    }

    fn decrypt(&self, iv: &[u8; NONCE_LEN], payload: Payload<'_, '_>) -> Result<Vec<u8>> {
        match self {
            GcmCipher::Aes128(cipher) => cipher.decrypt(Nonce::from_slice(iv), payload),
            GcmCipher::Aes256(cipher) => cipher.decrypt(Nonce::from_slice(iv), payload),
        }
        .map_err(|_| Error::DecryptionFailure)
    }
}

impl FrameCipher for CipherAeadAesGcm {
    fn auth_tag_len(&self) -> usize {
        self.inner.auth_tag_len()
    }

    fn encrypt_frame(&self, header: &Header, plaintext: &[u8], skip: usize) -> Result<Bytes> {
        if plaintext.len() < skip {
            return Err(Error::FrameTooShort(plaintext.len(), skip));
        }

        let iv = frame_initialization_vector(header.raw_counter(), self.inner.salt())?;

        let ciphertext = self.cipher.encrypt(
            &iv,
            Payload {
                msg: &plaintext[skip..],
                aad: header.data(),
            },
        )?;

        let mut writer = Vec::with_capacity(
            skip + header.len() + ciphertext.len() + self.auth_tag_len(),
        );
        writer.extend_from_slice(&plaintext[..skip]);
        writer.extend_from_slice(header.data());
        writer.extend_from_slice(&ciphertext);

        self.inner.append_auth_tag(&mut writer, skip);

        Ok(Bytes::from(writer))
    }

    fn decrypt_frame(&self, header: &Header, encrypted: &[u8], skip: usize) -> Result<Bytes> {
        let min_len = skip + header.len() + GCM_NATIVE_TAG_LEN + self.auth_tag_len();
        if encrypted.len() < min_len {
            return Err(Error::FrameTooShort(encrypted.len(), min_len));
        }

        let tag_offset = encrypted.len() - self.auth_tag_len();
        self.inner
            .verify_auth_tag(&encrypted[skip..tag_offset], &encrypted[tag_offset..])?;

        let iv = frame_initialization_vector(header.raw_counter(), self.inner.salt())?;

        let plaintext = self.cipher.decrypt(
            &iv,
            Payload {
                msg: &encrypted[skip + header.len()..tag_offset],
                aad: header.data(),
            },
        )?;

        let mut writer = Vec::with_capacity(skip + plaintext.len());
        writer.extend_from_slice(&encrypted[..skip]);
        writer.extend_from_slice(&plaintext);

        Ok(Bytes::from(writer))
    }
}
