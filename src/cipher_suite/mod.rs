#[cfg(test)]
mod cipher_suite_test;

use bytes::Bytes;
use hkdf::Hkdf;
use sha2::{Sha256, Sha512};

use crate::cipher::cipher_aead_aes_gcm::CipherAeadAesGcm;
use crate::cipher::cipher_aes_cm_hmac_sha256::CipherAesCmHmacSha256;
use crate::cipher::{FrameCipher, NONCE_LEN};
use crate::error::{Error, Result};
use crate::header::Header;

/// Extract salt shared by every derivation, fixed by the wire format.
const HKDF_SALT: &[u8] = b"SFrame10";
const HKDF_INFO_KEY: &[u8] = b"key";
const HKDF_INFO_SALT: &[u8] = b"salt";
const HKDF_INFO_AUTH: &[u8] = b"auth";

/// Algorithm and tag-length selection, similar to a TLS cipher suite.
///
/// <https://tools.ietf.org/html/draft-omara-sframe-00#section-4.4>
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CipherSuiteVariant {
    /// AES-CTR with a 4 byte truncated HMAC-SHA-256 tag.
    AesCm128HmacSha256_4,
    /// AES-CTR with an 8 byte truncated HMAC-SHA-256 tag.
    AesCm128HmacSha256_8,
    AesGcm128Sha256,
    #[default]
    AesGcm256Sha512,
}

impl CipherSuiteVariant {
    /// AEAD key length in bytes (nK).
    pub fn key_len(&self) -> usize {
        match self {
            CipherSuiteVariant::AesCm128HmacSha256_4
            | CipherSuiteVariant::AesCm128HmacSha256_8
            | CipherSuiteVariant::AesGcm128Sha256 => 16,
            CipherSuiteVariant::AesGcm256Sha512 => 32,
        }
    }

    /// Nonce length in bytes (nN).
    pub fn nonce_len(&self) -> usize {
        NONCE_LEN
    }

    /// Length of the truncated HMAC tag on the wire (nT).
    pub fn auth_tag_len(&self) -> usize {
        match self {
            CipherSuiteVariant::AesCm128HmacSha256_4 => 4,
            CipherSuiteVariant::AesCm128HmacSha256_8 | CipherSuiteVariant::AesGcm128Sha256 => 8,
            CipherSuiteVariant::AesGcm256Sha512 => 16,
        }
    }
}

/// HKDF-Expand under the suite hash, with the fixed extract salt.
fn hkdf_expand(
    variant: CipherSuiteVariant,
    key_material: &[u8],
    info: &[u8],
    len: usize,
) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    match variant {
        CipherSuiteVariant::AesCm128HmacSha256_4
        | CipherSuiteVariant::AesCm128HmacSha256_8
        | CipherSuiteVariant::AesGcm128Sha256 => Hkdf::<Sha256>::new(Some(HKDF_SALT), key_material)
            .expand(info, &mut out)
            .map_err(|e| Error::Unknown(e.to_string()))?,
        CipherSuiteVariant::AesGcm256Sha512 => Hkdf::<Sha512>::new(Some(HKDF_SALT), key_material)
            .expand(info, &mut out)
            .map_err(|e| Error::Unknown(e.to_string()))?,
    }
    Ok(out)
}

/// One set of frame keys, derived once from raw key material and
/// immutable afterwards. Owned by a sender or by one keyring slot of a
/// receiver.
pub struct CipherSuite {
    variant: CipherSuiteVariant,
    secret: Vec<u8>,
    cipher: Box<dyn FrameCipher + Send + Sync>,
}

impl CipherSuite {
    /// Runs the key schedule: `"key"` expands to the AEAD encryption
    /// key, `"salt"` to the 96 bit nonce salt and `"auth"` to the outer
    /// HMAC-SHA-256 key.
    pub fn derive(variant: CipherSuiteVariant, key_material: &[u8]) -> Result<CipherSuite> {
        if key_material.len() < variant.key_len() {
            return Err(Error::ShortKeyMaterial(key_material.len(), variant.key_len()));
        }

        let encryption_key = hkdf_expand(variant, key_material, HKDF_INFO_KEY, variant.key_len())?;
        let salt_bytes = hkdf_expand(variant, key_material, HKDF_INFO_SALT, NONCE_LEN)?;
        let auth_key = hkdf_expand(variant, key_material, HKDF_INFO_AUTH, variant.key_len())?;

        let mut salt = [0u8; NONCE_LEN];
        salt.copy_from_slice(&salt_bytes);

        let cipher: Box<dyn FrameCipher + Send + Sync> = match variant {
            CipherSuiteVariant::AesCm128HmacSha256_4 | CipherSuiteVariant::AesCm128HmacSha256_8 => {
                Box::new(CipherAesCmHmacSha256::new(
                    variant,
                    encryption_key,
                    salt,
                    &auth_key,
                )?)
            }
            CipherSuiteVariant::AesGcm128Sha256 | CipherSuiteVariant::AesGcm256Sha512 => Box::new(
                CipherAeadAesGcm::new(variant, &encryption_key, salt, &auth_key)?,
            ),
        };

        Ok(CipherSuite {
            variant,
            secret: key_material.to_vec(),
            cipher,
        })
    }

    pub fn variant(&self) -> CipherSuiteVariant {
        self.variant
    }

    pub fn auth_tag_len(&self) -> usize {
        self.cipher.auth_tag_len()
    }

    pub fn encrypt_frame(&self, header: &Header, plaintext: &[u8], skip: usize) -> Result<Bytes> {
        self.cipher.encrypt_frame(header, plaintext, skip)
    }

    pub fn decrypt_frame(&self, header: &Header, encrypted: &[u8], skip: usize) -> Result<Bytes> {
        self.cipher.decrypt_frame(header, encrypted, skip)
    }

    /// Re-derives the leading `bits` of the AEAD encryption key, for
    /// diagnostics and known-answer tests.
    pub fn derive_encryption_key_bits(&self, bits: usize) -> Result<Vec<u8>> {
        hkdf_expand(self.variant, &self.secret, HKDF_INFO_KEY, bits / 8)
    }

    /// Re-derives the leading `bits` of the nonce salt.
    pub fn derive_salt_bits(&self, bits: usize) -> Result<Vec<u8>> {
        hkdf_expand(self.variant, &self.secret, HKDF_INFO_SALT, bits / 8)
    }
}
