pub(crate) mod cipher_aead_aes_gcm;
pub(crate) mod cipher_aes_cm_hmac_sha256;

#[cfg(test)]
mod cipher_test;

use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::cipher_suite::CipherSuiteVariant;
use crate::error::{Error, Result};
use crate::header::Header;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Every suite uses a 96 bit nonce.
pub(crate) const NONCE_LEN: usize = 12;

/// Per-frame transform bound to one set of derived keys.
///
/// A protected frame is laid out as
///
/// ```text
/// | skip region | SFrame header | ciphertext core | truncated HMAC tag |
/// ```
///
/// where the skip region travels in the clear and the header doubles as
/// the AEAD associated data. The ciphertext core of the GCM suites ends
/// with the native 16 byte GCM tag; the outer HMAC tag is appended for
/// every suite to keep one wire format across the deployment.
pub(crate) trait FrameCipher {
    /// Length of the truncated HMAC tag closing the frame.
    fn auth_tag_len(&self) -> usize;

    /// Protects `plaintext[skip..]`, copying `plaintext[..skip]` through
    /// in the clear.
    fn encrypt_frame(&self, header: &Header, plaintext: &[u8], skip: usize) -> Result<Bytes>;

    /// Verifies and strips the frame protection, copying the `skip`
    /// prefix through unchanged.
    fn decrypt_frame(&self, header: &Header, encrypted: &[u8], skip: usize) -> Result<Bytes>;
}

/// Builds the per-frame nonce: the wire counter bytes right-aligned into
/// a zeroed nonce, XORed with the suite salt.
pub(crate) fn frame_initialization_vector(
    raw_counter: &[u8],
    salt: &[u8; NONCE_LEN],
) -> Result<[u8; NONCE_LEN]> {
    if raw_counter.is_empty() || raw_counter.len() > NONCE_LEN {
        return Err(Error::InitializationVector(raw_counter.len()));
    }

    let mut iv = [0u8; NONCE_LEN];
    iv[NONCE_LEN - raw_counter.len()..].copy_from_slice(raw_counter);
    for (i, v) in iv.iter_mut().enumerate() {
        *v ^= salt[i];
    }

    Ok(iv)
}

/// State shared by both cipher families: the nonce salt and the outer
/// HMAC-SHA-256 signer, which stays HMAC-SHA-256 whatever hash the suite
/// uses for key derivation.
pub(crate) struct CipherInner {
    variant: CipherSuiteVariant,
    salt: [u8; NONCE_LEN],
    auth: HmacSha256,
}

impl CipherInner {
    pub(crate) fn new(
        variant: CipherSuiteVariant,
        salt: [u8; NONCE_LEN],
        auth_key: &[u8],
    ) -> Result<Self> {
        let auth =
            HmacSha256::new_from_slice(auth_key).map_err(|e| Error::Unknown(e.to_string()))?;

        Ok(CipherInner {
            variant,
            salt,
            auth,
        })
    }

    pub(crate) fn auth_tag_len(&self) -> usize {
        self.variant.auth_tag_len()
    }

    pub(crate) fn salt(&self) -> &[u8; NONCE_LEN] {
        &self.salt
    }

    /// HMAC over the header and ciphertext core; the wire carries the
    /// leading `auth_tag_len` bytes.
    fn generate_auth_tag(&self, buf: &[u8]) -> [u8; 32] {
        let mut signer = self.auth.clone();
        signer.update(buf);
        signer.finalize().into_bytes().into()
    }

    pub(crate) fn append_auth_tag(&self, writer: &mut Vec<u8>, authenticated_offset: usize) {
        let auth_tag = self.generate_auth_tag(&writer[authenticated_offset..]);
        writer.extend_from_slice(&auth_tag[..self.auth_tag_len()]);
    }

    /// Constant-time comparison against the expected truncated tag to
    /// avoid timing oracles.
    pub(crate) fn verify_auth_tag(&self, authenticated: &[u8], actual_tag: &[u8]) -> Result<()> {
        let expected_tag = &self.generate_auth_tag(authenticated)[..self.auth_tag_len()];

        if actual_tag.ct_eq(expected_tag).unwrap_u8() != 1 {
            return Err(Error::AuthenticationError);
        }

        Ok(())
    }
}
