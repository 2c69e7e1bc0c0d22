use hmac::Mac;

use super::cipher_aead_aes_gcm::CipherAeadAesGcm;
use super::cipher_aes_cm_hmac_sha256::CipherAesCmHmacSha256;
use super::*;
use crate::cipher_suite::CipherSuiteVariant;

fn test_salt() -> [u8; NONCE_LEN] {
    let mut salt = [0u8; NONCE_LEN];
    salt.copy_from_slice(&hex::decode("42d662fbad5cd81eb3aad79a").unwrap());
    salt
}

#[test]
fn test_frame_initialization_vector() -> Result<()> {
    let salt = test_salt();

    let iv = frame_initialization_vector(&[0xaa], &salt)?;
    assert_eq!(&iv[..], &hex::decode("42d662fbad5cd81eb3aad730").unwrap()[..]);

    let counter = hex::decode("ffffffffffffff").unwrap();
    let iv = frame_initialization_vector(&counter, &salt)?;
    assert_eq!(&iv[..], &hex::decode("42d662fbada327e14c552865").unwrap()[..]);

    // A zero counter byte leaves the IV equal to the salt.
    let iv = frame_initialization_vector(&[0x00], &salt)?;
    assert_eq!(iv, salt);

    Ok(())
}

#[test]
fn test_frame_initialization_vector_rejects_bad_counter() {
    let salt = test_salt();

    assert_eq!(
        frame_initialization_vector(&[], &salt),
        Err(Error::InitializationVector(0))
    );
    assert_eq!(
        frame_initialization_vector(&[0u8; 13], &salt),
        Err(Error::InitializationVector(13))
    );
}

#[test]
fn test_distinct_counters_yield_distinct_ivs() -> Result<()> {
    let salt = test_salt();

    let mut ivs = Vec::new();
    for counter in 0u64..64 {
        let header = Header::new(3, counter);
        ivs.push(frame_initialization_vector(header.raw_counter(), &salt)?);
    }
    ivs.sort_unstable();
    ivs.dedup();
    assert_eq!(ivs.len(), 64);

    Ok(())
}

fn build_ctr_cipher() -> CipherAesCmHmacSha256 {
    CipherAesCmHmacSha256::new(
        CipherSuiteVariant::AesCm128HmacSha256_8,
        vec![0x0d; 16],
        test_salt(),
        &[0x1f; 16],
    )
    .unwrap()
}

fn build_gcm_cipher() -> CipherAeadAesGcm {
    CipherAeadAesGcm::new(
        CipherSuiteVariant::AesGcm128Sha256,
        &[0x0d; 16],
        test_salt(),
        &[0x1f; 16],
    )
    .unwrap()
}

#[test]
fn test_ctr_round_trip() -> Result<()> {
    let cipher = build_ctr_cipher();
    let header = Header::new(1, 7);
    let plaintext = b"\xca\xfethe quick brown fox";

    let encrypted = cipher.encrypt_frame(&header, plaintext, 2)?;
    assert_eq!(&encrypted[..2], &plaintext[..2]);
    assert_eq!(&encrypted[2..2 + header.len()], header.data());
    assert_eq!(encrypted.len(), plaintext.len() + header.len() + 8);
    assert_ne!(&encrypted[2 + header.len()..encrypted.len() - 8], &plaintext[2..]);

    let decrypted = cipher.decrypt_frame(&header, &encrypted, 2)?;
    assert_eq!(&decrypted[..], &plaintext[..]);

    Ok(())
}

#[test]
fn test_gcm_round_trip() -> Result<()> {
    let cipher = build_gcm_cipher();
    let header = Header::new(1, 7);
    let plaintext = b"\xca\xfethe quick brown fox";

    let encrypted = cipher.encrypt_frame(&header, plaintext, 2)?;
    assert_eq!(&encrypted[..2], &plaintext[..2]);
    // GCM keeps its native tag inside the ciphertext core.
    assert_eq!(
        encrypted.len(),
        plaintext.len() + header.len() + cipher_aead_aes_gcm::GCM_NATIVE_TAG_LEN + 8
    );

    let decrypted = cipher.decrypt_frame(&header, &encrypted, 2)?;
    assert_eq!(&decrypted[..], &plaintext[..]);

    Ok(())
}

#[test]
fn test_tampering_fails_authentication() -> Result<()> {
    let cipher = build_ctr_cipher();
    let header = Header::new(1, 7);
    let plaintext = b"media payload";

    let encrypted = cipher.encrypt_frame(&header, plaintext, 0)?;

    // Header, ciphertext and tag are all covered.
    for i in 0..encrypted.len() {
        let mut tampered = encrypted.to_vec();
        tampered[i] ^= 0x40;
        assert_eq!(
            cipher.decrypt_frame(&header, &tampered, 0),
            Err(Error::AuthenticationError),
            "flipping byte {i} went unnoticed"
        );
    }

    Ok(())
}

#[test]
fn test_truncated_frame() -> Result<()> {
    let cipher = build_ctr_cipher();
    let header = Header::new(1, 7);

    let encrypted = cipher.encrypt_frame(&header, b"x", 0)?;
    assert_eq!(
        cipher.decrypt_frame(&header, &encrypted[..header.len() + 8 - 1], 0),
        Err(Error::FrameTooShort(header.len() + 7, header.len() + 8))
    );

    Ok(())
}

#[test]
fn test_skip_longer_than_plaintext() {
    let cipher = build_ctr_cipher();
    let header = Header::new(1, 7);

    assert_eq!(
        cipher.encrypt_frame(&header, b"abc", 4),
        Err(Error::FrameTooShort(3, 4))
    );
}

#[test]
fn test_gcm_mismatch_behind_valid_outer_tag() -> Result<()> {
    let auth_key = [0x1f; 16];
    let cipher = CipherAeadAesGcm::new(
        CipherSuiteVariant::AesGcm128Sha256,
        &[0x0d; 16],
        test_salt(),
        &auth_key,
    )?;
    let header = Header::new(1, 7);

    let mut frame = cipher.encrypt_frame(&header, b"media payload", 0)?.to_vec();

    // Corrupt the GCM ciphertext, then re-sign the outer tag so only the
    // AEAD itself can catch the damage.
    let tag_offset = frame.len() - 8;
    frame[header.len() + 1] ^= 0x40;
    let mut signer = HmacSha256::new_from_slice(&auth_key).unwrap();
    signer.update(&frame[..tag_offset]);
    let outer_tag = signer.finalize().into_bytes();
    frame[tag_offset..].copy_from_slice(&outer_tag[..8]);

    assert_eq!(
        cipher.decrypt_frame(&header, &frame, 0),
        Err(Error::DecryptionFailure)
    );

    Ok(())
}
