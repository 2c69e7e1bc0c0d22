use super::*;

#[test]
fn test_variant_parameters() {
    let cases = [
        (CipherSuiteVariant::AesCm128HmacSha256_4, 16, 4),
        (CipherSuiteVariant::AesCm128HmacSha256_8, 16, 8),
        (CipherSuiteVariant::AesGcm128Sha256, 16, 8),
        (CipherSuiteVariant::AesGcm256Sha512, 32, 16),
    ];

    for (variant, key_len, auth_tag_len) in cases {
        assert_eq!(variant.key_len(), key_len, "{variant:?}");
        assert_eq!(variant.nonce_len(), 12, "{variant:?}");
        assert_eq!(variant.auth_tag_len(), auth_tag_len, "{variant:?}");
    }
}

#[test]
fn test_default_variant() {
    assert_eq!(
        CipherSuiteVariant::default(),
        CipherSuiteVariant::AesGcm256Sha512
    );
}

#[test]
fn test_key_schedule_known_answer() -> Result<()> {
    let key_material = hex::decode("303132333435363738393a3b3c3d3e3f").unwrap();
    let suite = CipherSuite::derive(CipherSuiteVariant::AesGcm128Sha256, &key_material)?;

    assert_eq!(
        hex::encode(suite.derive_encryption_key_bits(128)?),
        "2ea2e8163ff56c0613e6fa9f20a213da"
    );
    assert_eq!(
        hex::encode(suite.derive_salt_bits(96)?),
        "a80478b3f6fba19983d540d5"
    );

    Ok(())
}

#[test]
fn test_derivations_are_domain_separated() -> Result<()> {
    let suite = CipherSuite::derive(CipherSuiteVariant::AesGcm128Sha256, &[7u8; 16])?;

    assert_ne!(
        suite.derive_encryption_key_bits(96)?,
        suite.derive_salt_bits(96)?
    );

    Ok(())
}

#[test]
fn test_short_key_material() {
    assert_eq!(
        CipherSuite::derive(CipherSuiteVariant::AesCm128HmacSha256_8, &[0u8; 15]).err(),
        Some(Error::ShortKeyMaterial(15, 16))
    );
    assert_eq!(
        CipherSuite::derive(CipherSuiteVariant::AesGcm256Sha512, &[0u8; 16]).err(),
        Some(Error::ShortKeyMaterial(16, 32))
    );
}

#[test]
fn test_round_trip_all_variants() -> Result<()> {
    let variants = [
        CipherSuiteVariant::AesCm128HmacSha256_4,
        CipherSuiteVariant::AesCm128HmacSha256_8,
        CipherSuiteVariant::AesGcm128Sha256,
        CipherSuiteVariant::AesGcm256Sha512,
    ];

    for variant in variants {
        let suite = CipherSuite::derive(variant, &[0x42; 32])?;
        assert_eq!(suite.auth_tag_len(), variant.auth_tag_len());

        for skip in [0usize, 1, 4] {
            for payload_len in [0usize, 1, 13, 1024] {
                if payload_len < skip {
                    continue;
                }
                let plaintext: Vec<u8> = (0..payload_len).map(|i| i as u8).collect();
                let header = Header::new(3, 11);

                let encrypted = suite.encrypt_frame(&header, &plaintext, skip)?;
                assert_eq!(&encrypted[..skip], &plaintext[..skip], "{variant:?}");

                let decrypted = suite.decrypt_frame(&header, &encrypted, skip)?;
                assert_eq!(&decrypted[..], &plaintext[..], "{variant:?} len={payload_len}");
            }
        }
    }

    Ok(())
}

#[test]
fn test_distinct_material_yields_distinct_keys() -> Result<()> {
    let a = CipherSuite::derive(CipherSuiteVariant::AesGcm128Sha256, &[1u8; 16])?;
    let b = CipherSuite::derive(CipherSuiteVariant::AesGcm128Sha256, &[2u8; 16])?;

    assert_ne!(
        a.derive_encryption_key_bits(128)?,
        b.derive_encryption_key_bits(128)?
    );

    // The wrong suite already trips over the outer tag.
    let header = Header::new(0, 0);
    let encrypted = a.encrypt_frame(&header, b"frame", 0)?;
    assert_eq!(
        b.decrypt_frame(&header, &encrypted, 0),
        Err(Error::AuthenticationError)
    );

    Ok(())
}
