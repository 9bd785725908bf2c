//! Artifact integrity verification

use sha2::{Digest, Sha512};

use crate::error::IntegrityError;
use crate::manifest::ArtifactDescriptor;

/// Lowercase hex SHA-512 of `bytes`
pub fn sha512_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha512::digest(bytes))
}

/// Check `bytes` against the manifest's size, then its digest
///
/// The digest is compared exactly as published; the release system
/// writes lowercase hex.
pub fn verify(bytes: &[u8], descriptor: &ArtifactDescriptor) -> Result<(), IntegrityError> {
    let actual_size = bytes.len() as u64;
    if actual_size != descriptor.size {
        return Err(IntegrityError::SizeMismatch {
            expected: descriptor.size,
            actual: actual_size,
        });
    }

    let actual_digest = sha512_hex(bytes);
    if actual_digest != descriptor.digest {
        return Err(IntegrityError::DigestMismatch {
            expected: descriptor.digest.clone(),
            actual: actual_digest,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_for(bytes: &[u8]) -> ArtifactDescriptor {
        ArtifactDescriptor {
            size: bytes.len() as u64,
            digest: sha512_hex(bytes),
        }
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha512_hex(b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_matching_artifact_verifies() {
        let bytes = vec![7u8; 1024];
        assert_eq!(verify(&bytes, &descriptor_for(&bytes)), Ok(()));
    }

    #[test]
    fn test_size_mismatch() {
        let bytes = vec![7u8; 1020];
        let mut descriptor = descriptor_for(&bytes);
        descriptor.size = 1024;

        assert_eq!(
            verify(&bytes, &descriptor),
            Err(IntegrityError::SizeMismatch {
                expected: 1024,
                actual: 1020
            })
        );
    }

    #[test]
    fn test_single_flipped_byte_fails_digest() {
        let bytes = vec![7u8; 1024];
        let descriptor = descriptor_for(&bytes);

        let mut tampered = bytes.clone();
        tampered[512] ^= 0x01;

        match verify(&tampered, &descriptor) {
            Err(IntegrityError::DigestMismatch { expected, actual }) => {
                assert_eq!(expected, descriptor.digest);
                assert_eq!(actual, sha512_hex(&tampered));
            }
            other => panic!("expected digest mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_size_checked_before_digest() {
        let descriptor = ArtifactDescriptor {
            size: 4,
            digest: "not-a-digest".into(),
        };
        assert!(matches!(
            verify(b"abc", &descriptor),
            Err(IntegrityError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_uppercase_digest_is_rejected() {
        let bytes = b"dhcli".to_vec();
        let mut descriptor = descriptor_for(&bytes);
        descriptor.digest = descriptor.digest.to_uppercase();
        assert!(verify(&bytes, &descriptor).is_err());
    }

    #[test]
    fn test_verify_is_deterministic() {
        let bytes = vec![1u8, 2, 3];
        let descriptor = descriptor_for(&bytes);
        assert_eq!(verify(&bytes, &descriptor), verify(&bytes, &descriptor));
        assert_eq!(bytes, vec![1u8, 2, 3]);
    }
}
