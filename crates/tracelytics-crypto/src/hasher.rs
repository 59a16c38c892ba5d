use sha2::{Digest, Sha256};
use tracelytics_types::Checksum;

/// Derive the secondary index for a natural identifier.
///
/// Plain sha256 over the UTF-8 bytes, no domain tag, so the digest matches
/// what any external sha256 implementation computes for the same string.
pub fn checksum(identifier: &str) -> Checksum {
    checksum_bytes(identifier.as_bytes())
}

/// sha256 over raw bytes.
pub fn checksum_bytes(data: &[u8]) -> Checksum {
    let digest: [u8; 32] = Sha256::digest(data).into();
    Checksum::from_hash(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            checksum("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            checksum("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn cargo_identifiers() {
        assert_eq!(
            checksum("PRODUCT-1").to_hex(),
            "bae02da828e9f38bfc1b97cd6188b861bdc6d5d2f3ee123be91c32d1930524ea"
        );
        assert_eq!(
            checksum("PRODUCT NAME").to_hex(),
            "cf169cabe865f2c99cc40cebf109c276836d7a7793b226949245519ea8040542"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(checksum("CHE-1"), checksum("CHE-1"));
        assert_ne!(checksum("CHE-1"), checksum("CHE-2"));
    }

    #[test]
    fn string_and_bytes_agree() {
        assert_eq!(checksum("MACH-1"), checksum_bytes(b"MACH-1"));
    }
}
