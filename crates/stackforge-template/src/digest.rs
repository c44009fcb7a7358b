use sha2::Digest as _;

/// Algorithms this crate can compute; templates may be restricted to a subset.
pub const SUPPORTED_ALGORITHMS: &[&str] =
    &["md5", "sha1", "sha224", "sha256", "sha384", "sha512", "blake3"];

/// Lowercase hex digest of `value`, or `None` for an algorithm this crate cannot
/// compute.
pub fn hex_digest(algorithm: &str, value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let hex = match algorithm {
        "md5" => hex::encode(md5::Md5::digest(bytes)),
        "sha1" => hex::encode(sha1::Sha1::digest(bytes)),
        "sha224" => hex::encode(sha2::Sha224::digest(bytes)),
        "sha256" => hex::encode(sha2::Sha256::digest(bytes)),
        "sha384" => hex::encode(sha2::Sha384::digest(bytes)),
        "sha512" => hex::encode(sha2::Sha512::digest(bytes)),
        "blake3" => blake3::hash(bytes).to_hex().to_string(),
        _ => return None,
    };
    Some(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_abc() {
        assert_eq!(
            hex_digest("sha256", "abc").unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn legacy_digests_of_abc() {
        assert_eq!(
            hex_digest("md5", "abc").unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hex_digest("sha1", "abc").unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(hex_digest("sha224", "x").unwrap().len(), 56);
        assert_eq!(hex_digest("sha384", "x").unwrap().len(), 96);
        assert_eq!(hex_digest("sha512", "x").unwrap().len(), 128);
        assert_eq!(hex_digest("blake3", "x").unwrap().len(), 64);
    }

    #[test]
    fn unknown_algorithm_is_none() {
        assert!(hex_digest("md4", "abc").is_none());
    }
}
