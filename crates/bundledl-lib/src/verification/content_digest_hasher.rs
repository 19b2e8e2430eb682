use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Verification failed: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    VerificationFailed { expected: Vec<u8>, actual: Vec<u8> },
}

/// Expected content digest of a variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Checksum {
    Sha1(Vec<u8>),
    Md5(Vec<u8>),
}

impl Checksum {
    /// Picks SHA-1 when present and well-formed, MD5 otherwise.
    pub fn preferred(sha1: Option<&str>, md5: Option<&str>) -> Option<Self> {
        let decode = |algorithm: &str, hex_digest: &str| match hex::decode(hex_digest.trim()) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(algorithm, digest = hex_digest, "Ignoring malformed digest: {}", e);
                None
            }
        };

        sha1.and_then(|value| decode("sha1", value))
            .map(Self::Sha1)
            .or_else(|| md5.and_then(|value| decode("md5", value)).map(Self::Md5))
    }

    pub fn digest_hex(&self) -> String {
        match self {
            Self::Sha1(bytes) | Self::Md5(bytes) => hex::encode(bytes),
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Sha1(_) => "sha1",
            Self::Md5(_) => "md5",
        }
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm(), self.digest_hex())
    }
}

enum ContentDigestHasher {
    Sha1(Sha1),
    Md5(Md5),
}

pub struct ContentDigestVerifier {
    hasher: ContentDigestHasher,
    expected_digest: Vec<u8>,
}

impl ContentDigestVerifier {
    #[inline]
    pub fn new(checksum: Checksum) -> Self {
        match checksum {
            Checksum::Md5(expected_digest) => Self {
                hasher: ContentDigestHasher::Md5(Md5::new()),
                expected_digest,
            },
            Checksum::Sha1(expected_digest) => Self {
                hasher: ContentDigestHasher::Sha1(Sha1::new()),
                expected_digest,
            },
        }
    }

    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        match &mut self.hasher {
            ContentDigestHasher::Sha1(digest) => Digest::update(digest, data.as_ref()),
            ContentDigestHasher::Md5(digest) => Digest::update(digest, data.as_ref()),
        };
    }

    pub fn verify(self) -> Result<(), VerificationError> {
        let actual_digest = match self.hasher {
            ContentDigestHasher::Sha1(digest) => digest.finalize().to_vec(),
            ContentDigestHasher::Md5(digest) => digest.finalize().to_vec(),
        };

        if actual_digest == self.expected_digest {
            Ok(())
        } else {
            Err(VerificationError::VerificationFailed {
                expected: self.expected_digest,
                actual: actual_digest,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    #[test]
    fn test_preferred_checksum_picks_sha1_first() {
        let checksum = Checksum::preferred(Some(HELLO_SHA1), Some(HELLO_MD5)).unwrap();
        assert_eq!(checksum.algorithm(), "sha1");
        assert_eq!(checksum.digest_hex(), HELLO_SHA1);
    }

    #[test]
    fn test_preferred_checksum_falls_back_to_md5() {
        let checksum = Checksum::preferred(None, Some(HELLO_MD5)).unwrap();
        assert_eq!(checksum, Checksum::Md5(hex::decode(HELLO_MD5).unwrap()));

        let checksum = Checksum::preferred(Some("not-hex"), Some(HELLO_MD5)).unwrap();
        assert_eq!(checksum.algorithm(), "md5");
    }

    #[test]
    fn test_preferred_checksum_absent() {
        assert_eq!(Checksum::preferred(None, None), None);
        assert_eq!(Checksum::preferred(Some(""), Some("zz")), None);
    }

    #[test]
    fn test_verifier_accepts_matching_content() {
        let mut verifier = ContentDigestVerifier::new(Checksum::preferred(Some(HELLO_SHA1), None).unwrap());
        verifier.update(b"hel");
        verifier.update(b"lo");
        assert!(verifier.verify().is_ok());

        let mut verifier = ContentDigestVerifier::new(Checksum::preferred(None, Some(HELLO_MD5)).unwrap());
        verifier.update(b"hello");
        assert!(verifier.verify().is_ok());
    }

    #[test]
    fn test_verifier_rejects_other_content() {
        let mut verifier = ContentDigestVerifier::new(Checksum::preferred(Some(HELLO_SHA1), None).unwrap());
        verifier.update(b"goodbye");
        let err = verifier.verify().unwrap_err();
        assert!(err.to_string().contains(HELLO_SHA1));
    }
}
