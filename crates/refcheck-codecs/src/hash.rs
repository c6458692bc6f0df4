//! Hash references.
//!
//! ```text
//! file contents = hex(DIGEST(canonical_bytes(value))) + "\n"
//! ```
//!
//! The comparable form is the digest itself, so a mismatch never needs the
//! original value.

use sha2::{Digest as _, Sha256};

use refcheck_core::{
    ActualValue, Codec, CodecError, Comparable, Digest, DigestAlgorithm, EncodeOptions,
};

use crate::canonical::canonical_bytes;

/// Digest of the canonical serialization of `value`.
///
/// # Example
/// ```
/// use refcheck_codecs::hash::canonical_digest;
/// use refcheck_core::{ActualValue, DigestAlgorithm};
///
/// let a = canonical_digest(&serde_json::json!({"a": 1, "b": 2}).into(), DigestAlgorithm::Blake3);
/// let b = canonical_digest(&serde_json::json!({"b": 2, "a": 1}).into(), DigestAlgorithm::Blake3);
/// assert_eq!(a, b);
/// ```
pub fn canonical_digest(value: &ActualValue, algorithm: DigestAlgorithm) -> Digest {
    digest_bytes(&canonical_bytes(value), algorithm)
}

/// Digest of raw bytes.
pub fn digest_bytes(data: &[u8], algorithm: DigestAlgorithm) -> Digest {
    let bytes = match algorithm {
        DigestAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
    };
    Digest::new(algorithm, bytes)
}

/// Stores the hex digest of a value's canonical serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCodec {
    algorithm: DigestAlgorithm,
}

impl HashCodec {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn sha256() -> Self {
        Self::new(DigestAlgorithm::Sha256)
    }

    pub fn blake3() -> Self {
        Self::new(DigestAlgorithm::Blake3)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl Codec for HashCodec {
    fn name(&self) -> &'static str {
        match self.algorithm {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    fn encode(&self, value: &ActualValue, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        let digest = canonical_digest(value, self.algorithm);
        Ok(format!("{}\n", digest.to_hex()).into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::Corrupt("hash file is not UTF-8".to_string()))?;
        let hex_digest = text.trim();
        let expected_len = self.algorithm.digest_len() * 2;
        if hex_digest.len() != expected_len {
            return Err(CodecError::Corrupt(format!(
                "expected a {}-character {} digest, found {} characters",
                expected_len,
                self.algorithm,
                hex_digest.len()
            )));
        }
        let digest = hex::decode(hex_digest)
            .map_err(|e| CodecError::Corrupt(format!("invalid hex digest: {}", e)))?;
        Ok(Comparable::Digest(Digest::new(self.algorithm, digest)))
    }
}
