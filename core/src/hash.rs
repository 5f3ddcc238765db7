use std::{fmt::Display, str::FromStr};

use arrayvec::ArrayVec;
use digest::Digest as _;
use md4::Md4;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use crate::{
    error::{ChainbreakError, ChainbreakResult},
    Digest, MAX_PASSWORD_LENGTH_ALLOWED,
};

/// All the supported hash functions.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Ntlm,
    Md4,
    Md5,
    Sha1,
    Sha2_224,
    Sha2_256,
    Sha2_384,
    Sha2_512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl HashFunction {
    /// Every supported hash function.
    pub const ALL: [HashFunction; 12] = [
        Self::Ntlm,
        Self::Md4,
        Self::Md5,
        Self::Sha1,
        Self::Sha2_224,
        Self::Sha2_256,
        Self::Sha2_384,
        Self::Sha2_512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
    ];

    /// Returns the size of a digest, in bytes.
    pub const fn digest_size(&self) -> usize {
        match self {
            Self::Ntlm | Self::Md4 | Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha2_224 | Self::Sha3_224 => 28,
            Self::Sha2_256 | Self::Sha3_256 => 32,
            Self::Sha2_384 | Self::Sha3_384 => 48,
            Self::Sha2_512 | Self::Sha3_512 => 64,
        }
    }

    /// Returns the length of a digest written in hexadecimal.
    pub const fn hex_len(&self) -> usize {
        self.digest_size() * 2
    }

    /// Returns the canonical lowercase name of the hash function.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ntlm => "ntlm",
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha2_224 => "sha224",
            Self::Sha2_256 => "sha256",
            Self::Sha2_384 => "sha384",
            Self::Sha2_512 => "sha512",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
        }
    }

    /// Hashes a plaintext.
    #[inline]
    pub fn digest(&self, plaintext: &[u8]) -> Digest {
        match self {
            Self::Ntlm => ntlm(plaintext),
            Self::Md4 => Md4::digest(plaintext).into_iter().collect(),
            Self::Md5 => Md5::digest(plaintext).into_iter().collect(),
            Self::Sha1 => Sha1::digest(plaintext).into_iter().collect(),
            Self::Sha2_224 => Sha224::digest(plaintext).into_iter().collect(),
            Self::Sha2_256 => Sha256::digest(plaintext).into_iter().collect(),
            Self::Sha2_384 => Sha384::digest(plaintext).into_iter().collect(),
            Self::Sha2_512 => Sha512::digest(plaintext).into_iter().collect(),
            Self::Sha3_224 => Sha3_224::digest(plaintext).into_iter().collect(),
            Self::Sha3_256 => Sha3_256::digest(plaintext).into_iter().collect(),
            Self::Sha3_384 => Sha3_384::digest(plaintext).into_iter().collect(),
            Self::Sha3_512 => Sha3_512::digest(plaintext).into_iter().collect(),
        }
    }

    /// Hashes a plaintext and returns the digest in lowercase hexadecimal.
    pub fn hex_digest(&self, plaintext: &[u8]) -> String {
        hex::encode(self.digest(plaintext))
    }

    /// Parses an hexadecimal digest produced by this hash function.
    /// The length is checked before decoding, so that a digest from another algorithm
    /// is rejected even if it is valid hexadecimal.
    pub fn parse_digest(&self, hex_digest: &str) -> ChainbreakResult<Digest> {
        let hex_digest = hex_digest.trim();

        if hex_digest.len() != self.hex_len() {
            return Err(ChainbreakError::DigestLength {
                hash_function: *self,
                expected: self.hex_len(),
                actual: hex_digest.len(),
            });
        }

        Ok(hex::decode(hex_digest)?.into_iter().collect())
    }
}

impl Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashFunction {
    type Err = ChainbreakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowercase = s.trim().to_ascii_lowercase();

        let hash_function = match lowercase.as_str() {
            "ntlm" => Self::Ntlm,
            "md4" => Self::Md4,
            "md5" => Self::Md5,
            "sha1" | "sha-1" => Self::Sha1,
            "sha224" | "sha2-224" => Self::Sha2_224,
            "sha256" | "sha2-256" => Self::Sha2_256,
            "sha384" | "sha2-384" => Self::Sha2_384,
            "sha512" | "sha2-512" => Self::Sha2_512,
            "sha3-224" => Self::Sha3_224,
            "sha3-256" => Self::Sha3_256,
            "sha3-384" => Self::Sha3_384,
            "sha3-512" => Self::Sha3_512,
            _ => return Err(ChainbreakError::UnknownHashFunction(s.to_owned())),
        };

        Ok(hash_function)
    }
}

/// MD4 of the UTF-16LE encoded plaintext.
/// Table plaintexts are short ASCII strings and are encoded on the stack; anything else is
/// decoded as UTF-8 (invalid sequences becoming U+FFFD) and hashed whole.
#[inline]
fn ntlm(plaintext: &[u8]) -> Digest {
    if plaintext.len() <= MAX_PASSWORD_LENGTH_ALLOWED && plaintext.is_ascii() {
        let mut buf = ArrayVec::<u8, { MAX_PASSWORD_LENGTH_ALLOWED * 2 }>::new();
        for &c in plaintext {
            buf.push(c);
            buf.push(0);
        }

        return Md4::digest(&buf).into_iter().collect();
    }

    let utf16: Vec<u8> = String::from_utf8_lossy(plaintext)
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();

    Md4::digest(&utf16).into_iter().collect()
}
