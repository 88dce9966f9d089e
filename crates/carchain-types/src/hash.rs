use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Sentinel stored in place of a predecessor hash by the genesis block.
pub const GENESIS_SENTINEL: &str = "0";

/// Fingerprint of a block.
///
/// A `BlockHash` is the BLAKE3 digest of a block's canonical field encoding.
/// It is written to JSON as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Create a `BlockHash` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.short_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hash = Self::from_hex(&s).map_err(serde::de::Error::custom)?;
        if hash.to_hex() != s {
            return Err(serde::de::Error::custom(TypeError::NonCanonicalHex(s)));
        }
        Ok(hash)
    }
}

/// Reference from a block to its predecessor.
///
/// Only the genesis block carries [`PrevHash::Genesis`]; it is persisted as
/// the `"0"` sentinel, which is not a digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrevHash {
    Genesis,
    Block(BlockHash),
}

impl PrevHash {
    /// Returns `true` for the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }

    /// The predecessor digest, if this is not the genesis sentinel.
    pub fn block_hash(&self) -> Option<BlockHash> {
        match self {
            Self::Genesis => None,
            Self::Block(hash) => Some(*hash),
        }
    }

    /// Canonical string form: `"0"` or the predecessor's hex digest.
    pub fn to_canonical(&self) -> String {
        match self {
            Self::Genesis => GENESIS_SENTINEL.to_string(),
            Self::Block(hash) => hash.to_hex(),
        }
    }
}

impl From<BlockHash> for PrevHash {
    fn from(hash: BlockHash) -> Self {
        Self::Block(hash)
    }
}

impl fmt::Display for PrevHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl FromStr for PrevHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == GENESIS_SENTINEL {
            Ok(Self::Genesis)
        } else {
            BlockHash::from_hex(s).map(Self::Block)
        }
    }
}

impl Serialize for PrevHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for PrevHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let prev: Self = s.parse().map_err(serde::de::Error::custom)?;
        if prev.to_canonical() != s {
            return Err(serde::de::Error::custom(TypeError::NonCanonicalHex(s)));
        }
        Ok(prev)
    }
}
