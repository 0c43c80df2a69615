//! Core types shared by the signing and aggregation modules

use crate::curve;
use crate::{Error, PublicKey, Result};
use k256::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte digest (message hash or challenge)
pub type Bytes32 = [u8; 32];

/// Identifier under which a signer keeps its in-flight nonce pair
pub type SessionId = String;

/// A Schnorr signature scalar `s`, always below the group order
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    bytes: Bytes32,
}

impl Signature {
    /// Parse 32 big-endian bytes; values `>= n` are rejected
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: Bytes32 = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!("expected 32 byte signature, got {}", bytes.len()))
        })?;
        if curve::reduce_bytes(&bytes).to_bytes().as_slice() != bytes.as_slice() {
            return Err(Error::InvalidEncoding(
                "signature is not below the curve order".into(),
            ));
        }
        Ok(Self { bytes })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub(crate) fn from_scalar(scalar: &Scalar) -> Self {
        Self {
            bytes: curve::scalar_to_bytes(scalar),
        }
    }

    pub(crate) fn scalar(&self) -> Scalar {
        curve::reduce_bytes(&self.bytes)
    }

    pub fn as_bytes(&self) -> &Bytes32 {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl TryFrom<String> for Signature {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.to_hex()
    }
}

/// Everything needed to verify a (partial) signature or aggregate it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureOutput {
    /// Final public nonce `R` (compressed)
    pub final_public_nonce: PublicKey,
    /// Challenge `e` as returned by the hash, before reduction
    #[serde(with = "hex::serde")]
    pub challenge: Bytes32,
    /// Signature scalar `s`
    pub signature: Signature,
}
