//! Encoding consumed by the on-chain ecrecover verifier
//!
//! The contract takes `abi.encode(bytes32 px, bytes32 e, bytes32 s, uint8 v)`
//! where `px` is the x-coordinate of the (combined) key and `v` its parity as
//! 27/28.

use crate::aggregate::{combine_public_keys, sum_signatures};
use crate::types::Bytes32;
use crate::{Error, PublicKey, Result, Signature, SignatureOutput};
use serde::{Deserialize, Serialize};

/// Length of the ABI-encoded tuple
pub const ABI_ENCODED_LEN: usize = 128;

/// `0x`-prefixed low 20 bytes of a key's x-coordinate
pub fn schnorr_address(public_key: &PublicKey) -> String {
    let x = public_key.x_coordinate();
    format!("0x{}", hex::encode(&x[12..]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcrecoverSignature {
    #[serde(with = "hex::serde")]
    pub px: Bytes32,
    #[serde(with = "hex::serde")]
    pub challenge: Bytes32,
    pub signature: Signature,
    pub parity: u8,
}

impl EcrecoverSignature {
    /// Single-signer tuple
    pub fn new(public_key: &PublicKey, output: &SignatureOutput) -> Self {
        Self {
            px: public_key.x_coordinate(),
            challenge: output.challenge,
            signature: output.signature,
            parity: public_key.parity(),
        }
    }

    /// Aggregate tuple for a group: partial signatures are summed and the
    /// challenge is taken from the first output (all signers share it).
    pub fn aggregate(public_keys: &[PublicKey], outputs: &[SignatureOutput]) -> Result<Self> {
        let combined = combine_public_keys(public_keys)?;
        let signatures: Vec<Signature> = outputs.iter().map(|o| o.signature).collect();
        let signature = sum_signatures(&signatures)?;
        let challenge = outputs
            .first()
            .map(|o| o.challenge)
            .ok_or(Error::InsufficientSignatures)?;

        Ok(Self {
            px: combined.x_coordinate(),
            challenge,
            signature,
            parity: combined.parity(),
        })
    }

    /// `abi.encode(bytes32, bytes32, bytes32, uint8)`
    pub fn abi_encode(&self) -> [u8; ABI_ENCODED_LEN] {
        let mut out = [0u8; ABI_ENCODED_LEN];
        out[..32].copy_from_slice(&self.px);
        out[32..64].copy_from_slice(&self.challenge);
        out[64..96].copy_from_slice(self.signature.as_bytes());
        out[127] = self.parity;
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.abi_encode()))
    }
}
