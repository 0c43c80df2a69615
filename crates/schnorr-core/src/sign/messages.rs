//! Relay message types

use crate::nonce::PublicNonces;
use crate::types::Bytes32;
use crate::{PublicKey, Signature, SignatureOutput};
use serde::{Deserialize, Serialize};

/// Round 1 message: public nonce commitments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceMessage {
    /// Sender public key
    pub public_key: PublicKey,
    pub public_nonces: PublicNonces,
}

/// Round 2 message: partial signature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialMessage {
    /// Sender public key
    pub public_key: PublicKey,
    pub final_public_nonce: PublicKey,
    #[serde(with = "hex::serde")]
    pub challenge: Bytes32,
    pub signature: Signature,
}

impl PartialMessage {
    pub fn new(public_key: PublicKey, output: &SignatureOutput) -> Self {
        Self {
            public_key,
            final_public_nonce: output.final_public_nonce,
            challenge: output.challenge,
            signature: output.signature,
        }
    }
}
