//! Key-holding signer and group provider producing on-chain signatures

use crate::aggregate::combine_public_keys;
use crate::hash::hash_message;
use crate::nonce::PublicNonces;
use crate::onchain::{schnorr_address, EcrecoverSignature};
use crate::schnorrkel::Schnorrkel;
use crate::types::Bytes32;
use crate::{sign, PrivateKey, PublicKey, Result, SignatureOutput};
use std::fmt;

/// A single party: its private key plus a [`Schnorrkel`] for the one
/// multi-signing session it can have in flight.
pub struct SchnorrSigner {
    private_key: PrivateKey,
    public_key: PublicKey,
    schnorrkel: Schnorrkel,
}

impl SchnorrSigner {
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
            schnorrkel: Schnorrkel::new(),
        }
    }

    /// Build from a hex private key, with or without a `0x` prefix
    pub fn from_hex(private_key_hex: &str) -> Result<Self> {
        let stripped = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        Ok(Self::new(PrivateKey::from_hex(stripped)?))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn schnorr_address(&self) -> String {
        schnorr_address(&self.public_key)
    }

    /// Nonces to hand to co-signers. Repeated calls return the same pair
    /// until a multi-signature consumes it.
    pub fn public_nonces(&self) -> Result<PublicNonces> {
        self.schnorrkel.generate_or_get_public_nonces()
    }

    pub fn has_nonces(&self) -> bool {
        self.schnorrkel.has_nonces()
    }

    pub fn sign(&self, hash: &Bytes32) -> Result<SignatureOutput> {
        sign::sign(&self.private_key, hash)
    }

    pub fn sign_message(&self, message: &str) -> Result<SignatureOutput> {
        self.sign(&hash_message(message))
    }

    pub fn multi_sign(
        &self,
        hash: &Bytes32,
        public_keys: &[PublicKey],
        public_nonces: &[PublicNonces],
    ) -> Result<SignatureOutput> {
        self.schnorrkel
            .multi_sig_sign(&self.private_key, hash, public_keys, public_nonces)
    }

    /// On-chain tuple for a single-signer output of this key
    pub fn ecrecover_signature(&self, output: &SignatureOutput) -> EcrecoverSignature {
        EcrecoverSignature::new(&self.public_key, output)
    }
}

impl fmt::Debug for SchnorrSigner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SchnorrSigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// The public side of a signing group
#[derive(Debug, Clone, Default)]
pub struct SchnorrMultisigProvider {
    public_keys: Vec<PublicKey>,
}

impl SchnorrMultisigProvider {
    pub fn new(public_keys: Vec<PublicKey>) -> Self {
        Self { public_keys }
    }

    pub fn add_public_key(&mut self, public_key: PublicKey) {
        self.public_keys.push(public_key);
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn combined_public_key(&self) -> Result<PublicKey> {
        combine_public_keys(&self.public_keys)
    }

    pub fn schnorr_address(&self) -> Result<String> {
        Ok(schnorr_address(&self.combined_public_key()?))
    }

    /// Sum the members' partial outputs into the group's on-chain tuple
    pub fn ecrecover_signature(&self, outputs: &[SignatureOutput]) -> Result<EcrecoverSignature> {
        EcrecoverSignature::aggregate(&self.public_keys, outputs)
    }
}
