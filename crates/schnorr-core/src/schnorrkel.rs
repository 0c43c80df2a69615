//! Stateful signer front-ends over the nonce store
//!
//! [`Schnorrkel`] keeps exactly one signing session per instance, keyed by a
//! random id drawn at construction. [`UnsafeSchnorrkel`] lets the caller
//! choose session ids and persist the store, which is what allows nonces to
//! outlive the process (and is why it is the unsafe one: a restored store
//! must never be used alongside the copy it was exported from).

use crate::hash::MessageDigest;
use crate::nonce::{NonceStore, PublicNonces};
use crate::types::{Bytes32, SessionId};
use crate::{aggregate, sign, PrivateKey, PublicKey, Result, Signature, SignatureOutput};

pub struct Schnorrkel {
    nonces: NonceStore,
    nonce_id: SessionId,
}

impl Default for Schnorrkel {
    fn default() -> Self {
        Self::new()
    }
}

impl Schnorrkel {
    pub fn new() -> Self {
        let nonce_id: [u8; 32] = rand::random();
        Self {
            nonces: NonceStore::new(),
            nonce_id: hex::encode(nonce_id),
        }
    }

    /// Always generates a new pair, discarding an unused one
    pub fn generate_public_nonces(&self) -> Result<PublicNonces> {
        self.nonces.generate_public_nonces(&self.nonce_id)
    }

    /// Fails with `NoncesNotSet` until nonces have been generated
    pub fn get_public_nonces(&self) -> Result<PublicNonces> {
        self.nonces.get_public_nonces(&self.nonce_id)
    }

    pub fn has_nonces(&self) -> bool {
        self.nonces.has_nonces(&self.nonce_id)
    }

    /// The pending nonces if there are any, otherwise fresh ones
    pub fn generate_or_get_public_nonces(&self) -> Result<PublicNonces> {
        self.nonces.generate_or_get_public_nonces(&self.nonce_id)
    }

    /// Partial signature for the session; consumes this instance's nonces
    pub fn multi_sig_sign(
        &self,
        private_key: &PrivateKey,
        hash: &Bytes32,
        public_keys: &[PublicKey],
        public_nonces: &[PublicNonces],
    ) -> Result<SignatureOutput> {
        sign::multi_sig_sign(
            &self.nonces,
            &self.nonce_id,
            private_key,
            hash,
            public_keys,
            public_nonces,
        )
    }

    pub fn multi_sig_sign_message<D: MessageDigest + ?Sized>(
        &self,
        private_key: &PrivateKey,
        message: &str,
        digest: &D,
        public_keys: &[PublicKey],
        public_nonces: &[PublicNonces],
    ) -> Result<SignatureOutput> {
        sign::multi_sig_sign_message(
            &self.nonces,
            &self.nonce_id,
            private_key,
            message,
            digest,
            public_keys,
            public_nonces,
        )
    }

    pub fn combined_public_key(public_keys: &[PublicKey]) -> Result<PublicKey> {
        aggregate::combine_public_keys(public_keys)
    }

    pub fn combined_address(public_keys: &[PublicKey]) -> Result<String> {
        aggregate::combined_address(public_keys)
    }

    pub fn sign(private_key: &PrivateKey, hash: &Bytes32) -> Result<SignatureOutput> {
        sign::sign(private_key, hash)
    }

    pub fn sum_signatures(signatures: &[Signature]) -> Result<Signature> {
        aggregate::sum_signatures(signatures)
    }

    pub fn verify(
        signature: &Signature,
        hash: &Bytes32,
        final_public_nonce: &PublicKey,
        public_key: &PublicKey,
    ) -> bool {
        aggregate::verify(signature, hash, final_public_nonce, public_key)
    }
}

/// Session-keyed signer whose nonce store can be exported and restored
#[derive(Default)]
pub struct UnsafeSchnorrkel {
    nonces: NonceStore,
}

impl UnsafeSchnorrkel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_public_nonces(&self, session_id: &str) -> Result<PublicNonces> {
        self.nonces.generate_public_nonces(session_id)
    }

    pub fn get_public_nonces(&self, session_id: &str) -> Result<PublicNonces> {
        self.nonces.get_public_nonces(session_id)
    }

    pub fn has_nonces(&self, session_id: &str) -> bool {
        self.nonces.has_nonces(session_id)
    }

    pub fn multi_sig_sign(
        &self,
        session_id: &str,
        private_key: &PrivateKey,
        hash: &Bytes32,
        public_keys: &[PublicKey],
        public_nonces: &[PublicNonces],
    ) -> Result<SignatureOutput> {
        sign::multi_sig_sign(
            &self.nonces,
            session_id,
            private_key,
            hash,
            public_keys,
            public_nonces,
        )
    }

    pub fn to_json(&self) -> Result<String> {
        self.nonces.to_json()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            nonces: NonceStore::from_json(json)?,
        })
    }
}
