//! Nonce pairs and the per-signer nonce store
//!
//! A nonce pair lives in the store from the nonce-exchange round until the
//! one signing call that consumes it. Signing twice with the same pair over
//! different messages reveals the private key, so the store hands a pair out
//! to exactly one successful signature and deletes it while still holding the
//! entry lock.

use crate::curve;
use crate::types::SessionId;
use crate::{Error, PublicKey, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use k256::{ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public half of a nonce pair; the only nonce data sent to co-signers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicNonces {
    pub k_public: PublicKey,
    pub k_two_public: PublicKey,
}

impl PublicNonces {
    /// Effective nonce `kPublic + b·kTwoPublic`
    pub fn effective(&self, b: &Scalar) -> ProjectivePoint {
        self.k_public.point() + self.k_two_public.point() * b
    }
}

/// Two secret nonces and their public commitments
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct NoncePair {
    k: [u8; 32],
    k_two: [u8; 32],
    #[zeroize(skip)]
    k_public: PublicKey,
    #[zeroize(skip)]
    k_two_public: PublicKey,
}

impl NoncePair {
    pub fn generate() -> Result<Self> {
        Self::generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let k = curve::random_scalar_bytes(rng)?;
        let k_two = curve::random_scalar_bytes(rng)?;
        Self::from_secret_bytes(*k, *k_two)
    }

    fn from_secret_bytes(k: [u8; 32], k_two: [u8; 32]) -> Result<Self> {
        let k_public = PublicKey::from_point(&curve::mul_base(&curve::scalar_from_bytes(&k)?))?;
        let k_two_public =
            PublicKey::from_point(&curve::mul_base(&curve::scalar_from_bytes(&k_two)?))?;
        Ok(Self {
            k,
            k_two,
            k_public,
            k_two_public,
        })
    }

    pub fn public_nonces(&self) -> PublicNonces {
        PublicNonces {
            k_public: self.k_public,
            k_two_public: self.k_two_public,
        }
    }

    pub(crate) fn k(&self) -> Scalar {
        curve::reduce_bytes(&self.k)
    }

    pub(crate) fn k_two(&self) -> Scalar {
        curve::reduce_bytes(&self.k_two)
    }

    fn to_json(&self) -> NonceJson {
        NonceJson {
            k: hex::encode(self.k),
            k_two: hex::encode(self.k_two),
            k_public: self.k_public.to_hex(),
            k_two_public: self.k_two_public.to_hex(),
        }
    }

    fn from_json(json: &NonceJson) -> Result<Self> {
        let k = decode_secret(&json.k)?;
        let k_two = decode_secret(&json.k_two)?;
        let pair = Self::from_secret_bytes(k, k_two)?;

        if pair.k_public != PublicKey::from_hex(&json.k_public)?
            || pair.k_two_public != PublicKey::from_hex(&json.k_two_public)?
        {
            return Err(Error::InvalidEncoding(
                "public nonce does not match its secret".into(),
            ));
        }
        Ok(pair)
    }
}

impl fmt::Debug for NoncePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NoncePair")
            .field("k_public", &self.k_public)
            .field("k_two_public", &self.k_two_public)
            .finish_non_exhaustive()
    }
}

fn decode_secret(hex_str: &str) -> Result<[u8; 32]> {
    let bytes = zeroize::Zeroizing::new(hex::decode(hex_str)?);
    let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        Error::InvalidEncoding(format!("expected 32 byte nonce, got {}", bytes.len()))
    })?;
    Ok(secret)
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NonceJson {
    k: String,
    k_two: String,
    k_public: String,
    k_two_public: String,
}

impl Drop for NonceJson {
    fn drop(&mut self) {
        self.k.zeroize();
        self.k_two.zeroize();
    }
}

#[derive(Serialize, Deserialize)]
struct StoreJson {
    nonces: BTreeMap<SessionId, NonceJson>,
}

/// Session id → nonce pair.
///
/// Not `Clone`: a copy would let one pair be spent twice.
#[derive(Default)]
pub struct NonceStore {
    nonces: DashMap<SessionId, NoncePair>,
}

impl NonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh pair for `session_id`, replacing any unused one
    pub fn generate_public_nonces(&self, session_id: &str) -> Result<PublicNonces> {
        self.generate_public_nonces_with_rng(session_id, &mut OsRng)
    }

    pub fn generate_public_nonces_with_rng<R: RngCore + CryptoRng>(
        &self,
        session_id: &str,
        rng: &mut R,
    ) -> Result<PublicNonces> {
        let pair = NoncePair::generate_with_rng(rng)?;
        let public = pair.public_nonces();
        if self.nonces.insert(session_id.to_owned(), pair).is_some() {
            debug!(session = session_id, "Replaced unused nonce pair");
        }
        Ok(public)
    }

    pub fn get_public_nonces(&self, session_id: &str) -> Result<PublicNonces> {
        self.nonces
            .get(session_id)
            .map(|pair| pair.public_nonces())
            .ok_or(Error::NoncesNotSet)
    }

    /// Return the pending public nonces, generating them if there are none
    pub fn generate_or_get_public_nonces(&self, session_id: &str) -> Result<PublicNonces> {
        match self.nonces.entry(session_id.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.get().public_nonces()),
            Entry::Vacant(entry) => {
                let pair = NoncePair::generate()?;
                let public = pair.public_nonces();
                entry.insert(pair);
                Ok(public)
            }
        }
    }

    pub fn has_nonces(&self, session_id: &str) -> bool {
        self.nonces.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.nonces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nonces.is_empty()
    }

    /// Run `sign` against the stored pair and delete the pair if it succeeds.
    ///
    /// The entry stays locked for the whole call, so two signers racing on
    /// one session cannot both observe the same pair.
    pub(crate) fn consume<T, F>(&self, session_id: &str, sign: F) -> Result<T>
    where
        F: FnOnce(&NoncePair) -> Result<T>,
    {
        match self.nonces.entry(session_id.to_owned()) {
            Entry::Occupied(entry) => {
                let output = sign(entry.get())?;
                entry.remove();
                debug!(session = session_id, "Consumed nonce pair");
                Ok(output)
            }
            Entry::Vacant(_) => Err(Error::NoncesNotExchanged),
        }
    }

    /// `{"nonces": {"<session>": {"k", "kTwo", "kPublic", "kTwoPublic"}}}`
    pub fn to_json(&self) -> Result<String> {
        let nonces = self
            .nonces
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().to_json()))
            .collect();
        Ok(serde_json::to_string(&StoreJson { nonces })?)
    }

    /// Rebuild a store from [`NonceStore::to_json`] output. Nothing is kept
    /// unless every entry parses and matches its public commitments.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: StoreJson = serde_json::from_str(json)?;
        let nonces = data
            .nonces
            .iter()
            .map(|(session, nonce)| -> Result<(SessionId, NoncePair)> {
                Ok((session.clone(), NoncePair::from_json(nonce)?))
            })
            .collect::<Result<DashMap<_, _>>>()
            .map_err(|e| Error::InvalidSerialization(e.to_string()))?;
        Ok(Self { nonces })
    }
}

impl fmt::Debug for NonceStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sessions: Vec<SessionId> = self.nonces.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("NonceStore")
            .field("sessions", &sessions)
            .finish()
    }
}
