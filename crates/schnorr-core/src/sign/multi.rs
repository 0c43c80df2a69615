//! Multi-party partial signatures

use crate::aggregate::combine_public_keys;
use crate::hash::{self, MessageDigest};
use crate::nonce::{NonceStore, PublicNonces};
use crate::types::Bytes32;
use crate::{
    curve, Error, PrivateKey, PublicKey, Result, Signature, SignatureOutput, MIN_PARTICIPANTS,
};
use k256::ProjectivePoint;
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};

/// Compute this signer's partial signature.
///
/// The nonce pair stored under `session_id` is consumed on success and left
/// in place on any error.
///
/// # Arguments
/// * `store` - The signer's nonce store
/// * `session_id` - Session the nonces were generated under
/// * `private_key` - The key being signed with
/// * `hash` - Message hash
/// * `public_keys` - All participants, including this signer
/// * `public_nonces` - Public nonces of all participants, including this signer
///
/// # Returns
/// `(R, e, s_i)` where `s_i = k + b·kTwo + a·e·x mod n`
#[instrument(skip(store, private_key, hash, public_keys, public_nonces))]
pub fn multi_sig_sign(
    store: &NonceStore,
    session_id: &str,
    private_key: &PrivateKey,
    hash: &Bytes32,
    public_keys: &[PublicKey],
    public_nonces: &[PublicNonces],
) -> Result<SignatureOutput> {
    if public_keys.len() < MIN_PARTICIPANTS {
        return Err(Error::InsufficientParticipants);
    }

    store.consume(session_id, |nonces| {
        let combined_public_key = combine_public_keys(public_keys)?;
        let public_key = private_key.public_key();

        let l = hash::generate_l(public_keys);
        let a = hash::a_coefficient(&public_key, &l);
        let b = hash::b_coefficient(&combined_public_key, hash, public_nonces)?;

        let effective_nonces: Vec<ProjectivePoint> =
            public_nonces.iter().map(|n| n.effective(&b)).collect();
        let own_effective_nonce = nonces.public_nonces().effective(&b);

        let present = effective_nonces
            .iter()
            .any(|nonce| bool::from(nonce.ct_eq(&own_effective_nonce)));
        if !present {
            warn!(
                public_key = %public_key,
                "Own nonce commitment missing from the supplied nonce set"
            );
            return Err(Error::InvalidNonceSet);
        }

        let r = PublicKey::from_point(&curve::sum_points(&effective_nonces))?;
        let e = hash::challenge(&r, hash, &combined_public_key);

        let s = nonces.k()
            + nonces.k_two() * b
            + a * curve::reduce_bytes(&e) * private_key.scalar();

        debug!(
            public_key = %public_key,
            final_public_nonce = %r,
            "Partial signature computed"
        );

        Ok(SignatureOutput {
            final_public_nonce: r,
            challenge: e,
            signature: Signature::from_scalar(&s),
        })
    })
}

/// Hash `message` with `digest` and compute the partial signature over it
pub fn multi_sig_sign_message<D>(
    store: &NonceStore,
    session_id: &str,
    private_key: &PrivateKey,
    message: &str,
    digest: &D,
    public_keys: &[PublicKey],
    public_nonces: &[PublicNonces],
) -> Result<SignatureOutput>
where
    D: MessageDigest + ?Sized,
{
    let hash = digest.digest(message.as_bytes());
    multi_sig_sign(
        store,
        session_id,
        private_key,
        &hash,
        public_keys,
        public_nonces,
    )
}
