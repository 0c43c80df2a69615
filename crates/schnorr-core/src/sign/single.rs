//! Single-party Schnorr signatures

use crate::hash::{self, MessageDigest};
use crate::types::Bytes32;
use crate::{curve, PrivateKey, PublicKey, Result, Signature, SignatureOutput};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tracing::instrument;

/// Sign a 32-byte hash with a fresh ephemeral nonce.
///
/// `R = k·G`, `e = challenge(R, hash, P)`, `s = k + x·e mod n`
pub fn sign(private_key: &PrivateKey, hash: &Bytes32) -> Result<SignatureOutput> {
    sign_with_rng(private_key, hash, &mut OsRng)
}

#[instrument(skip_all)]
pub fn sign_with_rng<R: RngCore + CryptoRng>(
    private_key: &PrivateKey,
    hash: &Bytes32,
    rng: &mut R,
) -> Result<SignatureOutput> {
    let public_key = private_key.public_key();

    let k_bytes = curve::random_scalar_bytes(rng)?;
    let k = curve::reduce_bytes(&k_bytes);
    let r = PublicKey::from_point(&curve::mul_base(&k))?;

    let e = hash::challenge(&r, hash, &public_key);
    let s = k + private_key.scalar() * curve::reduce_bytes(&e);

    Ok(SignatureOutput {
        final_public_nonce: r,
        challenge: e,
        signature: Signature::from_scalar(&s),
    })
}

/// Hash `message` with `digest` and sign the result
pub fn sign_message<D>(
    private_key: &PrivateKey,
    message: &str,
    digest: &D,
) -> Result<SignatureOutput>
where
    D: MessageDigest + ?Sized,
{
    sign(private_key, &digest.digest(message.as_bytes()))
}
