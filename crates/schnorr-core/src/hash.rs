//! Keccak-256 helpers: key-aggregation coefficients, the nonce-binding
//! coefficient, the address-style challenge and message digests
//!
//! Every byte layout here matches what the on-chain verifier recomputes with
//! `keccak256(abi.encodePacked(...))`.

use crate::curve;
use crate::nonce::PublicNonces;
use crate::types::Bytes32;
use crate::{Error, PublicKey, Result};
use k256::Scalar;
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// keccak-256 over the concatenation of `parts`
pub fn keccak256(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A 32-byte message digest used by signer and verifier alike.
///
/// Implemented for every `Fn(&[u8]) -> [u8; 32]`, so plain functions such as
/// [`keccak256_digest`] or [`sha256_digest`] can be passed directly.
pub trait MessageDigest {
    fn digest(&self, message: &[u8]) -> Bytes32;
}

impl<F> MessageDigest for F
where
    F: Fn(&[u8]) -> Bytes32,
{
    fn digest(&self, message: &[u8]) -> Bytes32 {
        self(message)
    }
}

/// Default digest: `keccak256(abi.encodePacked(message))`
pub fn keccak256_digest(message: &[u8]) -> Bytes32 {
    keccak256(&[message])
}

pub fn sha256_digest(message: &[u8]) -> Bytes32 {
    Sha256::digest(message).into()
}

/// Hash a UTF-8 message with the default digest
pub fn hash_message(message: &str) -> Bytes32 {
    keccak256_digest(message.as_bytes())
}

/// `L = H(sorted public keys)`; independent of input order.
pub fn generate_l(public_keys: &[PublicKey]) -> Bytes32 {
    let mut sorted = public_keys.to_vec();
    sorted.sort();
    let parts: Vec<&[u8]> = sorted.iter().map(|key| key.as_bytes().as_slice()).collect();
    keccak256(&parts)
}

/// Rogue-key coefficient `a_i = H(L || P_i)`
pub fn a_coefficient(public_key: &PublicKey, l: &Bytes32) -> Scalar {
    curve::reduce_bytes(&keccak256(&[l, public_key.as_bytes()]))
}

/// Nonce-binding coefficient `b = H(X || m || ΣkPublic || ΣkTwoPublic)`
pub fn b_coefficient(
    combined_public_key: &PublicKey,
    msg_hash: &Bytes32,
    public_nonces: &[PublicNonces],
) -> Result<Scalar> {
    if public_nonces.is_empty() {
        return Err(Error::InsufficientParticipants);
    }

    let k_points: Vec<_> = public_nonces.iter().map(|n| n.k_public.point()).collect();
    let k_two_points: Vec<_> = public_nonces
        .iter()
        .map(|n| n.k_two_public.point())
        .collect();
    let k_sum = curve::encode_point(&curve::sum_points(&k_points))?;
    let k_two_sum = curve::encode_point(&curve::sum_points(&k_two_points))?;

    Ok(curve::reduce_bytes(&keccak256(&[
        combined_public_key.as_bytes(),
        msg_hash,
        &k_sum,
        &k_two_sum,
    ])))
}

/// Low 20 bytes of `keccak256(x || y)`: the Ethereum address of a point
pub fn point_address(point: &PublicKey) -> [u8; 20] {
    let uncompressed = curve::uncompressed(point.affine());
    let digest = keccak256(&[&uncompressed[1..]]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}

/// Address-style challenge
/// `e = H(address(R) || parity(P) || x(P) || m)`
///
/// Returned as raw digest bytes; callers reduce mod `n` for arithmetic.
pub fn challenge(r: &PublicKey, msg_hash: &Bytes32, public_key: &PublicKey) -> Bytes32 {
    let r_address = point_address(r);
    keccak256(&[
        &r_address,
        &[public_key.parity()],
        &public_key.x_coordinate(),
        msg_hash,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPair;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hex::encode(hash_message("")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(sha256_digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_trait_accepts_closures() {
        let digest = |message: &[u8]| keccak256(&[b"prefix", message]);
        assert_eq!(digest.digest(b"abc"), keccak256(&[b"prefixabc"]));
        assert_eq!(
            (keccak256_digest as fn(&[u8]) -> Bytes32).digest(b"abc"),
            hash_message("abc")
        );
    }

    #[test]
    fn test_l_is_order_independent() {
        let one = KeyPair::generate().unwrap();
        let two = KeyPair::generate().unwrap();
        let three = KeyPair::generate().unwrap();

        let forward = [*one.public_key(), *two.public_key(), *three.public_key()];
        let backward = [*three.public_key(), *one.public_key(), *two.public_key()];
        assert_eq!(generate_l(&forward), generate_l(&backward));
    }

    #[test]
    fn test_challenge_layout() {
        let r = KeyPair::generate().unwrap();
        let p = KeyPair::generate().unwrap();
        let msg = hash_message("test message");

        let mut packed = Vec::with_capacity(85);
        packed.extend_from_slice(&point_address(r.public_key()));
        packed.push(p.public_key().as_bytes()[0] + 25);
        packed.extend_from_slice(&p.public_key().as_bytes()[1..]);
        packed.extend_from_slice(&msg);
        assert_eq!(packed.len(), 85);

        assert_eq!(
            challenge(r.public_key(), &msg, p.public_key()),
            keccak256(&[&packed])
        );
    }

    #[test]
    fn test_generator_address() {
        // address of the public key for private key 1
        let g = PublicKey::from_hex(
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        )
        .unwrap();
        assert_eq!(
            hex::encode(point_address(&g)),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_b_coefficient_requires_nonces() {
        let p = KeyPair::generate().unwrap();
        assert!(matches!(
            b_coefficient(p.public_key(), &[0u8; 32], &[]),
            Err(Error::InsufficientParticipants)
        ));
    }
}
