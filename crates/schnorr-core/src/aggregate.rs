//! Key aggregation, signature summation and verification

use crate::hash::{self, MessageDigest};
use crate::onchain::schnorr_address;
use crate::types::Bytes32;
use crate::{curve, Error, PublicKey, Result, Signature, MIN_PARTICIPANTS};
use k256::{ProjectivePoint, Scalar};

/// Combine participant keys into `X = Σ a_i·P_i` with `a_i = H(L || P_i)`.
///
/// The result does not depend on the order of `public_keys`.
pub fn combine_public_keys(public_keys: &[PublicKey]) -> Result<PublicKey> {
    if public_keys.len() < MIN_PARTICIPANTS {
        return Err(Error::InsufficientParticipants);
    }

    let l = hash::generate_l(public_keys);
    let tweaked: Vec<ProjectivePoint> = public_keys
        .iter()
        .map(|key| key.point() * hash::a_coefficient(key, &l))
        .collect();

    PublicKey::from_point(&curve::sum_points(&tweaked))
}

/// `0x`-prefixed low 20 bytes of the combined key's x-coordinate
pub fn combined_address(public_keys: &[PublicKey]) -> Result<String> {
    Ok(schnorr_address(&combine_public_keys(public_keys)?))
}

/// Sum partial signatures mod `n`
pub fn sum_signatures(signatures: &[Signature]) -> Result<Signature> {
    if signatures.len() < 2 {
        return Err(Error::InsufficientSignatures);
    }

    let sum = signatures
        .iter()
        .fold(Scalar::ZERO, |acc, signature| acc + signature.scalar());
    Ok(Signature::from_scalar(&sum))
}

/// Check `s·G == R + e·P` with `e = challenge(R, hash, P)`
pub fn verify(
    signature: &Signature,
    hash: &Bytes32,
    final_public_nonce: &PublicKey,
    public_key: &PublicKey,
) -> bool {
    let e = hash::challenge(final_public_nonce, hash, public_key);

    let lhs = curve::mul_base(&signature.scalar());
    let rhs = final_public_nonce.point() + public_key.point() * curve::reduce_bytes(&e);
    lhs == rhs
}

/// Hash `message` with `digest` and verify
pub fn verify_message<D>(
    signature: &Signature,
    message: &str,
    digest: &D,
    final_public_nonce: &PublicKey,
    public_key: &PublicKey,
) -> bool
where
    D: MessageDigest + ?Sized,
{
    verify(
        signature,
        &digest.digest(message.as_bytes()),
        final_public_nonce,
        public_key,
    )
}

/// Verify from raw encodings. Malformed inputs are errors; a well-formed but
/// wrong signature is `Ok(false)`.
pub fn verify_encoded(
    signature: &[u8],
    hash: &[u8],
    final_public_nonce: &[u8],
    public_key: &[u8],
) -> Result<bool> {
    let signature = Signature::from_bytes(signature)?;
    let hash: Bytes32 = hash.try_into().map_err(|_| {
        Error::InvalidEncoding(format!("expected 32 byte hash, got {}", hash.len()))
    })?;
    let final_public_nonce = PublicKey::from_bytes(final_public_nonce)?;
    let public_key = PublicKey::from_bytes(public_key)?;

    Ok(verify(&signature, &hash, &final_public_nonce, &public_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_message;
    use crate::sign::sign;
    use crate::KeyPair;

    #[test]
    fn test_combine_is_order_independent() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();

        let ab = combine_public_keys(&[*a.public_key(), *b.public_key()]).unwrap();
        let ba = combine_public_keys(&[*b.public_key(), *a.public_key()]).unwrap();
        assert_eq!(ab, ba);
        assert_ne!(ab, *a.public_key());
        assert_ne!(ab, *b.public_key());
    }

    #[test]
    fn test_combine_is_not_plain_sum() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();

        let plain = PublicKey::from_point(&(a.public_key().point() + b.public_key().point()))
            .unwrap();
        let combined = combine_public_keys(&[*a.public_key(), *b.public_key()]).unwrap();
        assert_ne!(plain, combined);
    }

    #[test]
    fn test_combine_requires_two_keys() {
        let a = KeyPair::generate().unwrap();
        assert!(matches!(
            combine_public_keys(&[*a.public_key()]),
            Err(Error::InsufficientParticipants)
        ));
        assert!(matches!(
            combined_address(&[]),
            Err(Error::InsufficientParticipants)
        ));
    }

    #[test]
    fn test_combined_address_format() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        let keys = [*a.public_key(), *b.public_key()];

        let address = combined_address(&keys).unwrap();
        assert_eq!(address.len(), 42);
        assert!(address.starts_with("0x"));

        let x = combine_public_keys(&keys).unwrap().x_coordinate();
        assert_eq!(&address[2..], hex::encode(&x[12..]));
    }

    #[test]
    fn test_sum_requires_two_signatures() {
        let pair = KeyPair::generate().unwrap();
        let output = sign(pair.private_key(), &hash_message("m")).unwrap();
        assert!(matches!(
            sum_signatures(&[output.signature]),
            Err(Error::InsufficientSignatures)
        ));
        assert!(matches!(
            sum_signatures(&[]),
            Err(Error::InsufficientSignatures)
        ));
    }

    #[test]
    fn test_sum_wraps_modulo_order() {
        let max = Signature::from_scalar(&(-Scalar::ONE));
        let two = Signature::from_scalar(&Scalar::from(2u64));
        assert_eq!(
            sum_signatures(&[max, two]).unwrap(),
            Signature::from_scalar(&Scalar::ONE)
        );
    }

    #[test]
    fn test_verify_encoded() {
        let pair = KeyPair::generate().unwrap();
        let hash = hash_message("test message");
        let output = sign(pair.private_key(), &hash).unwrap();

        assert!(verify_encoded(
            output.signature.as_bytes(),
            &hash,
            output.final_public_nonce.as_bytes(),
            pair.public_key().as_bytes(),
        )
        .unwrap());

        assert!(!verify_encoded(
            output.signature.as_bytes(),
            &hash_message("other"),
            output.final_public_nonce.as_bytes(),
            pair.public_key().as_bytes(),
        )
        .unwrap());

        assert!(matches!(
            verify_encoded(
                output.signature.as_bytes(),
                &hash,
                &[0u8; 33],
                pair.public_key().as_bytes(),
            ),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            verify_encoded(
                output.signature.as_bytes(),
                &hash[..31],
                output.final_public_nonce.as_bytes(),
                pair.public_key().as_bytes(),
            ),
            Err(Error::InvalidEncoding(_))
        ));
    }
}
