//! secp256k1 scalar and point helpers
//!
//! Thin adapter over `k256` so the rest of the crate works with fixed-size
//! byte arrays (32-byte scalars, 33-byte compressed points) and never has to
//! touch SEC1 plumbing directly.

use crate::{Error, Result};
use k256::{
    elliptic_curve::{
        bigint::U256,
        ops::Reduce,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Curve, Field, Group, PrimeField,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, Secp256k1,
};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// secp256k1 group order `n`
pub const CURVE_ORDER: U256 = <Secp256k1 as Curve>::ORDER;

/// Length of a SEC1 compressed point
pub const COMPRESSED_LEN: usize = 33;

/// Length of a SEC1 uncompressed point
pub const UNCOMPRESSED_LEN: usize = 65;

/// Parse a canonical scalar in `[1, n-1]`.
pub fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<Scalar> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .ok_or_else(|| Error::InvalidEncoding("scalar is not below the curve order".into()))?;
    if bool::from(scalar.is_zero()) {
        return Err(Error::InvalidEncoding("scalar is zero".into()));
    }
    Ok(scalar)
}

/// Interpret 32 bytes as a big-endian integer reduced mod `n`.
pub fn reduce_bytes(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*bytes))
}

pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(scalar.to_bytes().as_slice());
    out
}

/// Draw 32-byte candidates from `rng` until one is a valid non-zero scalar.
pub fn random_scalar_bytes<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Zeroizing<[u8; 32]>> {
    let mut candidate = Zeroizing::new([0u8; 32]);
    loop {
        rng.try_fill_bytes(&mut candidate[..])?;
        if scalar_from_bytes(&candidate).is_ok() {
            return Ok(candidate);
        }
    }
}

/// `scalar * G`
pub fn mul_base(scalar: &Scalar) -> ProjectivePoint {
    ProjectivePoint::GENERATOR * scalar
}

/// Decode a 33-byte compressed point. The point at infinity is rejected.
pub fn decode_point(bytes: &[u8]) -> Result<ProjectivePoint> {
    if bytes.len() != COMPRESSED_LEN {
        return Err(Error::InvalidEncoding(format!(
            "expected {} byte compressed point, got {}",
            COMPRESSED_LEN,
            bytes.len()
        )));
    }
    if bytes[0] != 0x02 && bytes[0] != 0x03 {
        return Err(Error::InvalidEncoding(format!(
            "invalid compressed point tag {:#04x}",
            bytes[0]
        )));
    }

    let encoded =
        EncodedPoint::from_bytes(bytes).map_err(|e| Error::InvalidEncoding(e.to_string()))?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| Error::InvalidEncoding("bytes are not a point on secp256k1".into()))?;

    Ok(ProjectivePoint::from(affine))
}

/// Compress a point to 33 bytes. Fails for the point at infinity.
pub fn encode_point(point: &ProjectivePoint) -> Result<[u8; COMPRESSED_LEN]> {
    if bool::from(point.is_identity()) {
        return Err(Error::InvalidEncoding("point at infinity".into()));
    }
    let encoded = point.to_affine().to_encoded_point(true);
    encoded
        .as_bytes()
        .try_into()
        .map_err(|_| Error::InvalidEncoding("invalid compressed point length".into()))
}

/// Uncompressed SEC1 encoding (`0x04 || x || y`).
pub fn uncompressed(point: &AffinePoint) -> [u8; UNCOMPRESSED_LEN] {
    let mut out = [0u8; UNCOMPRESSED_LEN];
    out.copy_from_slice(point.to_encoded_point(false).as_bytes());
    out
}

/// Sum of a set of points.
pub fn sum_points<'a, I>(points: I) -> ProjectivePoint
where
    I: IntoIterator<Item = &'a ProjectivePoint>,
{
    points
        .into_iter()
        .fold(ProjectivePoint::IDENTITY, |acc, point| acc + point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::elliptic_curve::bigint::Encoding;

    fn one() -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        bytes
    }

    #[test]
    fn test_scalar_bounds() {
        assert!(scalar_from_bytes(&[0u8; 32]).is_err());
        assert!(scalar_from_bytes(&one()).is_ok());

        let mut order = [0u8; 32];
        order.copy_from_slice(&CURVE_ORDER.to_be_bytes());
        assert!(scalar_from_bytes(&order).is_err());

        // n reduces to zero
        assert!(bool::from(reduce_bytes(&order).is_zero()));
    }

    #[test]
    fn test_generator_encoding() {
        let g = mul_base(&Scalar::ONE);
        let bytes = encode_point(&g).unwrap();
        assert_eq!(
            hex::encode(bytes),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(decode_point(&bytes).unwrap(), g);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_point(&[0u8; 33]).is_err());
        assert!(decode_point(&[0x02; 32]).is_err());

        // x >= p is not a field element
        let mut bytes = [0xffu8; 33];
        bytes[0] = 0x02;
        assert!(decode_point(&bytes).is_err());
    }

    #[test]
    fn test_identity_is_not_encodable() {
        assert!(encode_point(&ProjectivePoint::IDENTITY).is_err());
        let g = mul_base(&Scalar::ONE);
        assert!(encode_point(&sum_points([g, -g].iter())).is_err());
    }
}
