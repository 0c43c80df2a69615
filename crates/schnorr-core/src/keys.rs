//! Key model: private keys, compressed public keys and key pairs

use crate::curve::{self, COMPRESSED_LEN};
use crate::{Error, Result};
use k256::{elliptic_curve::sec1::ToEncodedPoint, AffinePoint, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// A 32-byte secp256k1 private key in `[1, n-1]`.
///
/// The bytes are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
}

impl PrivateKey {
    /// Parse a private key from exactly 32 big-endian bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!("expected 32 byte private key, got {}", bytes.len()))
        })?;
        curve::scalar_from_bytes(&bytes)?;
        Ok(Self { bytes })
    }

    /// Parse a private key from 64 hex characters
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Rejection-sample a fresh key from the OS entropy source
    pub fn random() -> Result<Self> {
        Self::random_with_rng(&mut OsRng)
    }

    /// Rejection-sample a fresh key from `rng`
    pub fn random_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let bytes = curve::random_scalar_bytes(rng)?;
        Ok(Self { bytes: *bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub(crate) fn scalar(&self) -> Scalar {
        curve::reduce_bytes(&self.bytes)
    }

    /// The matching public key `x·G`
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_private_key(self)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A 33-byte SEC1 compressed secp256k1 point.
///
/// Construction validates the encoding, so a `PublicKey` is always on the
/// curve and never the point at infinity. The same type is used for public
/// nonce commitments and the final public nonce `R`.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    bytes: [u8; COMPRESSED_LEN],
    point: AffinePoint,
}

impl PublicKey {
    /// Parse a compressed point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let point = curve::decode_point(bytes)?;
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(bytes);
        Ok(Self {
            bytes: out,
            point: point.to_affine(),
        })
    }

    /// Parse 66 lower- or upper-case hex characters
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn from_point(point: &ProjectivePoint) -> Result<Self> {
        let bytes = curve::encode_point(point)?;
        Ok(Self {
            bytes,
            point: point.to_affine(),
        })
    }

    pub fn from_private_key(private_key: &PrivateKey) -> Self {
        let point = curve::mul_base(&private_key.scalar());
        let affine = point.to_affine();
        let mut bytes = [0u8; COMPRESSED_LEN];
        bytes.copy_from_slice(affine.to_encoded_point(true).as_bytes());
        Self {
            bytes,
            point: affine,
        }
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_LEN] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn point(&self) -> ProjectivePoint {
        ProjectivePoint::from(self.point)
    }

    pub(crate) fn affine(&self) -> &AffinePoint {
        &self.point
    }

    /// Bytes 1..33 of the compressed encoding
    pub fn x_coordinate(&self) -> [u8; 32] {
        let mut x = [0u8; 32];
        x.copy_from_slice(&self.bytes[1..]);
        x
    }

    /// The compressed tag mapped onto Ethereum's 27/28 recovery id
    pub fn parity(&self) -> u8 {
        self.bytes[0] - 2 + 27
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for PublicKey {}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for PublicKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_hex()
    }
}

/// A private key together with its public key
#[derive(Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPairJson {
    public_key: String,
    private_key: String,
}

impl Zeroize for KeyPairJson {
    fn zeroize(&mut self) {
        self.private_key.zeroize();
    }
}

impl KeyPair {
    /// Generate a key pair from the OS entropy source
    pub fn generate() -> Result<Self> {
        Self::generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        Ok(Self::from_private_key(PrivateKey::random_with_rng(rng)?))
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// `{"publicKey": hex66, "privateKey": hex64}`
    pub fn to_json(&self) -> Result<String> {
        let mut json = KeyPairJson {
            public_key: self.public_key.to_hex(),
            private_key: self.private_key.to_hex(),
        };
        let out = serde_json::to_string(&json);
        json.zeroize();
        Ok(out?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut data: KeyPairJson = serde_json::from_str(json)?;
        let parsed = PrivateKey::from_hex(&data.private_key)
            .and_then(|private_key| Ok((private_key, PublicKey::from_hex(&data.public_key)?)));
        data.zeroize();

        let (private_key, public_key) =
            parsed.map_err(|e| Error::InvalidSerialization(e.to_string()))?;
        if private_key.public_key() != public_key {
            return Err(Error::InvalidSerialization(
                "public key does not match private key".into(),
            ));
        }

        Ok(Self {
            private_key,
            public_key,
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyPair {{ public_key: {} }}", self.public_key)
    }
}

/// Generate a random key pair from the OS entropy source
pub fn generate_random_keys() -> Result<KeyPair> {
    KeyPair::generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_scalar_one_is_generator() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let key = PrivateKey::from_bytes(&bytes).unwrap();
        assert_eq!(
            key.public_key().to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(key.public_key().parity(), 27);
    }

    #[test]
    fn test_private_key_rejects_bad_input() {
        assert!(matches!(
            PrivateKey::from_bytes(&[1u8; 31]),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[0u8; 32]),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[0xff; 32]),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            PrivateKey::from_hex("zz"),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_public_key_hex() {
        let pair = KeyPair::generate().unwrap();
        let hex_str = pair.public_key().to_hex();
        assert_eq!(hex_str.len(), 66);
        assert_eq!(PublicKey::from_hex(&hex_str).unwrap(), *pair.public_key());
        assert!(PublicKey::from_hex(&hex_str[..64]).is_err());
    }

    #[test]
    fn test_deterministic_generation() {
        let a = KeyPair::generate_with_rng(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let b = KeyPair::generate_with_rng(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a.private_key().as_bytes(), b.private_key().as_bytes());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_key_pair_json() {
        let pair = KeyPair::generate().unwrap();
        let json = pair.to_json().unwrap();
        let restored = KeyPair::from_json(&json).unwrap();

        assert_eq!(restored.public_key(), pair.public_key());
        assert_eq!(
            restored.private_key().as_bytes(),
            pair.private_key().as_bytes()
        );
        assert_eq!(restored.to_json().unwrap(), json);

        assert!(matches!(
            KeyPair::from_json(&json[..json.len() - 1]),
            Err(Error::InvalidSerialization(_))
        ));
    }

    #[test]
    fn test_key_pair_json_mismatch() {
        let one = KeyPair::generate().unwrap();
        let two = KeyPair::generate().unwrap();
        let json = format!(
            r#"{{"publicKey":"{}","privateKey":"{}"}}"#,
            two.public_key().to_hex(),
            one.private_key().to_hex()
        );
        assert!(matches!(
            KeyPair::from_json(&json),
            Err(Error::InvalidSerialization(_))
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let pair = KeyPair::generate().unwrap();
        let printed = format!("{:?} {:?}", pair, pair.private_key());
        assert!(!printed.contains(&pair.private_key().to_hex()));
    }
}
