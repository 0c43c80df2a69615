//! # Schnorr Core
//!
//! Schnorr signatures over secp256k1 whose challenge can be checked on-chain
//! with a single `ecrecover` call.
//!
//! This crate provides:
//! - Single-party signing and verification
//! - Two-nonce multi-party signing with key aggregation
//! - A per-signer nonce store that hands each nonce pair to one signature
//! - The ABI encoding consumed by the verifying contract
//!
//! ## Protocol Overview
//!
//! Each participant publishes two nonce commitments. Once every commitment
//! is known, each signer produces a partial signature `s_i`. The partials
//! sum to a signature that verifies against the combined public key
//! `X = Σ H(L || P_i)·P_i`.
//!
//! The challenge is `e = keccak256(addr(R) || v || px || m)`, the same
//! digest `ecrecover` lets a contract reconstruct.
//!
//! ## Example
//!
//! ```rust
//! use schnorr_core::{hash::hash_message, KeyPair, Schnorrkel};
//!
//! let (one, two) = (Schnorrkel::new(), Schnorrkel::new());
//! let (key_one, key_two) = (KeyPair::generate()?, KeyPair::generate()?);
//!
//! let public_keys = [*key_one.public_key(), *key_two.public_key()];
//! let public_nonces = [one.generate_public_nonces()?, two.generate_public_nonces()?];
//!
//! let hash = hash_message("hello");
//! let sig_one = one.multi_sig_sign(key_one.private_key(), &hash, &public_keys, &public_nonces)?;
//! let sig_two = two.multi_sig_sign(key_two.private_key(), &hash, &public_keys, &public_nonces)?;
//!
//! let signature = Schnorrkel::sum_signatures(&[sig_one.signature, sig_two.signature])?;
//! let combined = Schnorrkel::combined_public_key(&public_keys)?;
//! assert!(Schnorrkel::verify(&signature, &hash, &sig_one.final_public_nonce, &combined));
//! # Ok::<(), schnorr_core::Error>(())
//! ```

pub mod aggregate;
pub mod curve;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mpc;
pub mod nonce;
pub mod onchain;
pub mod schnorrkel;
pub mod sign;
pub mod signer;
pub mod types;

pub use error::{Error, Result};
pub use hash::MessageDigest;
pub use keys::{generate_random_keys, KeyPair, PrivateKey, PublicKey};
pub use nonce::{NonceStore, PublicNonces};
pub use onchain::EcrecoverSignature;
pub use schnorrkel::{Schnorrkel, UnsafeSchnorrkel};
pub use signer::{SchnorrMultisigProvider, SchnorrSigner};
pub use types::{Bytes32, SessionId, Signature, SignatureOutput};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Smallest group that can be aggregated or multi-signed
pub const MIN_PARTICIPANTS: usize = 2;

/// Relay round carrying public nonces
pub const NONCE_ROUND: u32 = 1;

/// Relay round carrying partial signatures
pub const PARTIAL_ROUND: u32 = 2;
