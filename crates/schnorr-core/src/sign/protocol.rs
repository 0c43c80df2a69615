//! Two-round multi-signature protocol over a [`Relay`]

use crate::aggregate::{combine_public_keys, sum_signatures, verify};
use crate::mpc::Relay;
use crate::nonce::PublicNonces;
use crate::signer::SchnorrSigner;
use crate::types::Bytes32;
use crate::{
    Error, PublicKey, Result, Signature, SignatureOutput, MIN_PARTICIPANTS, NONCE_ROUND,
    PARTIAL_ROUND,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

use super::{NonceMessage, PartialMessage};

/// Run the signing protocol for one message
///
/// Round 1 exchanges public nonces, round 2 exchanges partial signatures.
/// Every party ends up with the same aggregate signature, which is checked
/// against the combined key before it is returned.
///
/// # Arguments
/// * `signer` - This party's signer
/// * `hash` - Message hash to sign
/// * `public_keys` - All participants, including this signer
/// * `relay` - Message relay for communication
/// * `session_id` - Relay session shared by all participants
///
/// # Returns
/// The aggregate `(R, e, s)`
#[instrument(skip(signer, hash, public_keys, relay), fields(public_key = %signer.public_key()))]
pub async fn run_multisig<R: Relay>(
    signer: &SchnorrSigner,
    hash: &Bytes32,
    public_keys: &[PublicKey],
    relay: &R,
    session_id: &str,
) -> Result<SignatureOutput> {
    info!(participants = public_keys.len(), "Starting multisig");

    if public_keys.len() < MIN_PARTICIPANTS {
        return Err(Error::InsufficientParticipants);
    }
    if !public_keys.contains(signer.public_key()) {
        return Err(Error::UnknownParticipant(signer.public_key().to_hex()));
    }

    // Round 1: nonce exchange
    let nonce_msg = NonceMessage {
        public_key: *signer.public_key(),
        public_nonces: signer.public_nonces()?,
    };
    relay.broadcast(session_id, NONCE_ROUND, &nonce_msg).await?;

    let mut nonce_msgs = relay
        .collect_broadcasts::<NonceMessage>(session_id, NONCE_ROUND, public_keys.len())
        .await?;
    check_senders(public_keys, nonce_msgs.iter().map(|m| &m.public_key))?;
    nonce_msgs.sort_by(|a, b| a.public_key.cmp(&b.public_key));

    let public_nonces: Vec<PublicNonces> = nonce_msgs.iter().map(|m| m.public_nonces).collect();
    debug!(count = public_nonces.len(), "Nonces collected");

    // Round 2: partial signatures
    let output = signer.multi_sign(hash, public_keys, &public_nonces)?;
    let partial_msg = PartialMessage::new(*signer.public_key(), &output);
    relay.broadcast(session_id, PARTIAL_ROUND, &partial_msg).await?;

    let partials = relay
        .collect_broadcasts::<PartialMessage>(session_id, PARTIAL_ROUND, public_keys.len())
        .await?;
    check_senders(public_keys, partials.iter().map(|m| &m.public_key))?;
    debug!(count = partials.len(), "Partial signatures collected");

    if let Some(mismatch) = partials.iter().find(|m| {
        m.final_public_nonce != output.final_public_nonce || m.challenge != output.challenge
    }) {
        return Err(Error::VerificationFailed(format!(
            "partial from {} signs a different nonce or challenge",
            mismatch.public_key
        )));
    }

    let signatures: Vec<Signature> = partials.iter().map(|m| m.signature).collect();
    let signature = sum_signatures(&signatures)?;
    let combined_public_key = combine_public_keys(public_keys)?;

    if !verify(&signature, hash, &output.final_public_nonce, &combined_public_key) {
        return Err(Error::VerificationFailed(
            "aggregate signature does not verify against the combined key".into(),
        ));
    }

    info!(
        final_public_nonce = %output.final_public_nonce,
        signature = %signature.to_hex(),
        "Multisig completed successfully"
    );

    Ok(SignatureOutput {
        final_public_nonce: output.final_public_nonce,
        challenge: output.challenge,
        signature,
    })
}

/// Every sender is a participant and none appears twice
fn check_senders<'a, I>(public_keys: &[PublicKey], senders: I) -> Result<()>
where
    I: IntoIterator<Item = &'a PublicKey>,
{
    let mut seen = BTreeSet::new();
    for sender in senders {
        if !public_keys.contains(sender) {
            return Err(Error::UnknownParticipant(sender.to_hex()));
        }
        if !seen.insert(*sender) {
            return Err(Error::Relay(format!("duplicate message from {}", sender)));
        }
    }
    Ok(())
}
