//! Signing: single-party signatures, multi-party partial signatures and the
//! relay-driven two-round protocol.

mod messages;
mod multi;
mod protocol;
mod single;

pub use messages::*;
pub use multi::{multi_sig_sign, multi_sig_sign_message};
pub use protocol::run_multisig;
pub use single::{sign, sign_message, sign_with_rng};
