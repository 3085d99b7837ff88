//! Signature capability (C1)
//!
//! Key generation and the signature primitive itself are out of scope
//! per §1 — this module only fixes the *interface* the rest of the
//! crate programs against (`SignatureScheme`), plus `Identifier` and
//! `Signature` newtypes used everywhere else. `ed25519` supplies a
//! concrete implementation for tests and for callers who don't bring
//! their own.

pub mod ed25519;

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte public key identifying a signer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier(pub [u8; 32]);

impl Identifier {
    pub const ZERO: Identifier = Identifier([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", hex::encode(self.0))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Identifier {
    fn from(bytes: [u8; 32]) -> Self {
        Identifier(bytes)
    }
}

/// 64-byte signature produced by `SignatureScheme::sign`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const ZERO: Signature = Signature([0u8; 64]);

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}…)", hex::encode(&self.0[..8]))
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Signature(bytes)
    }
}

/// External signing/verification capability.
///
/// The core never generates or stores secret keys; a `SignatureScheme`
/// is handed in by the embedding application (see [`crate::signer::SignerIdentity`]).
pub trait SignatureScheme: Send + Sync {
    /// Sign `body` with the scheme's private key, returning a 64-byte signature.
    fn sign(&self, body: &[u8]) -> Signature;

    /// Verify that `signature` over `body` was produced by `identifier`.
    fn verify(&self, signature: &Signature, body: &[u8], identifier: &Identifier) -> bool;
}
