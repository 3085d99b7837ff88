//! Concrete Ed25519-style `SignatureScheme`
//!
//! Not part of the consensus core proper — §1 treats the signature
//! primitive as an external capability — but every test and any caller
//! without its own HSM/key-management layer needs *something* real to
//! plug in. The teacher's own `crypto/delegated_keys.rs` signs with
//! `ecdsa`/`sha3` rather than Ed25519; there is no teacher code-level
//! precedent here, only a declared-but-unused `ed25519-dalek` entry in
//! its `Cargo.toml`, which this module puts to actual use.

use super::{Identifier, Signature, SignatureScheme};
use ed25519_dalek::{Signer as DalekSigner, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

/// An Ed25519 keypair that implements [`SignatureScheme`] for itself.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Construct from a known 32-byte seed (deterministic — used in tests
    /// to obtain a reproducible signer; see Design Notes §9).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn identifier(&self) -> Identifier {
        Identifier(self.signing_key.verifying_key().to_bytes())
    }
}

impl SignatureScheme for Ed25519Signer {
    fn sign(&self, body: &[u8]) -> Signature {
        Signature(self.signing_key.sign(body).to_bytes())
    }

    fn verify(&self, signature: &Signature, body: &[u8], identifier: &Identifier) -> bool {
        verify_with_identifier(signature, body, identifier)
    }
}

/// Free function verifying a signature against an arbitrary identifier,
/// for call sites that only hold a public key (no local signing capability).
pub fn verify_with_identifier(signature: &Signature, body: &[u8], identifier: &Identifier) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(identifier.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify(body, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let signer = Ed25519Signer::from_seed([7u8; 32]);
        let body = b"freeze height 42";
        let sig = signer.sign(body);
        assert!(signer.verify(&sig, body, &signer.identifier()));
    }

    #[test]
    fn verify_rejects_tampered_body() {
        let signer = Ed25519Signer::from_seed([9u8; 32]);
        let sig = signer.sign(b"original");
        assert!(!signer.verify(&sig, b"tampered", &signer.identifier()));
    }

    #[test]
    fn deterministic_from_seed() {
        let a = Ed25519Signer::from_seed([1u8; 32]);
        let b = Ed25519Signer::from_seed([1u8; 32]);
        assert_eq!(a.identifier(), b.identifier());
    }
}
