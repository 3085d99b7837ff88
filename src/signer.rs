//! `SignerIdentity` — the running verifier's own keys, injected rather
//! than static (Design Notes §9: "Static `sign` and `identifier` on the
//! running verifier... Encapsulate as a `SignerIdentity` value injected
//! into `ConsensusLoop`; for tests, pass a deterministic signer.")

use crate::crypto::{Identifier, Signature, SignatureScheme};
use std::sync::Arc;

/// The local verifier's signing capability and public identity, passed by
/// value/reference into [`crate::consensus::consensus_loop::ConsensusLoop`]
/// instead of living behind a process-wide static.
#[derive(Clone)]
pub struct SignerIdentity {
    identifier: Identifier,
    scheme: Arc<dyn SignatureScheme>,
}

impl SignerIdentity {
    pub fn new(identifier: Identifier, scheme: Arc<dyn SignatureScheme>) -> Self {
        Self { identifier, scheme }
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn sign(&self, body: &[u8]) -> Signature {
        self.scheme.sign(body)
    }

    pub fn verify(&self, signature: &Signature, body: &[u8], identifier: &Identifier) -> bool {
        self.scheme.verify(signature, body, identifier)
    }

    /// A shared handle to the underlying scheme, for call sites that need
    /// to pass a `&dyn SignatureScheme` alongside other borrowed state.
    pub fn scheme_handle(&self) -> Arc<dyn SignatureScheme> {
        self.scheme.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519Signer;

    #[test]
    fn signer_identity_signs_and_verifies_itself() {
        let signer = Ed25519Signer::from_seed([3u8; 32]);
        let id = signer.identifier();
        let identity = SignerIdentity::new(id, Arc::new(signer));

        let sig = identity.sign(b"hello");
        assert!(identity.verify(&sig, b"hello", &id));
    }
}
