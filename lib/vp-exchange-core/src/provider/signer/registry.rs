use std::sync::Arc;

use super::error::SignerError;
use super::{ChallengeRequestSigner, PresentationSigner};
use crate::model::presentation::VerifiablePresentation;

/// Ordered collections of registered verifiers, first match wins
#[derive(Clone, Default)]
pub struct SignerRegistry {
    challenge_request_signers: Vec<Arc<dyn ChallengeRequestSigner>>,
    presentation_signers: Vec<Arc<dyn PresentationSigner>>,
}

impl SignerRegistry {
    pub fn new(
        challenge_request_signers: Vec<Arc<dyn ChallengeRequestSigner>>,
        presentation_signers: Vec<Arc<dyn PresentationSigner>>,
    ) -> Self {
        Self {
            challenge_request_signers,
            presentation_signers,
        }
    }

    pub fn resolve_challenge_request_signer(
        &self,
        proof_type: &str,
    ) -> Result<Arc<dyn ChallengeRequestSigner>, SignerError> {
        self.challenge_request_signers
            .iter()
            .find(|signer| signer.signature_scheme().matches(proof_type))
            .cloned()
            .ok_or_else(|| SignerError::UnknownSignatureScheme(proof_type.to_owned()))
    }

    /// Strict lookup by proof type; `None` (no proof at all) selects the default signer
    pub fn resolve_presentation_signer(
        &self,
        proof_type: Option<&str>,
    ) -> Result<Arc<dyn PresentationSigner>, SignerError> {
        let Some(proof_type) = proof_type else {
            return self.default_presentation_signer();
        };

        self.presentation_signers
            .iter()
            .find(|signer| signer.signature_scheme().matches(proof_type))
            .cloned()
            .ok_or_else(|| SignerError::UnknownSignatureScheme(proof_type.to_owned()))
    }

    /// Signer for a counterparty presentation: matched on the first proof,
    /// otherwise the first registered presentation signer
    pub fn presentation_signer_for(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<Arc<dyn PresentationSigner>, SignerError> {
        let proof_type = presentation
            .proof()
            .first()
            .map(|proof| proof.r#type.as_str());

        match self.resolve_presentation_signer(proof_type) {
            Err(SignerError::UnknownSignatureScheme(_)) => self.default_presentation_signer(),
            result => result,
        }
    }

    pub fn default_presentation_signer(&self) -> Result<Arc<dyn PresentationSigner>, SignerError> {
        self.presentation_signers
            .first()
            .cloned()
            .ok_or(SignerError::NoPresentationSigner)
    }
}
