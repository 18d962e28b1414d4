use thiserror::Error;

use crate::model::error::ModelError;
use crate::model::message::Outcome;
use crate::provider::presentation_factory::PresentationError;
use crate::provider::signer::error::SignerError;
use crate::provider::transport::TransportError;
use crate::repository::error::StoreError;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Plugin not initialized. Did you forget to call initialize() ?")]
    NotInitialized,
    #[error("{0}")]
    MalformedRequest(ModelError),
    #[error(
        "ChallengeRequest verification failed: The object was signed with an unknown encryption scheme"
    )]
    UnknownSignatureScheme(String),
    #[error("ChallengeRequest verification failed: The signature is invalid")]
    InvalidSignature,
    #[error("The VerifiablePresentation from the issuer is invalid")]
    InvalidCounterpartyResponse,
    #[error("The issuer did not respond with a VerifiablePresentation")]
    MissingCounterpartyResponse,
    #[error("Malformed issuer response: {0}")]
    MalformedCounterpartyResponse(ModelError),
    #[error("Malformed consent: {0}")]
    MalformedConsent(serde_json::Error),
    #[error("Found {keys} keys for {credentials} credentials")]
    KeyOwnershipMismatch { credentials: usize, keys: usize },
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentationError),
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
}

impl ExchangeError {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::NotInitialized => Outcome::ErrorInitialize,
            Self::UnknownSignatureScheme(_) | Self::InvalidSignature => Outcome::ErrorCr,
            Self::InvalidCounterpartyResponse => Outcome::ErrorVp,
            Self::MalformedRequest(_)
            | Self::MissingCounterpartyResponse
            | Self::MalformedCounterpartyResponse(_)
            | Self::MalformedConsent(_)
            | Self::KeyOwnershipMismatch { .. }
            | Self::Transport(_)
            | Self::Store(_)
            | Self::Presentation(_)
            | Self::Signer(_) => Outcome::Error,
        }
    }
}
