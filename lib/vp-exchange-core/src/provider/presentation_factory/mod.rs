use std::sync::Arc;

use thiserror::Error;

use crate::model::did_info::DidInfo;
use crate::model::presentation::{PresentationParams, VerifiablePresentation};
use crate::provider::signer::crypt_signer::CryptPresentationSigner;
use crate::provider::signer::error::SignerError;

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("Presentation signing failed: `{0}`")]
    Signing(#[from] SignerError),
}

/// Builds a signed presentation out of credentials and the keys owning them
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait PresentationFactory: Send + Sync {
    fn generate_verifiable_presentation(
        &self,
        params: PresentationParams,
        did_info: &[DidInfo],
        correspondence_id: &str,
    ) -> Result<VerifiablePresentation, PresentationError>;
}

pub struct SigningPresentationGenerator {
    signer: Arc<CryptPresentationSigner>,
}

impl SigningPresentationGenerator {
    pub fn new(signer: Arc<CryptPresentationSigner>) -> Self {
        Self { signer }
    }
}

impl PresentationFactory for SigningPresentationGenerator {
    fn generate_verifiable_presentation(
        &self,
        params: PresentationParams,
        did_info: &[DidInfo],
        correspondence_id: &str,
    ) -> Result<VerifiablePresentation, PresentationError> {
        Ok(self
            .signer
            .sign_presentation(params, did_info, correspondence_id)?)
    }
}
