use thiserror::Error;
use vp_crypto::CryptoError;

use crate::model::error::ModelError;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("No signer registered for signature type `{0}`")]
    UnknownSignatureScheme(String),
    #[error("No presentation signer registered")]
    NoPresentationSigner,
    #[error("Crypto error: `{0}`")]
    CryptoError(#[from] CryptoError),
    #[error("Model error: `{0}`")]
    ModelError(#[from] ModelError),
    #[error("JSON error: `{0}`")]
    JsonError(#[from] serde_json::Error),
}
