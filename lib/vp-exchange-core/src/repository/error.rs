use thiserror::Error;
use vp_crypto::CryptoError;

use crate::provider::event_channel::ChannelError;
use crate::provider::signer::error::SignerError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No key found for credential subject `{0}`")]
    UnknownKeyOwner(String),
    #[error("Credential has no subject id")]
    MissingSubjectId,
    #[error("Signer error: `{0}`")]
    Signer(#[from] SignerError),
    #[error("Crypto error: `{0}`")]
    Crypto(#[from] CryptoError),
    #[error("Channel error: `{0}`")]
    Channel(#[from] ChannelError),
    #[error("JSON error: `{0}`")]
    JsonError(#[from] serde_json::Error),
}
