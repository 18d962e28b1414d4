use std::sync::Arc;

use vp_crypto::CryptUtil;

use crate::config::core_config::ExchangeConfig;
use crate::provider::event_channel::EventChannel;
use crate::provider::http_client::reqwest_client::ReqwestClient;
use crate::provider::presentation_factory::{PresentationFactory, SigningPresentationGenerator};
use crate::provider::signer::crypt_signer::{CryptChallengeRequestSigner, CryptPresentationSigner};
use crate::provider::signer::{ChallengeRequestSigner, PresentationSigner};
use crate::provider::transport::{HttpTransport, Transport, TransportError};
use crate::repository::address_service::AddressService;
use crate::repository::credential_store::CredentialStore;
use crate::repository::in_memory::InMemoryWallet;
use crate::service::orchestrator::ProtocolOrchestrator;

pub mod config;
pub mod model;
pub mod provider;
pub mod repository;
pub mod service;

/// Every collaborator of the orchestrator.
///
/// Start from [`Collaborators::with_defaults`] and override single fields
/// with struct update syntax.
#[derive(Clone)]
pub struct Collaborators {
    /// Tried in order, first match wins
    pub challenge_request_signers: Vec<Arc<dyn ChallengeRequestSigner>>,
    /// Tried in order; the first one verifies presentations without a known proof type
    pub presentation_signers: Vec<Arc<dyn PresentationSigner>>,
    pub presentation_factory: Arc<dyn PresentationFactory>,
    pub transport: Arc<dyn Transport>,
    pub credential_store: Arc<dyn CredentialStore>,
    pub address_service: Arc<dyn AddressService>,
}

impl Collaborators {
    pub fn with_defaults(
        config: &ExchangeConfig,
        crypt_util: Arc<dyn CryptUtil>,
        wallet: Arc<InMemoryWallet>,
    ) -> Result<Self, TransportError> {
        let presentation_signer = Arc::new(CryptPresentationSigner::new(crypt_util.clone()));
        let challenge_request_signer: Arc<dyn ChallengeRequestSigner> =
            Arc::new(CryptChallengeRequestSigner::new(crypt_util));
        let response_signer: Arc<dyn PresentationSigner> = presentation_signer.clone();
        let client = ReqwestClient::from_config(&config.http)?;

        Ok(Self {
            challenge_request_signers: vec![challenge_request_signer],
            presentation_signers: vec![response_signer],
            presentation_factory: Arc::new(SigningPresentationGenerator::new(presentation_signer)),
            transport: Arc::new(HttpTransport::new(Arc::new(client))),
            credential_store: wallet.clone(),
            address_service: wallet,
        })
    }
}

/// Builds an orchestrator starting on the configured account and hands it the host bus
pub fn build_orchestrator(
    config: &ExchangeConfig,
    collaborators: Collaborators,
    channel: Arc<dyn EventChannel>,
) -> ProtocolOrchestrator {
    let orchestrator = ProtocolOrchestrator::new(collaborators, config.account_id);
    orchestrator.initialize(channel);
    orchestrator
}
