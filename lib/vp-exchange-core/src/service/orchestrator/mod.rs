//! Drives one credential exchange per inbound event: authentication,
//! assembly, optional consent, transmission, response validation and
//! persistence.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use self::assembler::CredentialAssembler;
use self::presentation_builder::PresentationBuilder;
use super::error::ExchangeError;
use crate::Collaborators;
use crate::model::did_info::AccountId;
use crate::provider::event_channel::EventChannel;
use crate::provider::signer::registry::SignerRegistry;
use crate::provider::transport::Transport;
use crate::repository::credential_store::CredentialStore;

pub(crate) mod assembler;
pub mod consent_gate;
pub(crate) mod presentation_builder;
pub mod service;

#[cfg(test)]
mod test;

pub const ORCHESTRATOR_NAME: &str = "ProtocolOrchestrator";

pub struct ProtocolOrchestrator {
    signer_registry: SignerRegistry,
    assembler: CredentialAssembler,
    presentation_builder: PresentationBuilder,
    transport: Arc<dyn Transport>,
    credential_store: Arc<dyn CredentialStore>,
    account_id: AtomicU32,
    channel: OnceLock<Arc<dyn EventChannel>>,
}

impl ProtocolOrchestrator {
    pub fn new(collaborators: Collaborators, account_id: AccountId) -> Self {
        let Collaborators {
            challenge_request_signers,
            presentation_signers,
            presentation_factory,
            transport,
            credential_store,
            address_service,
        } = collaborators;

        Self {
            signer_registry: SignerRegistry::new(challenge_request_signers, presentation_signers),
            assembler: CredentialAssembler::new(credential_store.clone(), address_service),
            presentation_builder: PresentationBuilder::new(presentation_factory),
            transport,
            credential_store,
            account_id: AtomicU32::new(account_id),
            channel: OnceLock::new(),
        }
    }

    /// Hands over the host bus; only the first call has an effect
    pub fn initialize(&self, channel: Arc<dyn EventChannel>) -> bool {
        let initialized = self.channel.set(channel).is_ok();
        if !initialized {
            tracing::warn!("Orchestrator already initialized, keeping the first channel");
        }
        initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.get().is_some()
    }

    /// Takes effect for requests arriving after the call
    pub fn set_active_account(&self, account_id: AccountId) {
        self.account_id.store(account_id, Ordering::SeqCst);
    }

    pub fn active_account(&self) -> AccountId {
        self.account_id.load(Ordering::SeqCst)
    }

    fn channel(&self) -> Result<Arc<dyn EventChannel>, ExchangeError> {
        self.channel
            .get()
            .cloned()
            .ok_or(ExchangeError::NotInitialized)
    }
}
