use std::sync::Arc;

use crate::model::challenge_request::ChallengeRequest;
use crate::model::credential::SelfAttestedCredential;
use crate::model::did_info::{AccountId, DidInfo};
use crate::provider::event_channel::EventChannel;
use crate::repository::address_service::AddressService;
use crate::repository::credential_store::{CredentialStore, VcSearchResult};
use crate::service::error::ExchangeError;

pub(crate) struct AssembledCredentials {
    pub self_attested: Vec<SelfAttestedCredential>,
    pub search_result: VcSearchResult,
    /// Key owning each matching credential, same order as `search_result.matching`
    pub matching_did_info: Vec<DidInfo>,
}

pub(crate) struct CredentialAssembler {
    credential_store: Arc<dyn CredentialStore>,
    address_service: Arc<dyn AddressService>,
}

impl CredentialAssembler {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        address_service: Arc<dyn AddressService>,
    ) -> Self {
        Self {
            credential_store,
            address_service,
        }
    }

    pub async fn assemble(
        &self,
        request: &ChallengeRequest,
        account_id: AccountId,
        channel: Arc<dyn EventChannel>,
    ) -> Result<AssembledCredentials, ExchangeError> {
        let (self_attested, search_result) = futures::try_join!(
            self.credential_store
                .generate_self_attested(request, account_id, channel.clone()),
            self.credential_store.find_matching(request, channel.clone()),
        )?;

        let matching_did_info = if search_result.matching.is_empty() {
            vec![]
        } else {
            self.address_service
                .resolve_key_ownership(&search_result.matching, channel)
                .await?
        };

        if matching_did_info.len() != search_result.matching.len() {
            return Err(ExchangeError::KeyOwnershipMismatch {
                credentials: search_result.matching.len(),
                keys: matching_did_info.len(),
            });
        }

        tracing::debug!(
            self_attested = self_attested.len(),
            matching = search_result.matching.len(),
            missing = search_result.missing.len(),
            "Credentials assembled"
        );

        Ok(AssembledCredentials {
            self_attested,
            search_result,
            matching_did_info,
        })
    }
}
