use std::sync::Arc;

use super::error::StoreError;
use crate::model::challenge_request::ChallengeRequest;
use crate::model::consent::MissingPredicate;
use crate::model::credential::{SelfAttestedCredential, VerifiableCredential};
use crate::model::did_info::AccountId;
use crate::provider::event_channel::EventChannel;

/// Stored credentials satisfying a request, and the predicates nothing satisfies
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VcSearchResult {
    pub matching: Vec<VerifiableCredential>,
    pub missing: Vec<MissingPredicate>,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// One locally signed credential per `toAttest` predicate
    async fn generate_self_attested(
        &self,
        request: &ChallengeRequest,
        account_id: AccountId,
        channel: Arc<dyn EventChannel>,
    ) -> Result<Vec<SelfAttestedCredential>, StoreError>;

    async fn find_matching(
        &self,
        request: &ChallengeRequest,
        channel: Arc<dyn EventChannel>,
    ) -> Result<VcSearchResult, StoreError>;

    async fn record_transaction(
        &self,
        verifier_key: &str,
        disclosed_nonces: Vec<String>,
        issued_credentials: Vec<VerifiableCredential>,
        channel: Arc<dyn EventChannel>,
    ) -> Result<(), StoreError>;
}
