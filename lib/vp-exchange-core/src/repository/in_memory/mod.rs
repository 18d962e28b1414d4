//! Wallet keeping credentials, key ownership and the transaction log in memory.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::indexmap;
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;
use vp_crypto::CryptUtil;

use super::address_service::AddressService;
use super::credential_store::{CredentialStore, VcSearchResult};
use super::error::StoreError;
use crate::model::challenge_request::ChallengeRequest;
use crate::model::consent::MissingPredicate;
use crate::model::credential::{
    CredentialParams, DID_OWNERSHIP_TYPE, SelfAttestedCredential, VERIFIABLE_CREDENTIAL_TYPE,
    VerifiableCredential,
};
use crate::model::did_info::{AccountId, DidInfo, KeyId};
use crate::model::message::Message;
use crate::provider::event_channel::EventChannel;
use crate::provider::signer::crypt_signer::CryptCredentialSigner;


/// Announced on the host bus after each recorded exchange
pub const TRANSACTION_RECORDED: &str = "transaction-recorded";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub verifier_key: String,
    pub disclosed_nonces: Vec<String>,
    pub issued_nonces: Vec<String>,
}

#[derive(Default)]
struct WalletState {
    credentials: Vec<VerifiableCredential>,
    key_owners: HashMap<String, DidInfo>,
    next_key_id: HashMap<AccountId, KeyId>,
    transactions: Vec<TransactionRecord>,
}

pub struct InMemoryWallet {
    crypt_util: Arc<dyn CryptUtil>,
    signer: CryptCredentialSigner,
    state: Mutex<WalletState>,
}

impl InMemoryWallet {
    pub fn new(crypt_util: Arc<dyn CryptUtil>) -> Self {
        Self {
            signer: CryptCredentialSigner::new(crypt_util.clone()),
            crypt_util,
            state: Mutex::new(WalletState::default()),
        }
    }

    /// Allocates the next unused key of the account and returns its address
    pub async fn new_address(&self, account_id: AccountId) -> Result<String, StoreError> {
        let mut state = self.state.lock().await;
        let (address, _) = self.allocate_key(&mut state, account_id)?;
        Ok(address)
    }

    pub async fn store_credential(&self, credential: VerifiableCredential) {
        self.state.lock().await.credentials.push(credential);
    }

    pub async fn credentials(&self) -> Vec<VerifiableCredential> {
        self.state.lock().await.credentials.clone()
    }

    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.lock().await.transactions.clone()
    }

    fn allocate_key(
        &self,
        state: &mut WalletState,
        account_id: AccountId,
    ) -> Result<(String, DidInfo), StoreError> {
        let key_id = state.next_key_id.get(&account_id).copied().unwrap_or_default();
        let did_info = DidInfo::new(account_id, key_id);
        let address = self.crypt_util.derive_public_address(account_id, key_id)?;

        state.next_key_id.insert(account_id, key_id + 1);
        state.key_owners.insert(address.clone(), did_info);

        Ok((address, did_info))
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryWallet {
    async fn generate_self_attested(
        &self,
        request: &ChallengeRequest,
        account_id: AccountId,
        _channel: Arc<dyn EventChannel>,
    ) -> Result<Vec<SelfAttestedCredential>, StoreError> {
        let mut state = self.state.lock().await;

        let mut result = Vec::with_capacity(request.to_attest().len());
        for predicate in request.to_attest() {
            let (address, did_info) = self.allocate_key(&mut state, account_id)?;

            let credential = self.signer.sign_credential(
                CredentialParams {
                    context: vec![],
                    id: None,
                    r#type: vec![
                        VERIFIABLE_CREDENTIAL_TYPE.to_owned(),
                        DID_OWNERSHIP_TYPE.to_owned(),
                    ],
                    issuer: address.clone(),
                    issuance_date: OffsetDateTime::now_utc(),
                    credential_subject: indexmap! {
                        "id".to_owned() => json!(address),
                        predicate.predicate.clone() => json!(address),
                    },
                },
                did_info,
            )?;

            result.push(SelfAttestedCredential {
                credential,
                did_info,
            });
        }

        tracing::debug!(
            count = result.len(),
            account_id,
            "Generated self-attested credentials"
        );
        Ok(result)
    }

    async fn find_matching(
        &self,
        request: &ChallengeRequest,
        _channel: Arc<dyn EventChannel>,
    ) -> Result<VcSearchResult, StoreError> {
        let state = self.state.lock().await;

        let mut result = VcSearchResult::default();
        for predicate in request.to_verify() {
            let found = state.credentials.iter().find(|credential| {
                !credential.is_did_ownership()
                    && credential
                        .credential_subject
                        .contains_key(&predicate.predicate)
                    && predicate.accepts_issuer(&credential.issuer)
            });

            match found {
                Some(credential) => {
                    if !result.matching.contains(credential) {
                        result.matching.push(credential.clone());
                    }
                }
                None => result
                    .missing
                    .push(MissingPredicate::missing(&predicate.predicate)),
            }
        }

        Ok(result)
    }

    async fn record_transaction(
        &self,
        verifier_key: &str,
        disclosed_nonces: Vec<String>,
        issued_credentials: Vec<VerifiableCredential>,
        channel: Arc<dyn EventChannel>,
    ) -> Result<(), StoreError> {
        let record = TransactionRecord {
            id: Uuid::new_v4(),
            created: OffsetDateTime::now_utc(),
            verifier_key: verifier_key.to_owned(),
            disclosed_nonces,
            issued_nonces: issued_credentials
                .iter()
                .map(|credential| credential.proof.nonce.clone())
                .collect(),
        };

        {
            let mut state = self.state.lock().await;
            state.credentials.extend(issued_credentials);
            state.transactions.push(record.clone());
        }

        tracing::debug!(
            transaction_id = %record.id,
            issued = record.issued_nonces.len(),
            disclosed = record.disclosed_nonces.len(),
            "Transaction recorded"
        );

        let message = Message::new(TRANSACTION_RECORDED)
            .with_property("transaction", serde_json::to_value(&record)?);
        channel.dispatch(message).await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AddressService for InMemoryWallet {
    async fn resolve_key_ownership(
        &self,
        credentials: &[VerifiableCredential],
        _channel: Arc<dyn EventChannel>,
    ) -> Result<Vec<DidInfo>, StoreError> {
        let state = self.state.lock().await;

        credentials
            .iter()
            .map(|credential| {
                let subject_id = credential.subject_id().ok_or(StoreError::MissingSubjectId)?;
                state
                    .key_owners
                    .get(subject_id)
                    .copied()
                    .ok_or_else(|| StoreError::UnknownKeyOwner(subject_id.to_owned()))
            })
            .collect()
    }
}
