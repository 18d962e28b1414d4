//! Decides whether the user has to confirm a disclosure, and carries the
//! suspended exchange through the host until consent arrives.

use serde_json::Value;

use crate::model::challenge_request::ChallengeRequest;
use crate::model::consent::{ConsentContext, ConsentRequest, CredentialConsentData};
use crate::model::credential::VerifiableCredential;
use crate::model::message::Message;
use crate::repository::credential_store::VcSearchResult;
use crate::service::error::ExchangeError;

pub fn requires_consent(request: &ChallengeRequest) -> bool {
    !request.to_verify().is_empty()
}

/// Claims shown to the user, one per matching credential.
///
/// Only the first non-id subject field of a credential is surfaced.
// TODO: surface every disclosed field once consent data carries per-field purpose metadata
pub fn claims_to_confirm(matching: &[VerifiableCredential]) -> Vec<CredentialConsentData> {
    matching
        .iter()
        .filter_map(|credential| {
            credential
                .disclosable_claims()
                .next()
                .map(|(predicate, value)| CredentialConsentData {
                    predicate: predicate.clone(),
                    value: value.clone(),
                    issuer: credential.issuer.clone(),
                })
        })
        .collect()
}

pub fn consent_request(context: ConsentContext, search_result: &VcSearchResult) -> ConsentRequest {
    ConsentRequest {
        attestations_to_confirm: claims_to_confirm(&search_result.matching),
        missing_attestations: search_result.missing.clone(),
        challenge_request: context.challenge_request,
        verifiable_presentation: context.verifiable_presentation,
    }
}

/// Restores the suspended exchange from an `accept-consent` event
pub fn resume(message: &Message) -> Result<ConsentContext, ExchangeError> {
    serde_json::from_value(Value::Object(message.properties.clone()))
        .map_err(ExchangeError::MalformedConsent)
}
