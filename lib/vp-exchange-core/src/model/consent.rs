use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::challenge_request::ChallengeRequest;
use super::presentation::VerifiablePresentation;

/// One claim the user is asked to disclose
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialConsentData {
    pub predicate: String,
    pub value: Value,
    pub issuer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPredicate {
    pub predicate: String,
    pub reason: String,
}

impl MissingPredicate {
    pub fn missing(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            reason: "missing".to_owned(),
        }
    }
}

/// Body of the consent-request notification
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    pub attestations_to_confirm: Vec<CredentialConsentData>,
    pub missing_attestations: Vec<MissingPredicate>,
    pub challenge_request: ChallengeRequest,
    pub verifiable_presentation: Option<VerifiablePresentation>,
}

impl ConsentRequest {
    /// The pair the host hands back once consent is given
    pub fn context(&self) -> ConsentContext {
        ConsentContext {
            challenge_request: self.challenge_request.clone(),
            verifiable_presentation: self.verifiable_presentation.clone(),
        }
    }
}

/// A not-yet-sent request and its candidate presentation.
///
/// Not persisted: the host hands the pair back verbatim in an `accept-consent` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentContext {
    pub challenge_request: ChallengeRequest,
    pub verifiable_presentation: Option<VerifiablePresentation>,
}
