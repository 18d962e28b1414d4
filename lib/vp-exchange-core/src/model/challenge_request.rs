use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use super::error::ModelError;
use super::proof::Proof;

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPredicate {
    pub predicate: String,
    pub allowed_issuers: Option<Vec<String>>,
}

impl RequestPredicate {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            allowed_issuers: None,
        }
    }

    pub fn accepts_issuer(&self, issuer: &str) -> bool {
        match &self.allowed_issuers {
            Some(allowed) if !allowed.is_empty() => allowed.iter().any(|entry| entry == issuer),
            _ => true,
        }
    }
}

/// Signed request of a counterparty (issuer or verifier) opening a negotiation.
///
/// Immutable once constructed; construction fails when a required field is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ChallengeRequestDTO")]
pub struct ChallengeRequest {
    correspondence_id: String,
    to_attest: Vec<RequestPredicate>,
    to_verify: Vec<RequestPredicate>,
    post_endpoint: String,
    proof: Proof,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequestDTO {
    correspondence_id: Option<String>,
    to_attest: Option<Vec<RequestPredicate>>,
    to_verify: Option<Vec<RequestPredicate>>,
    post_endpoint: Option<String>,
    proof: Option<Proof>,
}

impl TryFrom<ChallengeRequestDTO> for ChallengeRequest {
    type Error = ModelError;

    fn try_from(value: ChallengeRequestDTO) -> Result<Self, Self::Error> {
        let (Some(correspondence_id), Some(post_endpoint), Some(proof)) =
            (value.correspondence_id, value.post_endpoint, value.proof)
        else {
            return Err(ModelError::EmptyFields);
        };

        Self::new(
            correspondence_id,
            value.to_attest.unwrap_or_default(),
            value.to_verify.unwrap_or_default(),
            post_endpoint,
            proof,
        )
    }
}

impl ChallengeRequest {
    pub fn new(
        correspondence_id: impl Into<String>,
        to_attest: Vec<RequestPredicate>,
        to_verify: Vec<RequestPredicate>,
        post_endpoint: impl Into<String>,
        proof: Proof,
    ) -> Result<Self, ModelError> {
        let correspondence_id = correspondence_id.into();
        let post_endpoint = post_endpoint.into();

        if correspondence_id.is_empty() || post_endpoint.is_empty() || !proof.has_required_fields()
        {
            return Err(ModelError::EmptyFields);
        }

        Ok(Self {
            correspondence_id,
            to_attest,
            to_verify,
            post_endpoint,
            proof,
        })
    }

    /// Parses an untyped host payload
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        let dto: ChallengeRequestDTO = serde_json::from_value(value)?;
        dto.try_into()
    }

    pub fn correspondence_id(&self) -> &str {
        &self.correspondence_id
    }

    pub fn to_attest(&self) -> &[RequestPredicate] {
        &self.to_attest
    }

    pub fn to_verify(&self) -> &[RequestPredicate] {
        &self.to_verify
    }

    pub fn post_endpoint(&self) -> &str {
        &self.post_endpoint
    }

    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    /// Returns a copy carrying a different proof, used when (re-)signing
    pub fn with_proof(&self, proof: Proof) -> Self {
        Self {
            proof,
            ..self.clone()
        }
    }
}
