use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use super::credential::VerifiableCredential;
use super::error::ModelError;
use super::proof::Proof;

pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";
pub const CHALLENGE_RESPONSE_TYPE: &str = "ChallengeResponse";

/// Envelope of one or more credentials and one proof per signing key.
///
/// Never empty: an exchange with nothing to present carries no presentation at all.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "VerifiablePresentationDTO")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context", skip_serializing_if = "Vec::is_empty")]
    context: Vec<String>,
    id: Option<String>,
    r#type: Vec<String>,
    verifiable_credential: Vec<VerifiableCredential>,
    proof: Vec<Proof>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifiablePresentationDTO {
    #[serde(rename = "@context", default)]
    context: Vec<String>,
    id: Option<String>,
    #[serde(default)]
    r#type: Vec<String>,
    #[serde(default)]
    verifiable_credential: Vec<VerifiableCredential>,
    #[serde(default)]
    proof: Vec<Proof>,
}

impl TryFrom<VerifiablePresentationDTO> for VerifiablePresentation {
    type Error = ModelError;

    fn try_from(value: VerifiablePresentationDTO) -> Result<Self, Self::Error> {
        let mut presentation = Self::new(value.r#type, value.verifiable_credential, value.proof)?;
        presentation.context = value.context;
        presentation.id = value.id;
        Ok(presentation)
    }
}

/// Content of a presentation before it gets signed
#[derive(Clone, Debug, PartialEq)]
pub struct PresentationParams {
    pub r#type: Vec<String>,
    pub verifiable_credential: Vec<VerifiableCredential>,
}

impl VerifiablePresentation {
    pub fn new(
        r#type: Vec<String>,
        verifiable_credential: Vec<VerifiableCredential>,
        proof: Vec<Proof>,
    ) -> Result<Self, ModelError> {
        if verifiable_credential.is_empty() {
            return Err(ModelError::EmptyPresentation);
        }

        let mut r#type = r#type;
        if !r#type.iter().any(|entry| entry == VERIFIABLE_PRESENTATION_TYPE) {
            r#type.insert(0, VERIFIABLE_PRESENTATION_TYPE.to_owned());
        }

        Ok(Self {
            context: vec![],
            id: None,
            r#type,
            verifiable_credential,
            proof,
        })
    }

    /// Parses an untyped counterparty response
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn r#type(&self) -> &[String] {
        &self.r#type
    }

    pub fn verifiable_credential(&self) -> &[VerifiableCredential] {
        &self.verifiable_credential
    }

    pub fn into_verifiable_credential(self) -> Vec<VerifiableCredential> {
        self.verifiable_credential
    }

    pub fn proof(&self) -> &[Proof] {
        &self.proof
    }

    /// Returns a copy carrying different proofs, used when signing
    pub fn with_proofs(&self, proof: Vec<Proof>) -> Self {
        Self {
            proof,
            ..self.clone()
        }
    }
}
