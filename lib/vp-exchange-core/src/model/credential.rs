use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

use super::did_info::DidInfo;
use super::proof::Proof;

pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Marks self-attested proofs of key control. Such credentials are never
/// recorded as disclosed claims.
pub const DID_OWNERSHIP_TYPE: &str = "DidOwnership";

/// Subject claims keep their wire order
pub type CredentialSubject = IndexMap<String, Value>;

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    pub id: Option<String>,
    pub r#type: Vec<String>,
    pub issuer: String,
    #[serde(with = "time::serde::rfc3339")]
    pub issuance_date: OffsetDateTime,
    pub credential_subject: CredentialSubject,
    pub proof: Proof,
}

impl VerifiableCredential {
    pub fn has_type(&self, r#type: &str) -> bool {
        self.r#type.iter().any(|entry| entry == r#type)
    }

    pub fn is_did_ownership(&self) -> bool {
        self.has_type(DID_OWNERSHIP_TYPE)
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// Subject fields other than the subject identifier, in wire order
    pub fn disclosable_claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.credential_subject
            .iter()
            .filter(|(predicate, _)| predicate.as_str() != "id")
    }
}

/// Fields of a credential before it gets signed
#[derive(Clone, Debug, PartialEq)]
pub struct CredentialParams {
    pub context: Vec<String>,
    pub id: Option<String>,
    pub r#type: Vec<String>,
    pub issuer: String,
    pub issuance_date: OffsetDateTime,
    pub credential_subject: CredentialSubject,
}

/// A locally signed credential together with the key that signed it
#[derive(Clone, Debug, PartialEq)]
pub struct SelfAttestedCredential {
    pub credential: VerifiableCredential,
    pub did_info: DidInfo,
}
