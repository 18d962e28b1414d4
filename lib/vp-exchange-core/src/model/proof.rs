use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

/// Signature metadata attached to challenge requests, credentials and presentations
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub r#type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub verification_method: String,
    pub nonce: String,
    pub signature_value: Option<String>,
}

impl Proof {
    pub fn unsigned(
        r#type: impl Into<String>,
        verification_method: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            created: OffsetDateTime::now_utc(),
            verification_method: verification_method.into(),
            nonce: nonce.into(),
            signature_value: None,
        }
    }

    pub(crate) fn has_required_fields(&self) -> bool {
        !self.r#type.is_empty() && !self.verification_method.is_empty() && !self.nonce.is_empty()
    }
}
