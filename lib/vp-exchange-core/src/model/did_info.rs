use serde::{Deserialize, Serialize};

pub type AccountId = u32;
pub type KeyId = u32;

/// Account/key pair that must sign on behalf of one credential in a presentation
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidInfo {
    pub account_id: AccountId,
    pub key_id: KeyId,
}

impl DidInfo {
    pub fn new(account_id: AccountId, key_id: KeyId) -> Self {
        Self { account_id, key_id }
    }
}
