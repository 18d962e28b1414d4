use std::sync::Arc;

use super::error::StoreError;
use crate::model::credential::VerifiableCredential;
use crate::model::did_info::DidInfo;
use crate::provider::event_channel::EventChannel;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait AddressService: Send + Sync {
    /// Account/key pair owning the subject of each credential, in input order
    async fn resolve_key_ownership(
        &self,
        credentials: &[VerifiableCredential],
        channel: Arc<dyn EventChannel>,
    ) -> Result<Vec<DidInfo>, StoreError>;
}
