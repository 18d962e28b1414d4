use std::sync::Arc;

use thiserror::Error;

use super::http_client::{self, HttpClient, PostRequest};
use crate::model::presentation::VerifiablePresentation;


#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: `{0}`")]
    HttpClient(#[from] http_client::Error),
}

/// Delivers a challenge response to the counterparty
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Posts the presentation (or an empty body when there is nothing to present)
    /// and returns the raw reply, `None` when the reply is blank
    async fn post(
        &self,
        endpoint: &str,
        presentation: Option<VerifiablePresentation>,
    ) -> Result<Option<Vec<u8>>, TransportError>;
}

pub struct HttpTransport {
    client: Arc<dyn HttpClient>,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        endpoint: &str,
        presentation: Option<VerifiablePresentation>,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let request = match presentation {
            Some(presentation) => PostRequest::new(endpoint).json(&presentation)?,
            None => PostRequest::new(endpoint),
        };

        let response = self.client.post(request).await?.error_for_status()?;
        Ok(response.into_body())
    }
}
