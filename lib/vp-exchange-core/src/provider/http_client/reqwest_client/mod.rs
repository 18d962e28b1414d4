use std::time::Duration;

use super::{Error, HttpClient, PostRequest, Response, StatusCode};
use crate::config::core_config::HttpConfig;

#[derive(Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn from_config(config: &HttpConfig) -> Result<Self, Error> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build().map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, request: PostRequest) -> Result<Response, Error> {
        tracing::trace!(url = %request.url, headers = ?request.headers, "Sending POST");

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = StatusCode(response.status().as_u16());
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        Ok(Response {
            url: request.url,
            status,
            body: body.to_vec(),
        })
    }
}
