//! Minimal HTTP abstraction used to reach counterparties.

pub mod reqwest_client;

use std::collections::HashMap;
use std::fmt::Display;
use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

pub type Headers = HashMap<String, String>;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(&self, request: PostRequest) -> Result<Response, Error>;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Other HTTP client error: {0}")]
    Other(String),
    #[error("HTTP status code is error: {0}")]
    StatusCodeIsError(StatusCode),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.0)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostRequest {
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl PostRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            ..Default::default()
        }
    }

    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert("Content-Type".to_owned(), "application/json".to_owned());
        Ok(self)
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    pub url: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    #[track_caller]
    pub fn error_for_status(self) -> Result<Self, Error> {
        if !self.status.is_error() {
            tracing::debug!(url = %self.url, status = %self.status, "POST succeeded");
            tracing::trace!(body = %String::from_utf8_lossy(&self.body), "Response body");
            return Ok(self);
        }

        let location = Location::caller();
        tracing::error!(url = %self.url, status = %self.status, %location, "POST failed");
        Err(Error::StatusCodeIsError(self.status))
    }

    /// `None` for a blank body
    pub fn into_body(self) -> Option<Vec<u8>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(self.body)
        }
    }
}
