use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use super::consent::{ConsentContext, ConsentRequest};

pub const PROCESS_CHALLENGE_REQUEST: &str = "process-challengerequest";
pub const ACCEPT_CONSENT: &str = "accept-consent";

/// Property of a `process-challengerequest` event holding the challenge request
pub const CHALLENGE_REQUEST_PAYLOAD: &str = "msg";

/// Inbound host event: a `type` plus free-form properties
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub r#type: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Message {
    pub fn new(r#type: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn process_challenge_request(payload: Value) -> Self {
        Self::new(PROCESS_CHALLENGE_REQUEST).with_property(CHALLENGE_REQUEST_PAYLOAD, payload)
    }

    /// Resumes a suspended exchange once the user agreed to disclose
    pub fn accept_consent(context: &ConsentContext) -> Result<Self, serde_json::Error> {
        let Value::Object(properties) = serde_json::to_value(context)? else {
            return Ok(Self::new(ACCEPT_CONSENT));
        };

        Ok(Self {
            r#type: ACCEPT_CONSENT.to_owned(),
            properties,
        })
    }

    /// `null` properties count as absent
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|value| !value.is_null())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub status_code: u16,
    pub body: NotificationBody,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotificationBody {
    ConsentRequest(Box<ConsentRequest>),
    Created {},
    Failure { error: String },
}

impl Notification {
    pub const STATUS_CONSENT_REQUEST: u16 = 200;
    pub const STATUS_CREATED: u16 = 201;
    pub const STATUS_FAILURE: u16 = 500;

    pub fn consent_request(request: ConsentRequest) -> Self {
        Self {
            status_code: Self::STATUS_CONSENT_REQUEST,
            body: NotificationBody::ConsentRequest(Box::new(request)),
        }
    }

    pub fn created() -> Self {
        Self {
            status_code: Self::STATUS_CREATED,
            body: NotificationBody::Created {},
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status_code: Self::STATUS_FAILURE,
            body: NotificationBody::Failure {
                error: error.into(),
            },
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            NotificationBody::Failure { error } => Some(error),
            _ => None,
        }
    }

    pub fn consent(&self) -> Option<&ConsentRequest> {
        match &self.body {
            NotificationBody::ConsentRequest(request) => Some(request),
            _ => None,
        }
    }
}

/// Terminal result of handling one inbound event
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
pub enum Outcome {
    #[strum(serialize = "ignored")]
    #[serde(rename = "ignored")]
    Ignored,
    #[strum(serialize = "success")]
    #[serde(rename = "success")]
    Success,
    #[strum(serialize = "error")]
    #[serde(rename = "error")]
    Error,
    #[strum(serialize = "error-initialize")]
    #[serde(rename = "error-initialize")]
    ErrorInitialize,
    #[strum(serialize = "error-cr")]
    #[serde(rename = "error-cr")]
    ErrorCr,
    #[strum(serialize = "error-vp")]
    #[serde(rename = "error-vp")]
    ErrorVp,
}
