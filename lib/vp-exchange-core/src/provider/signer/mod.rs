use std::fmt::{self, Display};

use crate::model::challenge_request::ChallengeRequest;
use crate::model::presentation::VerifiablePresentation;

pub mod crypt_signer;
pub mod error;
pub mod registry;


/// Identifier of a proof type, as found in `proof.type`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Ed25519Signature2019,
    Secp256k1Signature2019,
    JsonWebSignature2020,
    /// Host-defined scheme
    Other(String),
}

impl SignatureScheme {
    pub fn from_algorithm(algorithm_name: &str) -> Self {
        Self::from(format!("{algorithm_name}Signature2019").as_str())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ed25519Signature2019 => "Ed25519Signature2019",
            Self::Secp256k1Signature2019 => "Secp256k1Signature2019",
            Self::JsonWebSignature2020 => "JsonWebSignature2020",
            Self::Other(value) => value,
        }
    }

    pub fn matches(&self, proof_type: &str) -> bool {
        !proof_type.is_empty() && self.as_str() == proof_type
    }
}

impl From<&str> for SignatureScheme {
    fn from(value: &str) -> Self {
        match value {
            "Ed25519Signature2019" => Self::Ed25519Signature2019,
            "Secp256k1Signature2019" => Self::Secp256k1Signature2019,
            "JsonWebSignature2020" => Self::JsonWebSignature2020,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verifies the signature of an inbound challenge request
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ChallengeRequestSigner: Send + Sync {
    fn signature_scheme(&self) -> SignatureScheme;

    fn verify_challenge_request(&self, request: &ChallengeRequest) -> bool;
}

/// Verifies presentations returned by a counterparty
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait PresentationSigner: Send + Sync {
    fn signature_scheme(&self) -> SignatureScheme;

    fn verify_presentation(&self, presentation: &VerifiablePresentation) -> bool;
}
