//! Signers backed by the local key material.
//!
//! The signing input of any document is the canonical JSON of
//! `{"document": <document without "proof">, "proof": <proof without "signatureValue">}`,
//! so proofs can be added or verified one at a time.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;
use vp_crypto::CryptUtil;

use super::error::SignerError;
use super::{ChallengeRequestSigner, PresentationSigner, SignatureScheme};
use crate::model::challenge_request::ChallengeRequest;
use crate::model::credential::{CredentialParams, VerifiableCredential};
use crate::model::did_info::DidInfo;
use crate::model::presentation::{PresentationParams, VerifiablePresentation};
use crate::model::proof::Proof;

pub(crate) fn signing_input<T: Serialize>(
    document: &T,
    proof: &Proof,
) -> Result<Vec<u8>, SignerError> {
    let mut document = serde_json::to_value(document)?;
    if let Value::Object(fields) = &mut document {
        fields.remove("proof");
    }

    let proof = Proof {
        signature_value: None,
        ..proof.clone()
    };

    Ok(serde_json::to_vec(&json!({ "document": document, "proof": proof }))?)
}

struct ProofSigner {
    crypt_util: Arc<dyn CryptUtil>,
    scheme: SignatureScheme,
}

impl ProofSigner {
    fn new(crypt_util: Arc<dyn CryptUtil>) -> Self {
        let scheme = SignatureScheme::from_algorithm(crypt_util.algorithm_name());
        Self { crypt_util, scheme }
    }

    fn unsigned_proof(&self, did_info: DidInfo, nonce: &str) -> Result<Proof, SignerError> {
        let address = self
            .crypt_util
            .derive_public_address(did_info.account_id, did_info.key_id)?;

        Ok(Proof::unsigned(self.scheme.as_str(), address, nonce))
    }

    fn sign<T: Serialize>(
        &self,
        document: &T,
        proof: Proof,
        did_info: DidInfo,
    ) -> Result<Proof, SignerError> {
        let input = signing_input(document, &proof)?;
        let signature =
            self.crypt_util
                .sign_payload(did_info.account_id, did_info.key_id, &input)?;

        Ok(Proof {
            signature_value: Some(signature),
            ..proof
        })
    }

    fn verify<T: Serialize>(&self, document: &T, proof: &Proof) -> bool {
        let Some(signature) = proof.signature_value.as_deref() else {
            tracing::debug!(nonce = %proof.nonce, "Proof carries no signature value");
            return false;
        };

        let result = signing_input(document, proof).and_then(|input| {
            self.crypt_util
                .verify_payload(&input, &proof.verification_method, signature)
                .map_err(SignerError::from)
        });

        match result {
            Ok(valid) => valid,
            Err(error) => {
                tracing::debug!(%error, nonce = %proof.nonce, "Proof verification failed");
                false
            }
        }
    }
}

pub struct CryptChallengeRequestSigner {
    inner: ProofSigner,
}

impl CryptChallengeRequestSigner {
    pub fn new(crypt_util: Arc<dyn CryptUtil>) -> Self {
        Self {
            inner: ProofSigner::new(crypt_util),
        }
    }

    /// Signs on behalf of a counterparty; the proof nonce is freshly generated
    pub fn sign_challenge_request(
        &self,
        request: &ChallengeRequest,
        did_info: DidInfo,
    ) -> Result<ChallengeRequest, SignerError> {
        let proof = self
            .inner
            .unsigned_proof(did_info, &Uuid::new_v4().to_string())?;
        let unsigned = request.with_proof(proof.clone());
        let proof = self.inner.sign(&unsigned, proof, did_info)?;

        Ok(unsigned.with_proof(proof))
    }
}

impl ChallengeRequestSigner for CryptChallengeRequestSigner {
    fn signature_scheme(&self) -> SignatureScheme {
        self.inner.scheme.clone()
    }

    fn verify_challenge_request(&self, request: &ChallengeRequest) -> bool {
        self.inner.verify(request, request.proof())
    }
}

pub struct CryptCredentialSigner {
    inner: ProofSigner,
}

impl CryptCredentialSigner {
    pub fn new(crypt_util: Arc<dyn CryptUtil>) -> Self {
        Self {
            inner: ProofSigner::new(crypt_util),
        }
    }

    /// The proof nonce identifies the credential in transaction records
    pub fn sign_credential(
        &self,
        params: CredentialParams,
        did_info: DidInfo,
    ) -> Result<VerifiableCredential, SignerError> {
        let proof = self
            .inner
            .unsigned_proof(did_info, &Uuid::new_v4().to_string())?;

        let mut credential = VerifiableCredential {
            context: params.context,
            id: params.id,
            r#type: params.r#type,
            issuer: params.issuer,
            issuance_date: params.issuance_date,
            credential_subject: params.credential_subject,
            proof: proof.clone(),
        };
        credential.proof = self.inner.sign(&credential, proof, did_info)?;

        Ok(credential)
    }

    pub fn verify_credential(&self, credential: &VerifiableCredential) -> bool {
        self.inner.verify(credential, &credential.proof)
    }
}

pub struct CryptPresentationSigner {
    inner: ProofSigner,
    credential_signer: CryptCredentialSigner,
}

impl CryptPresentationSigner {
    pub fn new(crypt_util: Arc<dyn CryptUtil>) -> Self {
        Self {
            inner: ProofSigner::new(crypt_util.clone()),
            credential_signer: CryptCredentialSigner::new(crypt_util),
        }
    }

    /// Adds one proof per key, each carrying the correspondence id as nonce
    pub fn sign_presentation(
        &self,
        params: PresentationParams,
        did_info: &[DidInfo],
        correspondence_id: &str,
    ) -> Result<VerifiablePresentation, SignerError> {
        let presentation =
            VerifiablePresentation::new(params.r#type, params.verifiable_credential, vec![])?;

        let proofs = did_info
            .iter()
            .map(|did_info| {
                let proof = self.inner.unsigned_proof(*did_info, correspondence_id)?;
                self.inner.sign(&presentation, proof, *did_info)
            })
            .collect::<Result<Vec<_>, SignerError>>()?;

        Ok(presentation.with_proofs(proofs))
    }
}

impl PresentationSigner for CryptPresentationSigner {
    fn signature_scheme(&self) -> SignatureScheme {
        self.inner.scheme.clone()
    }

    fn verify_presentation(&self, presentation: &VerifiablePresentation) -> bool {
        presentation
            .proof()
            .iter()
            .all(|proof| self.inner.verify(presentation, proof))
            && presentation
                .verifiable_credential()
                .iter()
                .all(|credential| self.credential_signer.verify_credential(credential))
    }
}
