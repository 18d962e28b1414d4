use std::sync::Arc;

use serde_json::Value;

use super::{ORCHESTRATOR_NAME, ProtocolOrchestrator, consent_gate};
use crate::model::challenge_request::ChallengeRequest;
use crate::model::consent::ConsentContext;
use crate::model::credential::VerifiableCredential;
use crate::model::error::ModelError;
use crate::model::message::{
    ACCEPT_CONSENT, CHALLENGE_REQUEST_PAYLOAD, Message, Notification, Outcome,
    PROCESS_CHALLENGE_REQUEST,
};
use crate::model::presentation::VerifiablePresentation;
use crate::provider::event_channel::{EventChannel, EventProcessor, Notifier};
use crate::provider::signer::error::SignerError;
use crate::service::error::ExchangeError;

#[async_trait::async_trait]
impl EventProcessor for ProtocolOrchestrator {
    fn name(&self) -> &str {
        ORCHESTRATOR_NAME
    }

    async fn handle_event(&self, message: Message, notifier: &dyn Notifier) -> Outcome {
        match message.r#type.as_str() {
            ACCEPT_CONSENT => {
                let result = self.accept_consent(&message, notifier).await;
                finish(result, notifier)
            }
            PROCESS_CHALLENGE_REQUEST => {
                let Some(payload) = message.property(CHALLENGE_REQUEST_PAYLOAD) else {
                    tracing::debug!("Challenge request event without payload");
                    return Outcome::Ignored;
                };

                let result = self
                    .process_challenge_request(payload.clone(), notifier)
                    .await;
                finish(result, notifier)
            }
            other => {
                tracing::trace!(message_type = other, "Message not addressed to orchestrator");
                Outcome::Ignored
            }
        }
    }
}

impl ProtocolOrchestrator {
    async fn process_challenge_request(
        &self,
        payload: Value,
        notifier: &dyn Notifier,
    ) -> Result<Outcome, ExchangeError> {
        let channel = self.channel()?;

        let request =
            ChallengeRequest::from_json(payload).map_err(ExchangeError::MalformedRequest)?;
        self.authenticate(&request)?;
        tracing::debug!(
            correspondence_id = request.correspondence_id(),
            "Challenge request authenticated"
        );

        let account_id = self.active_account();
        let assembled = self
            .assembler
            .assemble(&request, account_id, channel.clone())
            .await?;

        let presentation = self.presentation_builder.build(
            &assembled.self_attested,
            &assembled.search_result.matching,
            &assembled.matching_did_info,
            request.correspondence_id(),
        )?;

        let context = ConsentContext {
            challenge_request: request,
            verifiable_presentation: presentation,
        };

        if consent_gate::requires_consent(&context.challenge_request) {
            tracing::debug!(
                correspondence_id = context.challenge_request.correspondence_id(),
                "Awaiting consent"
            );
            notifier.notify(Notification::consent_request(
                consent_gate::consent_request(context, &assembled.search_result),
            ));
            return Ok(Outcome::Success);
        }

        self.complete_exchange(context, channel, notifier).await
    }

    async fn accept_consent(
        &self,
        message: &Message,
        notifier: &dyn Notifier,
    ) -> Result<Outcome, ExchangeError> {
        let channel = self.channel()?;
        let context = consent_gate::resume(message)?;

        tracing::debug!(
            correspondence_id = context.challenge_request.correspondence_id(),
            "Consent given"
        );
        self.complete_exchange(context, channel, notifier).await
    }

    fn authenticate(&self, request: &ChallengeRequest) -> Result<(), ExchangeError> {
        let signer = self
            .signer_registry
            .resolve_challenge_request_signer(&request.proof().r#type)
            .map_err(|error| match error {
                SignerError::UnknownSignatureScheme(scheme) => {
                    ExchangeError::UnknownSignatureScheme(scheme)
                }
                other => other.into(),
            })?;

        if !signer.verify_challenge_request(request) {
            return Err(ExchangeError::InvalidSignature);
        }

        Ok(())
    }

    async fn complete_exchange(
        &self,
        context: ConsentContext,
        channel: Arc<dyn EventChannel>,
        notifier: &dyn Notifier,
    ) -> Result<Outcome, ExchangeError> {
        let ConsentContext {
            challenge_request,
            verifiable_presentation,
        } = context;

        let disclosed_nonces = disclosed_nonces(verifiable_presentation.as_ref());

        let response = self
            .transport
            .post(challenge_request.post_endpoint(), verifiable_presentation)
            .await?;
        tracing::debug!(
            correspondence_id = challenge_request.correspondence_id(),
            "Challenge response delivered"
        );

        // only an issuer's reply carries a payload, anything a verifier sends back is ignored
        let issued_credentials = if challenge_request.to_attest().is_empty() {
            vec![]
        } else {
            self.validate_issuer_response(response)?
        };

        self.credential_store
            .record_transaction(
                &challenge_request.proof().verification_method,
                disclosed_nonces,
                issued_credentials,
                channel,
            )
            .await?;

        notifier.notify(Notification::created());
        Ok(Outcome::Success)
    }

    fn validate_issuer_response(
        &self,
        response: Option<Vec<u8>>,
    ) -> Result<Vec<VerifiableCredential>, ExchangeError> {
        let response = response.ok_or(ExchangeError::MissingCounterpartyResponse)?;
        let presentation = serde_json::from_slice(&response)
            .map_err(ModelError::from)
            .and_then(VerifiablePresentation::from_json)
            .map_err(ExchangeError::MalformedCounterpartyResponse)?;

        let signer = self.signer_registry.presentation_signer_for(&presentation)?;
        if !signer.verify_presentation(&presentation) {
            return Err(ExchangeError::InvalidCounterpartyResponse);
        }

        Ok(presentation.into_verifiable_credential())
    }
}

/// Nonces of the disclosed credentials; proofs of key control are not disclosures
fn disclosed_nonces(presentation: Option<&VerifiablePresentation>) -> Vec<String> {
    presentation
        .map(|presentation| {
            presentation
                .verifiable_credential()
                .iter()
                .filter(|credential| !credential.is_did_ownership())
                .map(|credential| credential.proof.nonce.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn finish(result: Result<Outcome, ExchangeError>, notifier: &dyn Notifier) -> Outcome {
    match result {
        Ok(outcome) => outcome,
        Err(error) => {
            let outcome = error.outcome();
            match outcome {
                Outcome::ErrorCr | Outcome::ErrorVp => {
                    tracing::warn!(%error, %outcome, "Exchange rejected")
                }
                _ => tracing::error!(%error, %outcome, "Exchange failed"),
            }

            notifier.notify(Notification::failure(error.to_string()));
            outcome
        }
    }
}
