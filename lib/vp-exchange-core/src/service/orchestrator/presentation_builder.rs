use std::sync::Arc;

use crate::model::credential::{SelfAttestedCredential, VerifiableCredential};
use crate::model::did_info::DidInfo;
use crate::model::presentation::{
    CHALLENGE_RESPONSE_TYPE, PresentationParams, VERIFIABLE_PRESENTATION_TYPE,
    VerifiablePresentation,
};
use crate::provider::presentation_factory::PresentationFactory;
use crate::service::error::ExchangeError;

pub(crate) struct PresentationBuilder {
    factory: Arc<dyn PresentationFactory>,
}

impl PresentationBuilder {
    pub fn new(factory: Arc<dyn PresentationFactory>) -> Self {
        Self { factory }
    }

    /// Self-attested credentials come first, both in the envelope and in the key list.
    /// Returns `None` when there is nothing to present.
    pub fn build(
        &self,
        self_attested: &[SelfAttestedCredential],
        matching: &[VerifiableCredential],
        matching_did_info: &[DidInfo],
        correspondence_id: &str,
    ) -> Result<Option<VerifiablePresentation>, ExchangeError> {
        if self_attested.is_empty() && matching.is_empty() {
            return Ok(None);
        }

        let verifiable_credential = self_attested
            .iter()
            .map(|attested| attested.credential.clone())
            .chain(matching.iter().cloned())
            .collect();

        let did_info: Vec<DidInfo> = self_attested
            .iter()
            .map(|attested| attested.did_info)
            .chain(matching_did_info.iter().copied())
            .collect();

        let presentation = self.factory.generate_verifiable_presentation(
            PresentationParams {
                r#type: vec![
                    VERIFIABLE_PRESENTATION_TYPE.to_owned(),
                    CHALLENGE_RESPONSE_TYPE.to_owned(),
                ],
                verifiable_credential,
            },
            &did_info,
            correspondence_id,
        )?;

        Ok(Some(presentation))
    }
}
