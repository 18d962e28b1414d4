use std::sync::Arc;

use assert2::let_assert;
use mockall::predicate::eq;
use serde_json::{Value, json};

use super::ProtocolOrchestrator;
use crate::Collaborators;
use crate::model::consent::{CredentialConsentData, MissingPredicate};
use crate::model::credential::{SelfAttestedCredential, VerifiableCredential};
use crate::model::did_info::DidInfo;
use crate::model::message::{Message, Notification, Outcome};
use crate::model::presentation::VerifiablePresentation;
use crate::provider::event_channel::{EventProcessor, MockEventChannel, NotificationCollector};
use crate::provider::http_client;
use crate::provider::presentation_factory::MockPresentationFactory;
use crate::provider::signer::{
    MockChallengeRequestSigner, MockPresentationSigner, PresentationSigner, SignatureScheme,
};
use crate::provider::transport::{MockTransport, TransportError};
use crate::repository::address_service::MockAddressService;
use crate::repository::credential_store::{MockCredentialStore, VcSearchResult};

const ENDPOINT: &str = "http://domain.org/ssi/verifiable-presentation-endpoint";
const VERIFIER_KEY: &str = "did:ed25519:verifier";
const GIVEN_NAME: &str = "http://schema.org/givenName";
const FAMILY_NAME: &str = "http://schema.org/familyName";

#[derive(Default)]
struct Mocks {
    challenge_request_signer: MockChallengeRequestSigner,
    presentation_signers: Vec<MockPresentationSigner>,
    presentation_factory: MockPresentationFactory,
    transport: MockTransport,
    credential_store: MockCredentialStore,
    address_service: MockAddressService,
}

fn setup_orchestrator(mocks: Mocks) -> ProtocolOrchestrator {
    let mut challenge_request_signer = mocks.challenge_request_signer;
    challenge_request_signer
        .expect_signature_scheme()
        .returning(|| SignatureScheme::Ed25519Signature2019);

    ProtocolOrchestrator::new(
        Collaborators {
            challenge_request_signers: vec![Arc::new(challenge_request_signer)],
            presentation_signers: mocks
                .presentation_signers
                .into_iter()
                .map(|signer| Arc::new(signer) as Arc<dyn PresentationSigner>)
                .collect(),
            presentation_factory: Arc::new(mocks.presentation_factory),
            transport: Arc::new(mocks.transport),
            credential_store: Arc::new(mocks.credential_store),
            address_service: Arc::new(mocks.address_service),
        },
        0,
    )
}

fn initialized_orchestrator(mocks: Mocks) -> ProtocolOrchestrator {
    let orchestrator = setup_orchestrator(mocks);
    assert!(orchestrator.initialize(Arc::new(MockEventChannel::new())));
    orchestrator
}

async fn handle(
    orchestrator: &ProtocolOrchestrator,
    message: Message,
) -> (Outcome, Vec<Notification>) {
    let collector = NotificationCollector::new();
    let outcome = orchestrator.handle_event(message, &collector).await;
    (outcome, collector.into_notifications())
}

fn proof(r#type: &str, nonce: &str) -> Value {
    json!({
        "type": r#type,
        "created": "2019-01-01T12:34:00Z",
        "verificationMethod": VERIFIER_KEY,
        "nonce": nonce,
        "signatureValue": "signature"
    })
}

fn challenge_request(to_attest: &[&str], to_verify: &[&str]) -> Value {
    json!({
        "correspondenceId": "3ead8ae0-2d8b-41de-a54b-2d99927e458c",
        "toAttest": to_attest.iter().map(|p| json!({ "predicate": p })).collect::<Vec<_>>(),
        "toVerify": to_verify.iter().map(|p| json!({ "predicate": p })).collect::<Vec<_>>(),
        "postEndpoint": ENDPOINT,
        "proof": proof("Ed25519Signature2019", "request-nonce"),
    })
}

fn credential(types: &[&str], subject: Value, nonce: &str) -> VerifiableCredential {
    serde_json::from_value(json!({
        "type": types,
        "issuer": "did:ed25519:issuer",
        "issuanceDate": "2019-01-01T12:34:00Z",
        "credentialSubject": subject,
        "proof": proof("Ed25519Signature2019", nonce),
    }))
    .unwrap()
}

fn stored_credential() -> VerifiableCredential {
    credential(
        &["VerifiableCredential"],
        json!({ "id": "did:ed25519:holder", GIVEN_NAME: "John", FAMILY_NAME: "Doe" }),
        "stored-nonce",
    )
}

fn self_attested(predicate: &str, key_id: u32) -> SelfAttestedCredential {
    SelfAttestedCredential {
        credential: credential(
            &["VerifiableCredential", "DidOwnership"],
            json!({ "id": "did:ed25519:own", predicate: "did:ed25519:own" }),
            &format!("ownership-nonce-{key_id}"),
        ),
        did_info: DidInfo::new(0, key_id),
    }
}

fn issuer_presentation(proof_type: &str) -> Vec<u8> {
    let issued = credential(
        &["VerifiableCredential"],
        json!({ "id": "did:ed25519:own", GIVEN_NAME: "John" }),
        "issued-nonce",
    );

    serde_json::to_vec(&json!({
        "type": ["VerifiablePresentation"],
        "verifiableCredential": [issued],
        "proof": [proof(proof_type, "3ead8ae0-2d8b-41de-a54b-2d99927e458c")],
    }))
    .unwrap()
}

fn valid_challenge_request_signer() -> MockChallengeRequestSigner {
    let mut signer = MockChallengeRequestSigner::new();
    signer.expect_verify_challenge_request().returning(|_| true);
    signer
}

fn presentation_signer(scheme: &str, valid: Option<bool>) -> MockPresentationSigner {
    let scheme = SignatureScheme::from(scheme);
    let mut signer = MockPresentationSigner::new();
    signer
        .expect_signature_scheme()
        .returning(move || scheme.clone());
    match valid {
        Some(valid) => {
            signer
                .expect_verify_presentation()
                .once()
                .returning(move |_| valid);
        }
        None => {
            signer.expect_verify_presentation().never();
        }
    }
    signer
}

fn unsigned_presentation_factory() -> MockPresentationFactory {
    let mut factory = MockPresentationFactory::new();
    factory
        .expect_generate_verifiable_presentation()
        .returning(|params, _, _| {
            Ok(
                VerifiablePresentation::new(params.r#type, params.verifiable_credential, vec![])
                    .unwrap(),
            )
        });
    factory
}

fn store_finding(
    self_attested: Vec<SelfAttestedCredential>,
    search_result: VcSearchResult,
) -> MockCredentialStore {
    let mut store = MockCredentialStore::new();
    store
        .expect_generate_self_attested()
        .once()
        .returning(move |_, _, _| Ok(self_attested.clone()));
    store
        .expect_find_matching()
        .once()
        .returning(move |_, _| Ok(search_result.clone()));
    store
}

#[tokio::test]
async fn test_unknown_message_type_is_ignored() {
    let orchestrator = initialized_orchestrator(Mocks::default());

    let (outcome, notifications) = handle(&orchestrator, Message::new("some-other-event")).await;

    assert_eq!(outcome, Outcome::Ignored);
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_challenge_request_without_payload_is_ignored() {
    let orchestrator = setup_orchestrator(Mocks::default());

    let (outcome, notifications) =
        handle(&orchestrator, Message::new("process-challengerequest")).await;
    assert_eq!(outcome, Outcome::Ignored);
    assert!(notifications.is_empty());

    let (outcome, _) = handle(&orchestrator, Message::process_challenge_request(Value::Null)).await;
    assert_eq!(outcome, Outcome::Ignored);
}

#[tokio::test]
async fn test_not_initialized() {
    let orchestrator = setup_orchestrator(Mocks::default());

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[GIVEN_NAME])),
    )
    .await;

    assert_eq!(outcome, Outcome::ErrorInitialize);
    assert_eq!(
        notifications,
        vec![Notification::failure(
            "Plugin not initialized. Did you forget to call initialize() ?"
        )]
    );

    let (outcome, notifications) = handle(&orchestrator, Message::new("accept-consent")).await;
    assert_eq!(outcome, Outcome::ErrorInitialize);
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn test_initialize_only_once() {
    let orchestrator = setup_orchestrator(Mocks::default());
    assert!(!orchestrator.is_initialized());

    assert!(orchestrator.initialize(Arc::new(MockEventChannel::new())));
    assert!(!orchestrator.initialize(Arc::new(MockEventChannel::new())));
    assert!(orchestrator.is_initialized());
}

#[tokio::test]
async fn test_malformed_request() {
    let orchestrator = initialized_orchestrator(Mocks::default());

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(json!({ "toVerify": [] })),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    assert_eq!(
        notifications,
        vec![Notification::failure("One or more fields are empty")]
    );
}

#[tokio::test]
async fn test_unknown_signature_scheme() {
    let mut transport = MockTransport::new();
    transport.expect_post().never();

    let orchestrator = initialized_orchestrator(Mocks {
        transport,
        ..Default::default()
    });

    let mut request = challenge_request(&[], &[GIVEN_NAME]);
    request["proof"]["type"] = json!("SomeSignature2019");

    let (outcome, notifications) =
        handle(&orchestrator, Message::process_challenge_request(request)).await;

    assert_eq!(outcome, Outcome::ErrorCr);
    assert_eq!(
        notifications,
        vec![Notification::failure(
            "ChallengeRequest verification failed: The object was signed with an unknown encryption scheme"
        )]
    );
}

#[tokio::test]
async fn test_invalid_challenge_request_signature() {
    let mut challenge_request_signer = MockChallengeRequestSigner::new();
    challenge_request_signer
        .expect_verify_challenge_request()
        .once()
        .returning(|_| false);

    let mut transport = MockTransport::new();
    transport.expect_post().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer,
        transport,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::ErrorCr);
    assert_eq!(
        notifications,
        vec![Notification::failure(
            "ChallengeRequest verification failed: The signature is invalid"
        )]
    );
}

#[tokio::test]
async fn test_nothing_to_present() {
    let mut presentation_factory = MockPresentationFactory::new();
    presentation_factory
        .expect_generate_verifiable_presentation()
        .never();

    let mut address_service = MockAddressService::new();
    address_service.expect_resolve_key_ownership().never();

    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .withf(|endpoint, presentation| endpoint == ENDPOINT && presentation.is_none())
        .returning(|_, _| Ok(None));

    let mut credential_store = store_finding(vec![], VcSearchResult::default());
    credential_store
        .expect_record_transaction()
        .once()
        .withf(|verifier_key, disclosed_nonces, issued_credentials, _| {
            verifier_key == VERIFIER_KEY
                && disclosed_nonces.is_empty()
                && issued_credentials.is_empty()
        })
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_factory,
        transport,
        credential_store,
        address_service,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(notifications, vec![Notification::created()]);
}

#[tokio::test]
async fn test_pure_verify_asks_consent_before_transmission() {
    let stored = stored_credential();

    let mut address_service = MockAddressService::new();
    address_service
        .expect_resolve_key_ownership()
        .once()
        .returning(|_, _| Ok(vec![DidInfo::new(0, 4)]));

    let mut presentation_factory = MockPresentationFactory::new();
    presentation_factory
        .expect_generate_verifiable_presentation()
        .once()
        .withf(|_, did_info, correspondence_id| {
            did_info == [DidInfo::new(0, 4)]
                && correspondence_id == "3ead8ae0-2d8b-41de-a54b-2d99927e458c"
        })
        .returning(|params, _, _| {
            Ok(
                VerifiablePresentation::new(params.r#type, params.verifiable_credential, vec![])
                    .unwrap(),
            )
        });

    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .withf(|endpoint, presentation| {
            endpoint == ENDPOINT
                && presentation
                    .as_ref()
                    .is_some_and(|presentation| presentation.verifiable_credential().len() == 1)
        })
        .returning(|_, _| Ok(None));

    let mut credential_store = store_finding(
        vec![],
        VcSearchResult {
            matching: vec![stored.clone()],
            missing: vec![MissingPredicate::missing("http://schema.org/birthDate")],
        },
    );
    credential_store
        .expect_record_transaction()
        .once()
        .withf(|verifier_key, disclosed_nonces, issued_credentials, _| {
            verifier_key == VERIFIER_KEY
                && disclosed_nonces == &vec!["stored-nonce".to_owned()]
                && issued_credentials.is_empty()
        })
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_factory,
        transport,
        credential_store,
        address_service,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(
            &[],
            &[GIVEN_NAME, "http://schema.org/birthDate"],
        )),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].status_code, 200);
    let_assert!(Some(consent) = notifications[0].consent());
    assert_eq!(
        consent.attestations_to_confirm,
        vec![CredentialConsentData {
            predicate: GIVEN_NAME.to_owned(),
            value: json!("John"),
            issuer: "did:ed25519:issuer".to_owned(),
        }]
    );
    assert_eq!(
        consent.missing_attestations,
        vec![MissingPredicate::missing("http://schema.org/birthDate")]
    );
    assert_eq!(
        consent.challenge_request.correspondence_id(),
        "3ead8ae0-2d8b-41de-a54b-2d99927e458c"
    );
    assert!(consent.verifiable_presentation.is_some());

    // the host hands the pair back after a round trip through JSON
    let accept = Message::accept_consent(&consent.context()).unwrap();
    let accept: Message = serde_json::from_value(serde_json::to_value(accept).unwrap()).unwrap();

    let (outcome, notifications) = handle(&orchestrator, accept).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(notifications, vec![Notification::created()]);
}

// Known limitation: only the first non-id field of a matching credential is
// offered for confirmation, even if the credential discloses more.
#[tokio::test]
async fn test_consent_summary_lists_first_subject_field_only() {
    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_factory: unsigned_presentation_factory(),
        credential_store: store_finding(
            vec![],
            VcSearchResult {
                matching: vec![stored_credential()],
                missing: vec![],
            },
        ),
        address_service: {
            let mut address_service = MockAddressService::new();
            address_service
                .expect_resolve_key_ownership()
                .returning(|_, _| Ok(vec![DidInfo::new(0, 0)]));
            address_service
        },
        ..Default::default()
    });

    let (_, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[GIVEN_NAME, FAMILY_NAME])),
    )
    .await;

    let_assert!(Some(consent) = notifications[0].consent());
    let predicates: Vec<&str> = consent
        .attestations_to_confirm
        .iter()
        .map(|claim| claim.predicate.as_str())
        .collect();
    assert_eq!(predicates, vec![GIVEN_NAME]);
}

#[tokio::test]
async fn test_pure_issue_skips_consent() {
    let mut presentation_factory = MockPresentationFactory::new();
    presentation_factory
        .expect_generate_verifiable_presentation()
        .once()
        .withf(|params, did_info, _| {
            did_info == [DidInfo::new(0, 1)]
                && params.r#type == ["VerifiablePresentation", "ChallengeResponse"]
        })
        .returning(|params, _, _| {
            Ok(
                VerifiablePresentation::new(params.r#type, params.verifiable_credential, vec![])
                    .unwrap(),
            )
        });

    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(issuer_presentation("Ed25519Signature2019"))));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store
        .expect_record_transaction()
        .once()
        .withf(|_, disclosed_nonces, issued_credentials, _| {
            disclosed_nonces.is_empty()
                && issued_credentials.len() == 1
                && issued_credentials[0].proof.nonce == "issued-nonce"
        })
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![presentation_signer("Ed25519Signature2019", Some(true))],
        presentation_factory,
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(notifications, vec![Notification::created()]);
}

#[tokio::test]
async fn test_invalid_issuer_presentation() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(issuer_presentation("Ed25519Signature2019"))));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store.expect_record_transaction().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![presentation_signer("Ed25519Signature2019", Some(false))],
        presentation_factory: unsigned_presentation_factory(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::ErrorVp);
    assert_eq!(
        notifications,
        vec![Notification::failure(
            "The VerifiablePresentation from the issuer is invalid"
        )]
    );
}

#[tokio::test]
async fn test_issuer_presentation_with_unknown_proof_uses_first_signer() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(issuer_presentation("UnknownSignature2019"))));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store
        .expect_record_transaction()
        .once()
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![
            presentation_signer("OtherSignature2019", Some(true)),
            presentation_signer("Ed25519Signature2019", None),
        ],
        presentation_factory: unsigned_presentation_factory(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, _) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn test_missing_issuer_response() {
    let mut transport = MockTransport::new();
    transport.expect_post().once().returning(|_, _| Ok(None));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store.expect_record_transaction().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![presentation_signer("Ed25519Signature2019", None)],
        presentation_factory: unsigned_presentation_factory(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn test_unparsable_issuer_response() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(b"accepted".to_vec())));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store.expect_record_transaction().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![presentation_signer("Ed25519Signature2019", None)],
        presentation_factory: unsigned_presentation_factory(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    assert_eq!(notifications.len(), 1);
    let_assert!(Some(error) = notifications[0].error_message());
    assert!(error.starts_with("Malformed issuer response"));
}

#[tokio::test]
async fn test_verifier_reply_is_not_interpreted() {
    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(b"accepted".to_vec())));

    let mut credential_store = store_finding(vec![], VcSearchResult::default());
    credential_store
        .expect_record_transaction()
        .once()
        .withf(|_, disclosed_nonces, issued_credentials, _| {
            disclosed_nonces.is_empty() && issued_credentials.is_empty()
        })
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(notifications, vec![Notification::created()]);
}

#[tokio::test]
async fn test_ownership_proofs_are_not_recorded_as_disclosed() {
    let stored = stored_credential();

    let mut presentation_factory = MockPresentationFactory::new();
    presentation_factory
        .expect_generate_verifiable_presentation()
        .once()
        .withf(|params, did_info, _| {
            let nonces: Vec<&str> = params
                .verifiable_credential
                .iter()
                .map(|credential| credential.proof.nonce.as_str())
                .collect();
            nonces == ["ownership-nonce-1", "ownership-nonce-2", "stored-nonce"]
                && did_info == [DidInfo::new(0, 1), DidInfo::new(0, 2), DidInfo::new(0, 9)]
        })
        .returning(|params, _, _| {
            Ok(
                VerifiablePresentation::new(params.r#type, params.verifiable_credential, vec![])
                    .unwrap(),
            )
        });

    let mut address_service = MockAddressService::new();
    address_service
        .expect_resolve_key_ownership()
        .once()
        .returning(|_, _| Ok(vec![DidInfo::new(0, 9)]));

    let mut transport = MockTransport::new();
    transport
        .expect_post()
        .once()
        .returning(|_, _| Ok(Some(issuer_presentation("Ed25519Signature2019"))));

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1), self_attested(FAMILY_NAME, 2)],
        VcSearchResult {
            matching: vec![stored],
            missing: vec![],
        },
    );
    credential_store
        .expect_record_transaction()
        .once()
        .withf(|_, disclosed_nonces, _, _| disclosed_nonces == &vec!["stored-nonce".to_owned()])
        .returning(|_, _, _, _| Ok(()));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_signers: vec![presentation_signer("Ed25519Signature2019", Some(true))],
        presentation_factory,
        transport,
        credential_store,
        address_service,
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(
            &[GIVEN_NAME, FAMILY_NAME],
            &[GIVEN_NAME],
        )),
    )
    .await;
    assert_eq!(outcome, Outcome::Success);

    let_assert!(Some(consent) = notifications[0].consent());
    let (outcome, _) = handle(
        &orchestrator,
        Message::accept_consent(&consent.context()).unwrap(),
    )
    .await;
    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn test_transport_failure_is_generic_error() {
    let mut transport = MockTransport::new();
    transport.expect_post().once().returning(|_, _| {
        Err(TransportError::HttpClient(http_client::Error::HttpError(
            "connection refused".to_owned(),
        )))
    });

    let mut credential_store = store_finding(
        vec![self_attested(GIVEN_NAME, 1)],
        VcSearchResult::default(),
    );
    credential_store.expect_record_transaction().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        presentation_factory: unsigned_presentation_factory(),
        transport,
        credential_store,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[GIVEN_NAME], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    let_assert!(Some(error) = notifications[0].error_message());
    assert!(error.contains("connection refused"));
}

#[tokio::test]
async fn test_key_ownership_mismatch() {
    let mut address_service = MockAddressService::new();
    address_service
        .expect_resolve_key_ownership()
        .once()
        .returning(|_, _| Ok(vec![]));

    let mut transport = MockTransport::new();
    transport.expect_post().never();

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        credential_store: store_finding(
            vec![],
            VcSearchResult {
                matching: vec![stored_credential()],
                missing: vec![],
            },
        ),
        address_service,
        transport,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[GIVEN_NAME])),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn test_active_account_is_used_for_self_attestation() {
    let mut credential_store = MockCredentialStore::new();
    credential_store
        .expect_generate_self_attested()
        .once()
        .with(mockall::predicate::always(), eq(7), mockall::predicate::always())
        .returning(|_, _, _| Ok(vec![]));
    credential_store
        .expect_find_matching()
        .returning(|_, _| Ok(VcSearchResult::default()));
    credential_store
        .expect_record_transaction()
        .returning(|_, _, _, _| Ok(()));

    let mut transport = MockTransport::new();
    transport.expect_post().returning(|_, _| Ok(None));

    let orchestrator = initialized_orchestrator(Mocks {
        challenge_request_signer: valid_challenge_request_signer(),
        credential_store,
        transport,
        ..Default::default()
    });
    orchestrator.set_active_account(7);
    assert_eq!(orchestrator.active_account(), 7);

    let (outcome, _) = handle(
        &orchestrator,
        Message::process_challenge_request(challenge_request(&[], &[])),
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn test_malformed_consent() {
    let mut transport = MockTransport::new();
    transport.expect_post().never();

    let orchestrator = initialized_orchestrator(Mocks {
        transport,
        ..Default::default()
    });

    let (outcome, notifications) = handle(
        &orchestrator,
        Message::new("accept-consent").with_property("challengeRequest", json!({ "a": "b" })),
    )
    .await;

    assert_eq!(outcome, Outcome::Error);
    assert_eq!(notifications.len(), 1);
}
