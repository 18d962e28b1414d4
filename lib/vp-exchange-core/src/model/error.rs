use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("One or more fields are empty")]
    EmptyFields,
    #[error("A VerifiablePresentation must contain at least one credential")]
    EmptyPresentation,
    #[error("JSON error: `{0}`")]
    JsonError(#[from] serde_json::Error),
}
