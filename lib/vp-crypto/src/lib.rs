use hmac::Hmac;
use sha2::Sha256;
use thiserror::Error;

pub mod signer;
pub mod utilities;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Could not derive key pair for account `{account_id}` key `{key_id}`")]
    CouldNotDeriveKeyPair { account_id: u32, key_id: u32 },
    #[error("Could not extract public key: `{0}`")]
    CouldNotExtractPublicKey(String),
    #[error("Invalid signature encoding: `{0}`")]
    InvalidSignatureEncoding(String),
    #[error("Unsupported address `{0}`")]
    UnsupportedAddress(String),
    #[error("Invalid master seed")]
    InvalidMasterSeed,
}

/// Key material of the local holder.
///
/// Keys are addressed by `(account_id, key_id)`: the account is the wallet or
/// profile, the key index is incremented per generated identity.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CryptUtil: Send + Sync {
    /// Algorithm family, used to build signature scheme identifiers
    fn algorithm_name(&self) -> &'static str;

    fn derive_public_key(&self, account_id: u32, key_id: u32) -> Result<Vec<u8>, CryptoError>;

    /// Public address (a DID) controlled by the given key
    fn derive_public_address(&self, account_id: u32, key_id: u32) -> Result<String, CryptoError>;

    fn sign_payload(
        &self,
        account_id: u32,
        key_id: u32,
        payload: &[u8],
    ) -> Result<String, CryptoError>;

    /// Returns `Ok(false)` for well-formed but non-matching signatures
    fn verify_payload(
        &self,
        payload: &[u8],
        public_address: &str,
        signature: &str,
    ) -> Result<bool, CryptoError>;
}
