use ed25519_compact::{KeyPair, PublicKey, Seed, Signature};
use secrecy::{ExposeSecret, SecretSlice};

use crate::utilities::{create_hmac, decode_base64_url, encode_base64_url, generate_random_bytes};
use crate::{CryptUtil, CryptoError};

const ADDRESS_PREFIX: &str = "did:ed25519:";
const DERIVATION_DOMAIN: &[u8] = b"vp-exchange/ed25519";

/// Ed25519 keys derived from a single master seed.
///
/// Every `(account_id, key_id)` pair maps to its own key pair:
/// `seed = HMAC-SHA256(master_seed, domain || account_id || key_id)`.
pub struct EDDSACryptUtil {
    master_seed: SecretSlice<u8>,
}

impl EDDSACryptUtil {
    pub fn new(master_seed: SecretSlice<u8>) -> Result<Self, CryptoError> {
        if master_seed.expose_secret().len() < 16 {
            return Err(CryptoError::InvalidMasterSeed);
        }

        Ok(Self { master_seed })
    }

    pub fn generate() -> Self {
        Self {
            master_seed: generate_random_bytes::<32>().to_vec().into(),
        }
    }

    fn key_pair(&self, account_id: u32, key_id: u32) -> Result<KeyPair, CryptoError> {
        let mut message = DERIVATION_DOMAIN.to_vec();
        message.extend_from_slice(&account_id.to_be_bytes());
        message.extend_from_slice(&key_id.to_be_bytes());

        let seed = create_hmac(self.master_seed.expose_secret(), &message)
            .and_then(|bytes| Seed::from_slice(&bytes).ok())
            .ok_or(CryptoError::CouldNotDeriveKeyPair {
                account_id,
                key_id,
            })?;

        Ok(KeyPair::from_seed(seed))
    }

    fn public_key_from_address(address: &str) -> Result<PublicKey, CryptoError> {
        let encoded = address
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| CryptoError::UnsupportedAddress(address.to_owned()))?;
        let bytes = decode_base64_url(encoded)
            .ok_or_else(|| CryptoError::CouldNotExtractPublicKey(address.to_owned()))?;

        PublicKey::from_slice(&bytes)
            .map_err(|e| CryptoError::CouldNotExtractPublicKey(e.to_string()))
    }
}

impl CryptUtil for EDDSACryptUtil {
    fn algorithm_name(&self) -> &'static str {
        "Ed25519"
    }

    fn derive_public_key(&self, account_id: u32, key_id: u32) -> Result<Vec<u8>, CryptoError> {
        Ok(self.key_pair(account_id, key_id)?.pk.to_vec())
    }

    fn derive_public_address(&self, account_id: u32, key_id: u32) -> Result<String, CryptoError> {
        let public_key = self.derive_public_key(account_id, key_id)?;
        let encoded = encode_base64_url(&public_key)
            .ok_or_else(|| CryptoError::CouldNotExtractPublicKey("encoding failed".to_owned()))?;

        Ok(format!("{ADDRESS_PREFIX}{encoded}"))
    }

    fn sign_payload(
        &self,
        account_id: u32,
        key_id: u32,
        payload: &[u8],
    ) -> Result<String, CryptoError> {
        let key_pair = self.key_pair(account_id, key_id)?;
        let signature = key_pair.sk.sign(payload, None);

        encode_base64_url(signature.as_slice())
            .ok_or_else(|| CryptoError::InvalidSignatureEncoding("encoding failed".to_owned()))
    }

    fn verify_payload(
        &self,
        payload: &[u8],
        public_address: &str,
        signature: &str,
    ) -> Result<bool, CryptoError> {
        let public_key = Self::public_key_from_address(public_address)?;
        let signature_bytes = decode_base64_url(signature)
            .ok_or_else(|| CryptoError::InvalidSignatureEncoding(signature.to_owned()))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|e| CryptoError::InvalidSignatureEncoding(e.to_string()))?;

        Ok(public_key.verify(payload, &signature).is_ok())
    }
}
