use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use hmac::Mac;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::HmacSha256;

pub fn create_hmac(key: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(message);
    let result = mac.finalize();
    Some(result.into_bytes().to_vec())
}

pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut res = [0u8; N];
    get_rng().fill_bytes(&mut res);
    res
}

pub fn get_rng() -> impl RngCore + CryptoRng {
    ChaCha20Rng::from_entropy()
}

pub fn encode_base64_url(input: &[u8]) -> Option<String> {
    Base64UrlSafeNoPadding::encode_to_string(input).ok()
}

pub fn decode_base64_url(input: &str) -> Option<Vec<u8>> {
    Base64UrlSafeNoPadding::decode_to_vec(input, None).ok()
}
