//! Crypto Codec
//!
//! AES-256-CBC encryption of string payloads. Ciphertext is PKCS#7 padded and
//! base64 encoded so it can be stored as a plain string value.

use std::fmt;

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::warn;

use crate::error::{CacheError, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Required cipher key length in bytes.
pub const KEY_LEN: usize = 32;
/// Required initialization vector length in bytes.
pub const IV_LEN: usize = 16;
/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

// == Crypto Codec ==
/// Fixed key/IV cipher state, held for the lifetime of a cache.
#[derive(Clone)]
pub struct CryptoCodec {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl fmt::Debug for CryptoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoCodec").finish_non_exhaustive()
    }
}

impl CryptoCodec {
    // == Constructor ==
    /// Creates a codec from a 32-byte key and a 16-byte IV.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| {
            CacheError::Configuration(format!(
                "AES cipher key must be {} bytes, got {}",
                KEY_LEN,
                key.len()
            ))
        })?;
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            CacheError::Configuration(format!(
                "AES cipher IV must be {} bytes, got {}",
                IV_LEN,
                iv.len()
            ))
        })?;

        Ok(Self { key, iv })
    }

    /// Builds a codec only when both key and IV are supplied.
    ///
    /// A missing key or IV disables encryption; a supplied pair with the wrong
    /// lengths is a configuration error.
    pub fn from_parts(key: Option<&[u8]>, iv: Option<&[u8]>) -> Result<Option<Self>> {
        match (key, iv) {
            (Some(key), Some(iv)) => Self::new(key, iv).map(Some),
            (None, None) => Ok(None),
            _ => {
                warn!("Only one of cipher key and IV is set, encryption disabled");
                Ok(None)
            }
        }
    }

    // == Encrypt ==
    /// Pads, encrypts and base64-encodes a plaintext string.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        BASE64.encode(ciphertext)
    }

    // == Decrypt ==
    /// Reverses [`CryptoCodec::encrypt`].
    ///
    /// The padding is validated before it is stripped: the pad value must be
    /// within `1..=BLOCK_SIZE` and every pad byte must carry it. Anything else
    /// fails with `InvalidCiphertext`.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let ciphertext = BASE64
            .decode(encoded)
            .map_err(|e| CacheError::InvalidCiphertext(format!("base64 decode failed: {}", e)))?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CacheError::InvalidCiphertext(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }

        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CacheError::InvalidCiphertext("invalid padding".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CacheError::InvalidCiphertext("plaintext is not UTF-8".to_string()))
    }
}
