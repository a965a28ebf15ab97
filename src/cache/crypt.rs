//! Encrypted string operations on the cache.
//!
//! Unlike [`Cache::get`], which folds a missing and an expired key into
//! `None`, [`Cache::get_crypt`] reports `NotFound` and `Expired` separately.

use crate::cache::store::Lookup;
use crate::cache::{Cache, Value};
use crate::crypto::CryptoCodec;
use crate::error::{CacheError, Result};

impl Cache {
    /// Whether a cipher key and IV were configured.
    pub fn encryption_enabled(&self) -> bool {
        self.crypto.is_some()
    }

    fn crypto(&self) -> Result<&CryptoCodec> {
        self.crypto.as_ref().ok_or(CacheError::EncryptionDisabled)
    }

    // == Put Crypt ==
    /// Encrypts `plaintext` and stores it with the default TTL.
    pub fn put_crypt(&self, key: impl Into<String>, plaintext: &str) -> Result<()> {
        self.put_crypt_exp(key, plaintext, self.default_ttl)
    }

    /// Encrypts `plaintext` and stores it with an explicit TTL.
    pub fn put_crypt_exp(
        &self,
        key: impl Into<String>,
        plaintext: &str,
        ttl_seconds: u64,
    ) -> Result<()> {
        let ciphertext = self.crypto()?.encrypt(plaintext);
        self.insert(key.into(), Value::Str(ciphertext), ttl_seconds);
        Ok(())
    }

    // == Get Crypt ==
    /// Retrieves and decrypts a string stored with [`Cache::put_crypt`].
    pub fn get_crypt(&self, key: &str) -> Result<String> {
        let crypto = self.crypto()?;
        match self.lookup(key) {
            Lookup::Hit(Value::Str(ciphertext)) => crypto.decrypt(&ciphertext),
            Lookup::Hit(other) => Err(CacheError::InvalidCiphertext(format!(
                "value under {} is {}, not an encrypted string",
                key,
                other.type_name()
            ))),
            Lookup::Missing => Err(CacheError::NotFound(key.to_string())),
            Lookup::Expired => Err(CacheError::Expired(key.to_string())),
        }
    }
}
