//! Carrier token encryption.
//!
//! Tokens are sealed with AES-256-GCM under a master key supplied via
//! configuration. The wire form is base64(nonce || ciphertext) with a
//! fresh 12-byte random nonce per encryption.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Errors sealing or opening carrier tokens.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The configured master key is not valid base64.
    #[error("master key is not valid base64")]
    KeyEncoding,

    /// The decoded master key has the wrong length.
    #[error("master key must be {KEY_LEN} bytes, got {0}")]
    KeyLength(usize),

    /// The sealed token is not base64(nonce || ciphertext).
    #[error("ciphertext is malformed")]
    Malformed,

    /// The cipher refused to seal the plaintext.
    #[error("encryption failed")]
    Encrypt,

    /// Authentication failed; wrong key or tampered ciphertext.
    #[error("decryption failed")]
    Decrypt,
}

/// Seals and opens carrier auth tokens.
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::KeyEncoding)?;
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::KeyLength(bytes.len()));
        }
        let key = Key::<Aes256Gcm>::from_slice(&bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Encrypt a token, returning base64(nonce || ciphertext).
    pub fn encrypt_token(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a token produced by [`encrypt_token`](Self::encrypt_token).
    pub fn decrypt_token(&self, sealed: &str) -> Result<String, CryptoError> {
        let bytes = STANDARD.decode(sealed).map_err(|_| CryptoError::Malformed)?;
        if bytes.len() <= NONCE_LEN {
            return Err(CryptoError::Malformed);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        STANDARD.encode([7u8; KEY_LEN])
    }

    #[test]
    fn roundtrip() {
        let cipher = TokenCipher::from_base64_key(&test_key()).unwrap();
        let sealed = cipher.encrypt_token("auth-token-123").unwrap();
        assert_eq!(cipher.decrypt_token(&sealed).unwrap(), "auth-token-123");
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let cipher = TokenCipher::from_base64_key(&test_key()).unwrap();
        let a = cipher.encrypt_token("same").unwrap();
        let b = cipher.encrypt_token("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let cipher = TokenCipher::from_base64_key(&test_key()).unwrap();
        let other = TokenCipher::from_base64_key(&STANDARD.encode([9u8; KEY_LEN])).unwrap();
        let sealed = cipher.encrypt_token("secret").unwrap();
        assert!(matches!(
            other.decrypt_token(&sealed),
            Err(CryptoError::Decrypt)
        ));
    }

    #[test]
    fn rejects_short_key() {
        let short = STANDARD.encode([1u8; 16]);
        assert!(matches!(
            TokenCipher::from_base64_key(&short),
            Err(CryptoError::KeyLength(16))
        ));
    }

    #[test]
    fn rejects_garbage_ciphertext() {
        let cipher = TokenCipher::from_base64_key(&test_key()).unwrap();
        assert!(cipher.decrypt_token("not base64 !!!").is_err());
        assert!(cipher.decrypt_token(&STANDARD.encode([0u8; 4])).is_err());
    }
}
