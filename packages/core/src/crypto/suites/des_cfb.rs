//! DES in 8-bit cipher-feedback mode, unpadded.
//!
//! CFB8 turns DES into a byte-wise stream cipher, so ciphertext is exactly
//! as long as the plaintext.

use crate::crypto::keys::SessionKeyMaterial;
use crate::crypto::provider::SymmetricProvider;
use crate::error::CryptoError;
use cfb8::cipher::{AsyncStreamCipher, KeyIvInit};
use des::Des;
use rand::rngs::OsRng;
use rand_core::RngCore;

type DesCfb8Enc = cfb8::Encryptor<Des>;
type DesCfb8Dec = cfb8::Decryptor<Des>;

/// Session cipher of the envelope protocol.
pub struct DesCfbProvider;

impl SymmetricProvider for DesCfbProvider {
    const KEY_LEN: usize = 8;
    const IV_LEN: usize = 8;

    fn generate_session_key() -> Result<SessionKeyMaterial, CryptoError> {
        let mut key = vec![0u8; Self::KEY_LEN];
        let mut iv = vec![0u8; Self::IV_LEN];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| CryptoError::KeyGenerationFailure(e.to_string()))?;
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| CryptoError::KeyGenerationFailure(e.to_string()))?;
        Ok(SessionKeyMaterial::new(key, iv))
    }

    fn encrypt(plaintext: &[u8], session: &SessionKeyMaterial) -> Result<Vec<u8>, CryptoError> {
        let cipher = DesCfb8Enc::new_from_slices(session.key(), session.iv())?;
        let mut buffer = plaintext.to_vec();
        cipher.encrypt(&mut buffer);
        Ok(buffer)
    }

    fn decrypt(ciphertext: &[u8], session: &SessionKeyMaterial) -> Result<Vec<u8>, CryptoError> {
        let cipher = DesCfb8Dec::new_from_slices(session.key(), session.iv())?;
        let mut buffer = ciphertext.to_vec();
        cipher.decrypt(&mut buffer);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_session() -> SessionKeyMaterial {
        SessionKeyMaterial::new(b"8bytekey".to_vec(), b"init-vec".to_vec())
    }

    #[test]
    fn test_encrypt_decrypt() {
        let session = DesCfbProvider::generate_session_key().unwrap();
        let plaintext = b"Secret message for encryption test";

        let ciphertext = DesCfbProvider::encrypt(plaintext, &session).unwrap();
        assert_ne!(&ciphertext[..], &plaintext[..]);

        let decrypted = DesCfbProvider::decrypt(&ciphertext, &session).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_ciphertext_length_matches_plaintext() {
        let session = fixed_session();
        for plaintext in [&b""[..], b"hello", b"exactly8", b"nine bytes"] {
            let ciphertext = DesCfbProvider::encrypt(plaintext, &session).unwrap();
            assert_eq!(ciphertext.len(), plaintext.len(), "no padding for {:?}", plaintext);
            assert_eq!(DesCfbProvider::decrypt(&ciphertext, &session).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_stream_prefix_is_stable() {
        // Each CFB8 output byte depends only on the key, the IV and earlier bytes
        let session = fixed_session();
        let short = DesCfbProvider::encrypt(b"hello", &session).unwrap();
        let long = DesCfbProvider::encrypt(b"hello world", &session).unwrap();
        assert_eq!(&long[..short.len()], &short[..]);
    }

    #[test]
    fn test_fresh_session_keys_differ() {
        let a = DesCfbProvider::generate_session_key().unwrap();
        let b = DesCfbProvider::generate_session_key().unwrap();
        assert_eq!(a.key().len(), 8);
        assert_eq!(a.iv().len(), 8);
        assert!(a.key() != b.key() || a.iv() != b.iv());
    }

    #[test]
    fn test_rejects_bad_key_lengths() {
        let short = SessionKeyMaterial::new(vec![1; 7], vec![0; 8]);
        let result = DesCfbProvider::encrypt(b"data", &short);
        assert!(matches!(result, Err(CryptoError::CipherFailure(_))));

        let long_iv = SessionKeyMaterial::new(vec![1; 8], vec![0; 9]);
        let result = DesCfbProvider::decrypt(b"data", &long_iv);
        assert!(matches!(result, Err(CryptoError::CipherFailure(_))));
    }
}
