//! RSA-2048 with PKCS#1 v1.5 for key wrap and MD5-based signatures.
//!
//! Keys travel as PKCS#1 DER.

use crate::crypto::keys::KeyPairMaterial;
use crate::crypto::provider::AsymmetricProvider;
use crate::error::CryptoError;
use ::md5::Md5;
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use tracing::warn;

/// Modulus size of every friendship key pair.
pub const RSA_KEY_BITS: usize = 2048;

/// Asymmetric half of the envelope protocol.
pub struct RsaPkcs1Provider;

fn parse_public(public_key: &[u8]) -> Result<RsaPublicKey, String> {
    RsaPublicKey::from_pkcs1_der(public_key).map_err(|e| format!("Invalid RSA public key: {}", e))
}

fn parse_private(private_key: &[u8]) -> Result<RsaPrivateKey, String> {
    RsaPrivateKey::from_pkcs1_der(private_key)
        .map_err(|e| format!("Invalid RSA private key: {}", e))
}

impl AsymmetricProvider for RsaPkcs1Provider {
    fn generate_key_pair() -> Result<KeyPairMaterial, CryptoError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| CryptoError::KeyGenerationFailure(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        let public_der = public_key
            .to_pkcs1_der()
            .map_err(|e| CryptoError::KeyGenerationFailure(e.to_string()))?;
        let private_der = private_key
            .to_pkcs1_der()
            .map_err(|e| CryptoError::KeyGenerationFailure(e.to_string()))?;

        Ok(KeyPairMaterial::new(
            public_der.as_bytes().to_vec(),
            private_der.as_bytes().to_vec(),
        ))
    }

    fn wrap_key(public_key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let public_key = parse_public(public_key).map_err(CryptoError::WrapFailure)?;
        public_key
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, data)
            .map_err(|e| CryptoError::WrapFailure(e.to_string()))
    }

    fn unwrap_key(private_key: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let private_key = parse_private(private_key).map_err(CryptoError::UnwrapFailure)?;
        private_key
            .decrypt(Pkcs1v15Encrypt, wrapped)
            .map_err(|e| CryptoError::UnwrapFailure(e.to_string()))
    }

    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let private_key = parse_private(private_key).map_err(CryptoError::SignFailure)?;
        let signing_key = SigningKey::<Md5>::new(private_key);
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| CryptoError::SignFailure(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let public_key = parse_public(public_key).map_err(CryptoError::InvalidKey)?;
        let verifying_key = VerifyingKey::<Md5>::new(public_key);

        let signature = match Signature::try_from(signature) {
            Ok(signature) => signature,
            Err(e) => {
                warn!("Malformed signature: {}", e);
                return Ok(false);
            }
        };

        Ok(verifying_key.verify(message, &signature).is_ok())
    }

    fn is_matching_pair(public_key: &[u8], private_key: &[u8]) -> Result<bool, CryptoError> {
        let public_key = parse_public(public_key).map_err(CryptoError::InvalidKey)?;
        let private_key = parse_private(private_key).map_err(CryptoError::InvalidKey)?;
        Ok(RsaPublicKey::from(&private_key) == public_key)
    }
}
