//! Криптографические наборы (Crypto Suites)
//!
//! ## Classic Suite
//! - **Session cipher**: DES, CFB8, no padding
//! - **Key wrap**: RSA-2048, PKCS#1 v1.5 encryption
//! - **Signatures**: RSA-2048, PKCS#1 v1.5 over MD5
//! - **Digest**: MD5, uppercase hex
//!
//! These are weak by today's standards. They are fixed by the wire format
//! that existing correspondents already speak, so they are not negotiable.
//!
//! ```rust,no_run
//! use mailseal_core::crypto::suites::classic::ClassicSuiteProvider;
//! use mailseal_core::crypto::provider::{AsymmetricProvider, CryptoProvider};
//!
//! type Suite = ClassicSuiteProvider;
//!
//! let pair = <Suite as CryptoProvider>::Asymmetric::generate_key_pair()?;
//! # Ok::<(), mailseal_core::error::CryptoError>(())
//! ```

pub mod classic;
pub mod des_cfb;
pub mod md5_digest;
pub mod rsa_pkcs1;
