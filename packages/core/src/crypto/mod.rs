//! Криптографический модуль
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │           Envelope pipeline (signer / encryptor /           │
//! │                decryptor / verifier)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CryptoProvider (suite)                      │
//! │  - SymmetricProvider  (DES-CFB8)                            │
//! │  - AsymmetricProvider (RSA PKCS#1 v1.5 wrap + sign)         │
//! │  - DigestProvider     (MD5 hex)                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`provider`]: traits
//! - [`suites`]: the classic suite
//! - [`keys`]: friendship key pair and per-envelope session key

pub mod keys;
pub mod provider;
pub mod suites;

pub use provider::CryptoProvider;
pub use suites::classic::ClassicSuiteProvider;
