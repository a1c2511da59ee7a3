use crate::crypto::provider::CryptoProvider;
use crate::crypto::suites::des_cfb::DesCfbProvider;
use crate::crypto::suites::md5_digest::Md5Provider;
use crate::crypto::suites::rsa_pkcs1::RsaPkcs1Provider;

/// The one suite the envelope protocol speaks.
pub struct ClassicSuiteProvider;

impl CryptoProvider for ClassicSuiteProvider {
    type Symmetric = DesCfbProvider;
    type Asymmetric = RsaPkcs1Provider;
    type Digest = Md5Provider;

    fn suite_name() -> &'static str {
        "DES-CFB8/RSA-PKCS1v15/MD5"
    }
}
