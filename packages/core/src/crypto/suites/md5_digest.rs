use crate::crypto::provider::DigestProvider;
use ::md5::{Digest, Md5};

/// MD5 rendered as uppercase hex, the aggregate-digest format of the protocol.
pub struct Md5Provider;

impl DigestProvider for Md5Provider {
    fn digest_hex(data: &[u8]) -> String {
        hex::encode_upper(Md5::digest(data))
    }
}
