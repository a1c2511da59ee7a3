// Base64 утилиты

use crate::error::CryptoError;
use base64::{engine::general_purpose, Engine};

pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn decode(data: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(general_purpose::STANDARD.decode(data)?)
}

/// Decodes base64 that a mail transport may have wrapped into lines.
pub fn decode_wrapped(data: &str) -> Result<Vec<u8>, CryptoError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    decode(&compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wrapped_ignores_line_breaks() {
        let encoded = encode(&[7u8; 100]);
        let wrapped = format!("  {}\r\n{}\n", &encoded[..76], &encoded[76..]);
        assert_eq!(decode_wrapped(&wrapped).unwrap(), vec![7u8; 100]);
        assert!(decode(&wrapped).is_err());
    }
}
