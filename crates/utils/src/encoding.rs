//! Reversible encoding of an absolute base URL into a path-safe token.
//!
//! Every proxied request carries its target origin as the first path
//! segment, so the encoding must survive URL routing untouched: base64
//! with the URL-safe alphabet, padding stripped. Decoding accepts both
//! padded and unpadded tokens, since older clients re-pad before sending.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

/// URL-safe alphabet, no padding emitted, padding tolerated on decode.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid base64 token: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("token does not decode to UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encode an absolute URL into a path-safe token.
pub fn encode_base_url(url: &str) -> String {
    TOKEN_ENGINE.encode(url.as_bytes())
}

/// Decode a token back into the URL it was produced from.
///
/// A malformed token is a client error (HTTP 400 at the boundary),
/// never an upstream fetch failure.
pub fn decode_base_url(token: &str) -> Result<String, CodecError> {
    let bytes = TOKEN_ENGINE.decode(token.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_absolute_urls() {
        let urls = [
            "https://example.com",
            "https://example.com/",
            "http://example.org/some/deep/path?q=1&r=2",
            "https://sub.domain.example.co.uk/päge", // non-ASCII path
            "https://example.com:8443/a",
        ];
        for url in urls {
            let token = encode_base_url(url);
            assert!(!token.contains('/'), "token must be path-safe: {token}");
            assert!(!token.contains('+'));
            assert!(!token.contains('='));
            assert_eq!(decode_base_url(&token).unwrap(), url);
        }
    }

    #[test]
    fn round_trips_every_padding_length() {
        // lengths chosen so the encoded form would need 0, 1 and 2 pad chars
        for url in ["https://a.io", "https://a.io/", "https://a.io/xy"] {
            assert_eq!(decode_base_url(&encode_base_url(url)).unwrap(), url);
        }
    }

    #[test]
    fn accepts_padded_tokens() {
        let token = encode_base_url("https://example.com");
        let padded = match token.len() % 4 {
            2 => format!("{token}=="),
            3 => format!("{token}="),
            _ => token.clone(),
        };
        assert_eq!(decode_base_url(&padded).unwrap(), "https://example.com");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            decode_base_url("not!!valid@@base64"),
            Err(CodecError::InvalidBase64(_))
        ));
        // valid base64, but not UTF-8
        let raw = TOKEN_ENGINE.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_base_url(&raw),
            Err(CodecError::InvalidUtf8(_))
        ));
    }
}
