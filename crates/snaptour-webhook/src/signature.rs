//! `X-Line-Signature` verification.
//!
//! The platform signs every webhook body with HMAC-SHA256 keyed by the
//! channel secret and sends the base64 digest in the header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER: &str = "x-line-signature";

/// Check `signature` against `body`. Comparison is constant-time.
pub fn verify(secret: &[u8], body: &[u8], signature: &str) -> Result<(), Error> {
  let expected = B64.decode(signature.trim()).map_err(|_| Error::Unauthorized)?;
  let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::Unauthorized)?;
  mac.update(body);
  mac.verify_slice(&expected).map_err(|_| Error::Unauthorized)
}

#[cfg(test)]
pub(crate) fn sign(secret: &[u8], body: &[u8]) -> String {
  let mut mac = HmacSha256::new_from_slice(secret).unwrap();
  mac.update(body);
  B64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &[u8] = b"channel-secret";
  const BODY: &[u8] = br#"{"destination":"U0","events":[]}"#;

  #[test]
  fn valid_signature() {
    let sig = sign(SECRET, BODY);
    assert!(verify(SECRET, BODY, &sig).is_ok());
  }

  #[test]
  fn tampered_body() {
    let sig = sign(SECRET, BODY);
    assert!(matches!(
      verify(SECRET, br#"{"destination":"U0","events":[{}]}"#, &sig),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_secret() {
    let sig = sign(b"another-secret", BODY);
    assert!(matches!(verify(SECRET, BODY, &sig), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    assert!(matches!(
      verify(SECRET, BODY, "!!!not-base64!!!"),
      Err(Error::Unauthorized)
    ));
  }
}
