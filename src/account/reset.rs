//! Signed, timestamped password-reset tokens.
//!
//! A token is `hex(email).<unix seconds>.<hex hmac>` where the MAC is
//! HMAC-SHA256 keyed with the application secret over the salt and the first
//! two parts.

use anyhow::{anyhow, bail};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const RESET_SALT: &str = "password-reset-salt";
pub const RESET_MAX_AGE_SECS: i64 = 3600;

const INVALID_TOKEN: &str = "The reset link is invalid or has expired";

fn new_mac(secret: &str, payload: &str) -> anyhow::Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("Invalid secret key: {}", e))?;
    mac.update(RESET_SALT.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(mac)
}

pub fn issue_token(secret: &str, email: &str, now: i64) -> anyhow::Result<String> {
    let payload = format!("{}.{}", hex::encode(email), now);
    let signature = new_mac(secret, &payload)?.finalize().into_bytes();
    Ok(format!("{}.{}", payload, hex::encode(signature)))
}

/// Returns the email the token was issued for.
pub fn verify_token(secret: &str, token: &str, now: i64) -> anyhow::Result<String> {
    let mut parts = token.trim().splitn(3, '.');
    let (email_hex, issued, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(e), Some(t), Some(s)) => (e, t, s),
        _ => bail!(INVALID_TOKEN),
    };

    let signature = hex::decode(signature).ok_or_else(|| anyhow!(INVALID_TOKEN))?;
    new_mac(secret, &format!("{}.{}", email_hex, issued))?
        .verify_slice(&signature)
        .map_err(|_| anyhow!(INVALID_TOKEN))?;

    let issued: i64 = issued.parse().map_err(|_| anyhow!(INVALID_TOKEN))?;
    if now < issued || now - issued > RESET_MAX_AGE_SECS {
        bail!(INVALID_TOKEN);
    }

    let email = hex::decode(email_hex).ok_or_else(|| anyhow!(INVALID_TOKEN))?;
    String::from_utf8(email).map_err(|_| anyhow!(INVALID_TOKEN))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const NOW: i64 = 1_750_000_000;

    #[test]
    fn issued_token_verifies() {
        let token = issue_token(SECRET, "ana@clinic.co", NOW).unwrap();
        assert_eq!(verify_token(SECRET, &token, NOW + 10).unwrap(), "ana@clinic.co");
    }

    #[test]
    fn token_expires_after_an_hour() {
        let token = issue_token(SECRET, "ana@clinic.co", NOW).unwrap();
        assert!(verify_token(SECRET, &token, NOW + RESET_MAX_AGE_SECS).is_ok());
        assert!(verify_token(SECRET, &token, NOW + RESET_MAX_AGE_SECS + 1).is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let token = issue_token(SECRET, "ana@clinic.co", NOW).unwrap();
        assert!(verify_token("other-secret", &token, NOW).is_err());

        let forged = token.replacen(&hex::encode("ana@clinic.co"), &hex::encode("eve@clinic.co"), 1);
        assert!(verify_token(SECRET, &forged, NOW).is_err());

        assert!(verify_token(SECRET, "garbage", NOW).is_err());
        assert!(verify_token(SECRET, "zz.1.zz", NOW).is_err());
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex::encode([0u8, 171, 255]), "00abff");
        assert_eq!(hex::decode("00abff"), Some(vec![0, 171, 255]));
        assert_eq!(hex::decode("abc"), None);
    }
}
