// Session lifetime from the token's own expiry claim
//
// The claim is read without verifying the signature. It only decides how long
// the token stays cached and never feeds an authorization decision.

use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Seconds subtracted from the claimed expiry
pub const SAFETY_MARGIN_SECS: i64 = 10;

/// Lower bound on any computed lifetime
pub const MIN_LIFETIME_SECS: i64 = 60;

/// Read the `exp` claim from a JWT payload, if there is one
pub fn unverified_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    let exp = claims.get("exp")?;
    let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(secs, 0)
}

/// max(claimed_expiry - now - margin, minimum); `default_lifetime` without a claim
pub fn session_lifetime(
    claimed_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    default_lifetime: Duration,
) -> Duration {
    match claimed_expiry {
        Some(exp) => {
            let remaining = exp - now - Duration::seconds(SAFETY_MARGIN_SECS);
            remaining.max(Duration::seconds(MIN_LIFETIME_SECS))
        }
        None => default_lifetime,
    }
}

#[cfg(test)]
pub(crate) fn jwt_with_claims(claims: &Value) -> String {
    let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = BASE64_URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
