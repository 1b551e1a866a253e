//! Time-based one-time codes: RFC 6238 on top of RFC 4226 HMAC-SHA1
//! dynamic truncation. Everything here is a pure function of
//! (secret bytes, period, time) — no clock reads besides `unix_now`, no
//! printing, no stored state.

use std::time::{SystemTime, UNIX_EPOCH};

use data_encoding::BASE32;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// A generated code plus how many seconds it stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode {
    pub code: String,
    pub remaining: u64,
}

/// Canonicalize a user-supplied secret: uppercase, drop everything outside
/// the Base32 alphabet (users paste secrets with spaces and hyphens), then
/// re-pad with `=` to a multiple of 8. Filtered lengths of 1, 3 or 6 mod 8
/// cannot be padded to a decodable string and are left for the decoder to
/// reject.
pub fn normalize_secret(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, 'A'..='Z' | '2'..='7'))
        .collect();

    let pad = match cleaned.len() % 8 {
        2 => 6,
        4 => 4,
        5 => 3,
        7 => 1,
        _ => 0,
    };
    for _ in 0..pad {
        cleaned.push('=');
    }
    cleaned
}

/// Normalize and decode a secret into raw key bytes.
pub fn decode_secret(raw: &str) -> Result<Zeroizing<Vec<u8>>> {
    let normalized = normalize_secret(raw);
    if normalized.is_empty() {
        return Err(Error::InvalidSecret(
            "no base32 characters left after normalization".to_string(),
        ));
    }
    let key = BASE32
        .decode(normalized.as_bytes())
        .map_err(|e| Error::InvalidSecret(format!("base32 decoding failed: {e}")))?;
    Ok(Zeroizing::new(key))
}

/// Generate the code for a stored (still encoded) secret at `now`.
pub fn generate(secret: &str, period: u64, now: u64) -> Result<TotpCode> {
    let key = decode_secret(secret)?;
    code_at(&key, period, now)
}

/// The code and remaining validity for raw key bytes at a moment in time.
pub fn code_at(key: &[u8], period: u64, now: u64) -> Result<TotpCode> {
    if period == 0 {
        return Err(Error::Validation(
            "period must be a positive number of seconds".to_string(),
        ));
    }
    let counter = time_step(now, period);
    // In [1, period]: a fresh step has the whole period left.
    let remaining = period - now % period;
    let code = format!("{:06}", hotp(key, counter)?);
    Ok(TotpCode { code, remaining })
}

/// Which time step `now` falls into.
fn time_step(now: u64, period: u64) -> u64 {
    now / period
}

/// RFC 4226 §5.3: HMAC-SHA1 over the big-endian counter, dynamic
/// truncation, reduced modulo 10^6.
fn hotp(key: &[u8], counter: u64) -> Result<u32> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| Error::InvalidSecret(format!("unusable HMAC key: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    // The low nibble of the last byte picks the 4-byte window.
    let offset = (hash[hash.len() - 1] & 0x0f) as usize;
    let value = u32::from_be_bytes([
        hash[offset],
        hash[offset + 1],
        hash[offset + 2],
        hash[offset + 3],
    ]) & 0x7fff_ffff;
    Ok(value % 1_000_000)
}

/// Current Unix time in seconds, shifted by a signed offset. The offset is
/// a parameter for drift debugging, never persisted.
pub fn unix_now(offset: i64) -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Validation(format!("system clock is before the Unix epoch: {e}")))?
        .as_secs();
    let shifted = (now as i64).checked_add(offset).filter(|t| *t >= 0);
    match shifted {
        Some(t) => Ok(t as u64),
        None => Err(Error::Validation(format!(
            "time offset {offset} lands before the Unix epoch"
        ))),
    }
}
