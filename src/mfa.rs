//! MFA account management: secret intake, listing and code generation.

use url::Url;

use crate::entry::MfaEntry;
use crate::error::{Error, Result};
use crate::store::{Record, Store};
use crate::totp::{self, TotpCode};

/// Offsets listed by `mfa generate --window`, for comparing against a
/// verifier whose clock may drift.
pub const WINDOW_OFFSETS: [i64; 5] = [-60, -30, 0, 30, 60];

/// What `--key` parsed into: a bare secret, or a secret plus period taken
/// from an otpauth:// URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub secret: String,
    pub period: Option<u64>,
}

/// Accept either a bare Base32 secret or an otpauth://totp/ URI as carried
/// by enrollment QR codes. Only SHA-1 six-digit parameters are supported;
/// anything else is rejected rather than silently producing wrong codes.
pub fn parse_key_input(input: &str) -> Result<KeyInput> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::Validation("secret key cannot be empty".to_string()));
    }
    if !input.starts_with("otpauth://") {
        return Ok(KeyInput {
            secret: input.to_string(),
            period: None,
        });
    }

    let uri =
        Url::parse(input).map_err(|e| Error::Validation(format!("invalid otpauth URI: {e}")))?;
    let kind = uri.host_str().unwrap_or("").to_ascii_lowercase();
    if kind != "totp" {
        return Err(Error::Validation(format!(
            "unsupported otpauth type '{kind}', only 'totp' is supported"
        )));
    }

    let mut secret: Option<String> = None;
    let mut period: Option<u64> = None;
    for (k, v) in uri.query_pairs() {
        match k.as_ref() {
            "secret" => secret = Some(v.to_string()),
            "period" => {
                let p: u64 = v
                    .parse()
                    .map_err(|_| Error::Validation(format!("invalid otpauth period '{v}'")))?;
                period = Some(p);
            }
            "algorithm" => {
                if !v.eq_ignore_ascii_case("SHA1") {
                    return Err(Error::Validation(format!(
                        "unsupported otpauth algorithm '{v}', only SHA1 is supported"
                    )));
                }
            }
            "digits" => {
                if v != "6" {
                    return Err(Error::Validation(format!(
                        "unsupported otpauth digits '{v}', only 6 are supported"
                    )));
                }
            }
            _ => {}
        }
    }

    let secret = secret.ok_or_else(|| {
        Error::Validation("otpauth URI is missing the 'secret' parameter".to_string())
    })?;
    Ok(KeyInput { secret, period })
}

/// Validate and store an MFA entry. The secret must produce a code before
/// anything is written; the stored secret keeps the user's formatting.
pub fn setup(
    store: &Store<MfaEntry>,
    account: &str,
    name: &str,
    secret: &str,
    period: i64,
) -> Result<MfaEntry> {
    if account.is_empty() || name.is_empty() {
        return Err(Error::Validation(
            "account and name cannot be empty".to_string(),
        ));
    }
    if period <= 0 {
        return Err(Error::Validation(
            "period must be a positive number of seconds".to_string(),
        ));
    }
    let period = period as u64;

    // Dry-run generation, so a bad secret never reaches the store.
    totp::generate(secret, period, totp::unix_now(0)?)?;

    let entry = MfaEntry {
        account: account.to_string(),
        name: name.to_string(),
        secret: secret.to_string(),
        period,
    };
    store.upsert(entry.clone())?;
    Ok(entry)
}

pub fn list(store: &Store<MfaEntry>) -> Result<Vec<MfaEntry>> {
    store.list()
}

/// The current code for a stored entry, with an optional signed time
/// offset for drift debugging.
pub fn generate(
    store: &Store<MfaEntry>,
    account: &str,
    name: &str,
    offset: i64,
) -> Result<TotpCode> {
    let entry = find_entry(store, account, name)?;
    totp::generate(&entry.secret, entry.period, totp::unix_now(offset)?)
}

/// Codes at fixed offsets around now.
pub fn generate_window(
    store: &Store<MfaEntry>,
    account: &str,
    name: &str,
) -> Result<Vec<(i64, TotpCode)>> {
    let entry = find_entry(store, account, name)?;
    let key = totp::decode_secret(&entry.secret)?;
    WINDOW_OFFSETS
        .iter()
        .map(|&offset| {
            let code = totp::code_at(&key, entry.period, totp::unix_now(offset)?)?;
            Ok((offset, code))
        })
        .collect()
}

fn find_entry(store: &Store<MfaEntry>, account: &str, name: &str) -> Result<MfaEntry> {
    store.find((account, name))?.ok_or_else(|| Error::NotFound {
        kind: MfaEntry::KIND,
        name: name.to_string(),
        account: account.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // base32 of the RFC 6238 test key "12345678901234567890"
    const SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn store(dir: &tempfile::TempDir) -> Store<MfaEntry> {
        Store::open(dir.path())
    }

    #[test]
    fn setup_then_generate_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        setup(&store, "google", "alice@example.com", SECRET, 30).unwrap();

        let entries = list(&store).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account, "google");
        assert_eq!(entries[0].name, "alice@example.com");
        assert_eq!(entries[0].secret, SECRET);
        assert_eq!(entries[0].period, 30);

        let code = generate(&store, "google", "alice@example.com", 0).unwrap();
        assert_eq!(code.code.len(), 6);
        assert!(code.code.chars().all(|c| c.is_ascii_digit()));
        assert!((1..=30).contains(&code.remaining));
    }

    #[test]
    fn setup_keeps_the_secret_as_supplied() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let messy = "gezd gnbv-gy3t qojq gezd gnbv gy3t qojq";
        setup(&store, "google", "alice", messy, 30).unwrap();
        assert_eq!(list(&store).unwrap()[0].secret, messy);
    }

    #[test]
    fn setup_replaces_an_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        setup(&store, "google", "alice", SECRET, 30).unwrap();
        setup(&store, "google", "alice", SECRET, 60).unwrap();

        let entries = list(&store).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].period, 60);
    }

    #[test]
    fn bad_secret_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(matches!(
            setup(&store, "google", "alice", "0189", 30),
            Err(Error::InvalidSecret(_))
        ));
        assert!(list(&store).unwrap().is_empty());
    }

    #[test]
    fn non_positive_period_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        for period in [0, -30] {
            assert!(matches!(
                setup(&store, "google", "alice", SECRET, period),
                Err(Error::Validation(_))
            ));
        }
        assert!(list(&store).unwrap().is_empty());
    }

    #[test]
    fn generate_for_unknown_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(matches!(
            generate(&store, "github", "nobody", 0),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn window_covers_all_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        setup(&store, "google", "alice", SECRET, 30).unwrap();
        let window = generate_window(&store, "google", "alice").unwrap();
        let offsets: Vec<i64> = window.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, WINDOW_OFFSETS);
    }

    #[test]
    fn bare_secret_passes_through() {
        let parsed = parse_key_input("  mzxw 6ytb  ").unwrap();
        assert_eq!(parsed.secret, "mzxw 6ytb");
        assert_eq!(parsed.period, None);
    }

    #[test]
    fn otpauth_uri_yields_secret_and_period() {
        let parsed = parse_key_input(
            "otpauth://totp/Example:alice?secret=GEZDGNBVGY3TQOJQ&issuer=Example&period=60",
        )
        .unwrap();
        assert_eq!(parsed.secret, "GEZDGNBVGY3TQOJQ");
        assert_eq!(parsed.period, Some(60));
    }

    #[test]
    fn otpauth_uri_rejects_unsupported_parameters() {
        assert!(matches!(
            parse_key_input("otpauth://hotp/x?secret=GEZDGNBV"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            parse_key_input("otpauth://totp/x?secret=GEZDGNBV&algorithm=SHA256"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            parse_key_input("otpauth://totp/x?secret=GEZDGNBV&digits=8"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            parse_key_input("otpauth://totp/x?issuer=Example"),
            Err(Error::Validation(_))
        ));
    }
}
