use serde::{Deserialize, Serialize};

use crate::store::Record;

/// One MFA account. The secret is stored exactly as the user supplied it
/// (spaces, hyphens and all); normalization happens on every generation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MfaEntry {
    pub account: String,
    pub name: String,
    pub secret: String,
    pub period: u64,
}

impl Record for MfaEntry {
    const FILE_NAME: &'static str = "mfa.json";
    const KIND: &'static str = "MFA";

    fn key(&self) -> (&str, &str) {
        (&self.account, &self.name)
    }
}

/// A generated password, with the length it was requested at and a
/// description of the character classes that were actually in play.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordEntry {
    pub name: String,
    pub account: String,
    pub password: String,
    pub length: u32,
    pub config: String,
}

impl Record for PasswordEntry {
    const FILE_NAME: &'static str = "passwords.json";
    const KIND: &'static str = "password";

    fn key(&self) -> (&str, &str) {
        (&self.name, &self.account)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PinEntry {
    pub name: String,
    pub account: String,
    pub pin: String,
}

impl Record for PinEntry {
    const FILE_NAME: &'static str = "pins.json";
    const KIND: &'static str = "PIN";

    fn key(&self) -> (&str, &str) {
        (&self.name, &self.account)
    }
}
