use rocket::FromFormField;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Our election IDs are integers.
pub type ElectionId = u32;
/// Our candidate IDs are integers, unique across the whole store.
pub type CandidateId = u32;
/// Voters and authors are identified by an opaque wallet address.
pub type Identity = String;

/// Which elections a listing should include.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Every election regardless of its flag.
    #[default]
    All,
    /// Elections currently flagged active.
    Active,
    /// Elections flagged inactive.
    Ended,
}

impl ElectionStatus {
    pub fn matches(&self, is_active: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => is_active,
            Self::Ended => !is_active,
        }
    }
}

/// Wallet addresses compare case-insensitively; this is the form the ledger
/// stores and looks voters up by.
pub fn normalize_identity(identity: &str) -> Identity {
    identity.trim().to_ascii_lowercase()
}

/// Trim a required text field, rejecting it if nothing is left.
pub fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation(field, "must not be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}
