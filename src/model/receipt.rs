use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confirmation::Confirmation;
use crate::model::common::{ElectionId, Identity};

/// Confirmation references are `0x` followed by this many lowercase hex digits.
pub const CONFIRMATION_REF_HEX_LEN: usize = 64;

/// Immutable proof of one cast vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub election_id: ElectionId,
    pub voter: Identity,
    /// The option label, not its index.
    pub voted_for: String,
    pub timestamp: DateTime<Utc>,
    /// Stands in for a transaction hash.
    pub confirmation_ref: String,
    /// Stands in for a block number.
    pub sequence_number: u64,
    /// Network label the confirmation claims to come from.
    pub network: String,
}

impl Receipt {
    /// Build a receipt for a confirmed ballot.
    pub fn new(
        election_id: ElectionId,
        voter: Identity,
        voted_for: String,
        confirmation: Confirmation,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            election_id,
            voter,
            voted_for,
            timestamp,
            confirmation_ref: confirmation.confirmation_ref,
            sequence_number: confirmation.sequence_number,
            network: confirmation.network,
        }
    }
}

/// A ballot as submitted by a voter: the label of their chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub option: String,
}

/// Does this look like a reference we could have generated?
pub fn is_well_formed_ref(confirmation_ref: &str) -> bool {
    confirmation_ref
        .strip_prefix("0x")
        .map(|hex| {
            hex.len() == CONFIRMATION_REF_HEX_LEN
                && hex
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
        .unwrap_or(false)
}

/// Optional filter over the receipt log. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptFilter {
    pub election_id: Option<ElectionId>,
    pub voter: Option<Identity>,
}

impl ReceiptFilter {
    pub fn for_election(election_id: ElectionId) -> Self {
        Self {
            election_id: Some(election_id),
            voter: None,
        }
    }

    pub fn for_voter(voter: impl Into<Identity>) -> Self {
        Self {
            election_id: None,
            voter: Some(voter.into()),
        }
    }

    pub fn matches(&self, receipt: &Receipt) -> bool {
        self.election_id
            .map_or(true, |election_id| receipt.election_id == election_id)
            && self
                .voter
                .as_ref()
                .map_or(true, |voter| receipt.voter.eq_ignore_ascii_case(voter.trim()))
    }
}
