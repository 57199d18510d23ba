use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    common::ElectionId,
    election::Election,
    receipt::{is_well_formed_ref, Receipt},
    tally::{self, ResultTally},
};

/// Ways a ledger dump can fail to verify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("The tally has {found} entries but the election has {expected} options.")]
    TallyLength { expected: usize, found: usize },
    #[error("Tally entry {option_id} is labelled '{found}' but the option is '{expected}'.")]
    TallyLabel {
        option_id: usize,
        expected: String,
        found: String,
    },
    #[error("The receipt for voter {voter} belongs to election {election_id}.")]
    ForeignReceipt {
        voter: String,
        election_id: ElectionId,
    },
    #[error("The receipt for voter {voter} is for unknown option '{voted_for}'.")]
    UnknownOption { voter: String, voted_for: String },
    #[error("Voter {voter} has more than one receipt.")]
    DuplicateVoter { voter: String },
    #[error("The receipt for voter {voter} has a malformed confirmation reference.")]
    MalformedReference { voter: String },
    #[error("Option '{option_text}' is tallied at {tally} but has {receipts} receipts.")]
    Count {
        option_text: String,
        tally: u64,
        receipts: u64,
    },
}

/// One election with its tally and receipt log, taken as a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDump {
    pub election: Election,
    /// Empty if no votes have been recorded yet.
    pub tally: ResultTally,
    pub receipts: Vec<Receipt>,
}

impl LedgerDump {
    /// Check the ledger invariants, returning the verified per-option counts.
    pub fn verify(&self) -> Result<ResultTally, VerificationError> {
        let options = &self.election.options;
        let claimed = if self.tally.is_empty() {
            tally::zeroed(options)
        } else {
            self.tally.clone()
        };

        // The tally must line up with the options.
        if claimed.len() != options.len() {
            return Err(VerificationError::TallyLength {
                expected: options.len(),
                found: claimed.len(),
            });
        }
        for (option_id, (entry, option)) in claimed.iter().zip(options).enumerate() {
            if entry.option_id != option_id || &entry.option_text != option {
                return Err(VerificationError::TallyLabel {
                    option_id,
                    expected: option.clone(),
                    found: entry.option_text.clone(),
                });
            }
        }

        // Recount from the receipts.
        let mut recounted = tally::zeroed(options);
        let mut voters = HashSet::new();
        for receipt in &self.receipts {
            if receipt.election_id != self.election.id {
                return Err(VerificationError::ForeignReceipt {
                    voter: receipt.voter.clone(),
                    election_id: receipt.election_id,
                });
            }
            if !voters.insert(receipt.voter.to_ascii_lowercase()) {
                return Err(VerificationError::DuplicateVoter {
                    voter: receipt.voter.clone(),
                });
            }
            if !is_well_formed_ref(&receipt.confirmation_ref) {
                return Err(VerificationError::MalformedReference {
                    voter: receipt.voter.clone(),
                });
            }
            let index = self.election.option_index(&receipt.voted_for).ok_or_else(|| {
                VerificationError::UnknownOption {
                    voter: receipt.voter.clone(),
                    voted_for: receipt.voted_for.clone(),
                }
            })?;
            recounted[index].votes += 1;
        }

        // Compare the counts.
        for (claimed, actual) in claimed.iter().zip(&recounted) {
            if claimed.votes != actual.votes {
                return Err(VerificationError::Count {
                    option_text: claimed.option_text.clone(),
                    tally: claimed.votes,
                    receipts: actual.votes,
                });
            }
        }

        Ok(recounted)
    }
}
