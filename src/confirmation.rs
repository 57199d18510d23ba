//! Stand-in for network confirmation of a ballot.
//!
//! The vote-casting workflow hands every validated ballot to a
//! [`ConfirmationProvider`] and only records it once the provider answers.
//! [`SimulatedConfirmation`] waits for a fixed delay and fabricates the
//! transaction-like fields locally.

use std::time::Duration;

use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER;
use rand::{Rng, RngCore};
use rocket::tokio;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::common::ElectionId;

/// Default label for the simulated network.
pub const DEFAULT_NETWORK: &str = "Ethereum Goerli Testnet";
/// First sequence number the simulation hands out.
pub const SEQUENCE_START: u64 = 16_000_000;
/// Width of the sequence number range.
pub const SEQUENCE_SPAN: u64 = 1_000_000;

/// A validated ballot awaiting confirmation.
#[derive(Debug, Clone, Copy)]
pub struct PendingBallot<'a> {
    pub election_id: ElectionId,
    pub voter: &'a str,
    pub option: &'a str,
    pub submitted_at: DateTime<Utc>,
}

/// What a successful confirmation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub confirmation_ref: String,
    pub sequence_number: u64,
    pub network: String,
}

/// Something that can confirm ballots. Failing here rejects the ballot
/// without touching the store.
#[rocket::async_trait]
pub trait ConfirmationProvider: Send + Sync {
    async fn confirm(&self, ballot: &PendingBallot<'_>) -> Result<Confirmation>;
}

/// Confirms every ballot after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedConfirmation {
    delay: Duration,
    network: String,
}

impl SimulatedConfirmation {
    pub fn new(delay: Duration, network: impl Into<String>) -> Self {
        Self {
            delay,
            network: network.into(),
        }
    }

    /// A provider that answers immediately.
    pub fn instant(network: impl Into<String>) -> Self {
        Self::new(Duration::ZERO, network)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Hash the ballot together with a random nonce into a transaction-hash lookalike.
    fn confirmation_ref(ballot: &PendingBallot<'_>, rng: &mut impl RngCore) -> String {
        let mut nonce = [0u8; 32];
        rng.fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(ballot.election_id.to_le_bytes());
        hasher.update(ballot.voter.as_bytes());
        hasher.update([0]);
        hasher.update(ballot.option.as_bytes());
        hasher.update([0]);
        hasher.update(ballot.submitted_at.timestamp_millis().to_le_bytes());
        hasher.update(nonce);
        format!("0x{}", HEXLOWER.encode(&hasher.finalize()))
    }
}

#[rocket::async_trait]
impl ConfirmationProvider for SimulatedConfirmation {
    async fn confirm(&self, ballot: &PendingBallot<'_>) -> Result<Confirmation> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        // The scoped block is needed to keep `rng` out of the returned future's state.
        let (confirmation_ref, sequence_number) = {
            let mut rng = rand::thread_rng();
            (
                Self::confirmation_ref(ballot, &mut rng),
                rng.gen_range(SEQUENCE_START..SEQUENCE_START + SEQUENCE_SPAN),
            )
        };
        debug!(
            "Confirmed ballot of {} in election {} as {confirmation_ref}",
            ballot.voter, ballot.election_id
        );

        Ok(Confirmation {
            confirmation_ref,
            sequence_number,
            network: self.network.clone(),
        })
    }
}

/// A random reference for things that are not ballots, e.g. election creation.
pub fn random_ref() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", HEXLOWER.encode(&bytes))
}
