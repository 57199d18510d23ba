use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use rocket::tokio;

use crate::confirmation::PendingBallot;
use crate::error::{Error, Result};
use crate::model::{
    common::{normalize_identity, ElectionId, Identity},
    receipt::Receipt,
    tally,
};

use super::ElectionStore;

type InFlight = Arc<StdMutex<HashSet<(ElectionId, Identity)>>>;

/// Claim on an `(election, voter)` pair while its ballot is being confirmed.
/// Released on drop, including when the casting future is dropped mid-wait.
struct Reservation {
    in_flight: InFlight,
    key: (ElectionId, Identity),
}

impl Reservation {
    /// Claim the pair, or return `None` if a ballot for it is already in flight.
    fn claim(in_flight: &InFlight, election_id: ElectionId, voter: &str) -> Option<Self> {
        let key = (election_id, voter.to_string());
        let mut set = in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(key.clone()) {
            return None;
        }
        Some(Self {
            in_flight: in_flight.clone(),
            key,
        })
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

impl ElectionStore {
    /// Cast one vote and return its receipt.
    ///
    /// The ballot is validated, handed to the confirmation provider without
    /// holding the ledger lock, and then recorded: the receipt is appended
    /// and the tally incremented under a single lock. Any failure leaves the
    /// ledger untouched. A voter gets at most one receipt per election.
    ///
    /// Whether the election is active is not checked here.
    pub async fn cast_vote(
        &self,
        election_id: ElectionId,
        option: &str,
        voter: &str,
    ) -> Result<Receipt> {
        // Validating.
        let voter = normalize_identity(voter);
        let voter = voter.as_str();
        let reservation = {
            let ledger = self.lock().await;
            let election = ledger
                .election(election_id)
                .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
            if election.option_index(option).is_none() {
                debug!("Rejected ballot for unknown option '{option}' in election {election_id}");
                return Err(Error::validation("option", format!("unknown option '{option}'")));
            }
            if voter.is_empty() {
                return Err(Error::validation("voter", "missing identity"));
            }
            let already_voted = || Error::AlreadyVoted {
                election_id,
                voter: voter.to_string(),
            };
            if ledger.has_receipt(election_id, voter) {
                return Err(already_voted());
            }
            // Claimed under the ledger lock, so a concurrent cast either sees
            // this reservation or the receipt that replaces it.
            Reservation::claim(&self.in_flight, election_id, voter).ok_or_else(already_voted)?
        };

        // Confirming.
        let ballot = PendingBallot {
            election_id,
            voter,
            option,
            submitted_at: Utc::now(),
        };
        let confirmation =
            match tokio::time::timeout(self.confirmation_timeout, self.confirmation.confirm(&ballot))
                .await
            {
                Ok(confirmation) => confirmation?,
                Err(_) => {
                    warn!("Confirmation of ballot for election {election_id} timed out");
                    return Err(Error::ConfirmationTimeout(self.confirmation_timeout));
                }
            };

        // Recorded.
        let mut ledger = self.lock().await;
        let (index, options) = ledger
            .election(election_id)
            .and_then(|election| Some((election.option_index(option)?, election.options.clone())))
            .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
        let receipt = Receipt::new(
            election_id,
            voter.to_string(),
            option.to_string(),
            confirmation,
            Utc::now(),
        );
        ledger
            .tallies
            .entry(election_id)
            .or_insert_with(|| tally::zeroed(&options))[index]
            .votes += 1;
        ledger.receipts.push(receipt.clone());
        drop(ledger);
        drop(reservation);

        info!(
            "Recorded vote in election {election_id} as {} (sequence {})",
            receipt.confirmation_ref, receipt.sequence_number
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::confirmation::{Confirmation, ConfirmationProvider, SimulatedConfirmation};
    use crate::model::{
        election::{Election, ElectionSpec},
        receipt::ReceiptFilter,
        tally::total_votes,
    };
    use crate::store::Ledger;

    async fn store_with_election(store: &ElectionStore) -> Election {
        store
            .create_election(ElectionSpec::example(), "0xAuthor")
            .await
            .unwrap()
    }

    async fn assert_consistent(store: &ElectionStore, election_id: ElectionId) {
        let tally = store.get_tally(election_id).await;
        let receipts = store
            .list_receipts(&ReceiptFilter::for_election(election_id))
            .await;
        assert_eq!(total_votes(&tally), receipts.len() as u64);
    }

    /// Fails every ballot.
    struct FailingConfirmation;

    #[rocket::async_trait]
    impl ConfirmationProvider for FailingConfirmation {
        async fn confirm(&self, _: &PendingBallot<'_>) -> Result<Confirmation> {
            Err(Error::Confirmation("network unreachable".to_string()))
        }
    }

    #[rocket::async_test]
    async fn vote_scenario() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;
        assert_consistent(&store, election.id).await;

        let receipt = store.cast_vote(election.id, "Yes", "voterA").await.unwrap();
        assert_eq!(receipt.voted_for, "Yes");
        assert_eq!(receipt.voter, "votera");
        assert_eq!(receipt.election_id, election.id);

        let tally = store.get_tally(election.id).await;
        assert_eq!(tally.len(), 2);
        assert_eq!((tally[0].option_id, tally[0].votes), (0, 1));
        assert_eq!((tally[1].option_id, tally[1].votes), (1, 0));
        assert_eq!(tally[1].option_text, "No");
        assert_consistent(&store, election.id).await;

        store.cast_vote(election.id, "No", "voterB").await.unwrap();
        store.cast_vote(election.id, "No", "voterC").await.unwrap();
        let tally = store.get_tally(election.id).await;
        assert_eq!(tally[0].votes, 1);
        assert_eq!(tally[1].votes, 2);
        assert_consistent(&store, election.id).await;
    }

    #[rocket::async_test]
    async fn unknown_option() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;
        store.cast_vote(election.id, "Yes", "voterA").await.unwrap();
        let before = store.get_tally(election.id).await;

        let err = store
            .cast_vote(election.id, "Maybe", "voterB")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "option", .. }));
        assert_eq!(store.get_tally(election.id).await, before);
        assert_consistent(&store, election.id).await;
    }

    #[rocket::async_test]
    async fn bad_ballots() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;

        assert!(matches!(
            store.cast_vote(999, "Yes", "voterA").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.cast_vote(election.id, "Yes", "  ").await,
            Err(Error::Validation { field: "voter", .. })
        ));
        assert!(matches!(
            store.cast_vote(election.id, "yes", "voterA").await,
            Err(Error::Validation { field: "option", .. })
        ));
        assert!(store.get_tally(election.id).await.is_empty());
        assert!(store
            .list_receipts(&ReceiptFilter::default())
            .await
            .is_empty());
    }

    #[rocket::async_test]
    async fn inactive_elections_still_accept_votes() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;
        store.toggle_election_active(election.id).await.unwrap();
        assert!(store.cast_vote(election.id, "Yes", "voterA").await.is_ok());
    }

    #[rocket::async_test]
    async fn toggle_during_confirmation_does_not_stop_vote() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            SimulatedConfirmation::new(Duration::from_millis(100), "Testnet"),
            Duration::from_secs(5),
        );
        let election = store_with_election(&store).await;

        let toggler = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.toggle_election_active(election.id).await.unwrap()
        };
        let (receipt, toggled) =
            tokio::join!(store.cast_vote(election.id, "Yes", "voterA"), toggler);
        assert!(!toggled.is_active);
        assert_eq!(receipt.unwrap().voted_for, "Yes");
        assert_eq!(store.get_tally(election.id).await[0].votes, 1);
        assert_consistent(&store, election.id).await;
    }

    #[rocket::async_test]
    async fn second_vote_rejected() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;
        store.cast_vote(election.id, "Yes", "voterA").await.unwrap();

        let err = store
            .cast_vote(election.id, "No", "voterA")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted { .. }));
        assert_eq!(store.get_tally(election.id).await[1].votes, 0);
        assert_consistent(&store, election.id).await;

        // The same voter may still vote elsewhere.
        let other = store_with_election(&store).await;
        assert!(store.cast_vote(other.id, "No", "voterA").await.is_ok());
    }

    #[rocket::async_test]
    async fn second_vote_in_other_case_rejected() {
        let store = ElectionStore::new();
        let election = store_with_election(&store).await;
        let receipt = store
            .cast_vote(election.id, "Yes", "0xABCDEF")
            .await
            .unwrap();
        assert_eq!(receipt.voter, "0xabcdef");

        for wallet in ["0xabcdef", " 0xAbCdEf "] {
            let err = store
                .cast_vote(election.id, "No", wallet)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::AlreadyVoted { .. }));
        }
        assert_eq!(total_votes(&store.get_tally(election.id).await), 1);
        assert_consistent(&store, election.id).await;

        // Lookups ignore case too.
        assert_eq!(
            store.receipt_for(election.id, "0xAbCdEf").await,
            Some(receipt.clone())
        );
        let mine = store
            .list_receipts(&ReceiptFilter::for_voter("0XABCDEF"))
            .await;
        assert_eq!(mine, vec![receipt]);
    }

    #[rocket::async_test]
    async fn concurrent_double_vote_in_other_case() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            SimulatedConfirmation::new(Duration::from_millis(50), "Testnet"),
            Duration::from_secs(5),
        );
        let election = store_with_election(&store).await;

        let (first, second) = tokio::join!(
            store.cast_vote(election.id, "Yes", "0xABCDEF"),
            store.cast_vote(election.id, "No", "0xabcdef"),
        );
        assert!(first.is_ok() != second.is_ok());
        assert_consistent(&store, election.id).await;
    }

    #[rocket::async_test]
    async fn concurrent_double_vote() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            SimulatedConfirmation::new(Duration::from_millis(50), "Testnet"),
            Duration::from_secs(5),
        );
        let election = store_with_election(&store).await;

        let (first, second) = tokio::join!(
            store.cast_vote(election.id, "Yes", "voterA"),
            store.cast_vote(election.id, "No", "voterA"),
        );
        assert_eq!(
            [first.is_ok(), second.is_ok()]
                .iter()
                .filter(|ok| **ok)
                .count(),
            1
        );
        assert!(matches!(
            first.err().or(second.err()),
            Some(Error::AlreadyVoted { .. })
        ));
        assert_consistent(&store, election.id).await;
    }

    #[rocket::async_test]
    async fn failed_confirmation_changes_nothing() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            FailingConfirmation,
            Duration::from_secs(5),
        );
        let election = store_with_election(&store).await;

        for _ in 0..2 {
            // The reservation is released, so a retry fails the same way.
            assert!(matches!(
                store.cast_vote(election.id, "Yes", "voterA").await,
                Err(Error::Confirmation(_))
            ));
        }
        assert!(store.get_tally(election.id).await.is_empty());
        assert!(store
            .list_receipts(&ReceiptFilter::default())
            .await
            .is_empty());
    }

    #[rocket::async_test]
    async fn confirmation_timeout() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            SimulatedConfirmation::new(Duration::from_secs(5), "Testnet"),
            Duration::from_millis(20),
        );
        let election = store_with_election(&store).await;

        assert!(matches!(
            store.cast_vote(election.id, "Yes", "voterA").await,
            Err(Error::ConfirmationTimeout(_))
        ));
        assert!(store.get_tally(election.id).await.is_empty());
        assert!(store.in_flight.lock().unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn readers_are_not_blocked_during_confirmation() {
        let store = ElectionStore::from_parts(
            Ledger::default(),
            SimulatedConfirmation::new(Duration::from_millis(100), "Testnet"),
            Duration::from_secs(5),
        );
        let election = store_with_election(&store).await;

        let reader = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            // Mid-confirmation: nothing recorded yet, and the lock is free.
            let tally = tokio::time::timeout(Duration::from_millis(50), store.get_tally(election.id))
                .await
                .expect("store lock held during confirmation");
            assert!(tally.is_empty());
        };
        let (receipt, _) = tokio::join!(store.cast_vote(election.id, "No", "voterA"), reader);
        receipt.unwrap();
        assert_eq!(store.get_tally(election.id).await[1].votes, 1);
    }
}
