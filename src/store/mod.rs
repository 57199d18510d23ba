//! The in-memory election ledger.
//!
//! [`ElectionStore`] is the single source of truth for elections, tallies and
//! receipts. It is a cheap handle around one async mutex: every operation
//! takes the lock once, so readers see a mutation either entirely or not at
//! all. Authoring, vote casting and derived queries live in the submodules.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use rocket::tokio::sync::{Mutex, MutexGuard};

use crate::confirmation::{ConfirmationProvider, SimulatedConfirmation, DEFAULT_NETWORK};
use crate::model::{
    common::{CandidateId, ElectionId, Identity},
    dump::LedgerDump,
    election::Election,
    receipt::{Receipt, ReceiptFilter},
    tally::ResultTally,
};

mod authoring;
mod query;
mod seed;
mod voting;

/// How long a ballot may wait for confirmation unless configured otherwise.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(10);

/// The ledger contents. Only reachable through an [`ElectionStore`] lock.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Insertion order.
    elections: Vec<Election>,
    tallies: HashMap<ElectionId, ResultTally>,
    /// Append-only.
    receipts: Vec<Receipt>,
    next_election_id: ElectionId,
    next_candidate_id: CandidateId,
}

impl Ledger {
    fn election(&self, id: ElectionId) -> Option<&Election> {
        self.elections.iter().find(|election| election.id == id)
    }

    fn election_mut(&mut self, id: ElectionId) -> Option<&mut Election> {
        self.elections.iter_mut().find(|election| election.id == id)
    }

    /// Allocate an election ID that no stored election uses.
    fn allocate_election_id(&mut self) -> ElectionId {
        loop {
            self.next_election_id = self.next_election_id.wrapping_add(1);
            let candidate = self.next_election_id;
            if self.election(candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Allocate a candidate ID that no stored candidate uses.
    fn allocate_candidate_id(&mut self) -> CandidateId {
        loop {
            self.next_candidate_id = self.next_candidate_id.wrapping_add(1);
            let id = self.next_candidate_id;
            let taken = self
                .elections
                .iter()
                .flat_map(|election| election.candidates())
                .any(|candidate| candidate.id == id);
            if !taken {
                return id;
            }
        }
    }

    fn has_receipt(&self, election_id: ElectionId, voter: &str) -> bool {
        self.receipts
            .iter()
            .any(|receipt| {
                receipt.election_id == election_id && receipt.voter.eq_ignore_ascii_case(voter)
            })
    }
}

/// Handle to the shared ledger. Clones refer to the same ledger.
#[derive(Clone)]
pub struct ElectionStore {
    ledger: Arc<Mutex<Ledger>>,
    /// Ballots between validation and recording, keyed by election and voter.
    in_flight: Arc<StdMutex<HashSet<(ElectionId, Identity)>>>,
    confirmation: Arc<dyn ConfirmationProvider>,
    confirmation_timeout: Duration,
}

impl ElectionStore {
    /// An empty store whose ballots are confirmed immediately.
    pub fn new() -> Self {
        Self::from_parts(
            Ledger::default(),
            SimulatedConfirmation::instant(DEFAULT_NETWORK),
            DEFAULT_CONFIRMATION_TIMEOUT,
        )
    }

    /// A store over the given ledger, confirming ballots with `confirmation`.
    pub fn from_parts(
        ledger: Ledger,
        confirmation: impl ConfirmationProvider + 'static,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            in_flight: Default::default(),
            confirmation: Arc::new(confirmation),
            confirmation_timeout,
        }
    }

    async fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().await
    }

    /// Every election, in insertion order.
    pub async fn list_elections(&self) -> Vec<Election> {
        self.lock().await.elections.clone()
    }

    pub async fn get_election(&self, id: ElectionId) -> Option<Election> {
        self.lock().await.election(id).cloned()
    }

    /// The stored tally, empty if no vote has been recorded yet.
    pub async fn get_tally(&self, election_id: ElectionId) -> ResultTally {
        self.lock()
            .await
            .tallies
            .get(&election_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Receipts matching the filter, in the order they were recorded.
    pub async fn list_receipts(&self, filter: &ReceiptFilter) -> Vec<Receipt> {
        self.lock()
            .await
            .receipts
            .iter()
            .filter(|receipt| filter.matches(receipt))
            .cloned()
            .collect()
    }

    /// One election with its tally and receipts, read under a single lock.
    pub async fn dump(&self, election_id: ElectionId) -> Option<LedgerDump> {
        let ledger = self.lock().await;
        let election = ledger.election(election_id)?.clone();
        let tally = ledger
            .tallies
            .get(&election_id)
            .cloned()
            .unwrap_or_default();
        let receipts = ledger
            .receipts
            .iter()
            .filter(|receipt| receipt.election_id == election_id)
            .cloned()
            .collect();
        Some(LedgerDump {
            election,
            tally,
            receipts,
        })
    }
}

impl Default for ElectionStore {
    fn default() -> Self {
        Self::new()
    }
}
