use crate::confirmation::random_ref;
use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ElectionId, Identity},
    election::{Candidate, CandidateSpec, Election, ElectionSpec, ElectionUpdate},
};

use super::ElectionStore;

/// Operations for authoring actors. Callers are trusted to have checked
/// permission; nothing here does authorization.
impl ElectionStore {
    /// Validate and store a new, active election.
    pub async fn create_election(
        &self,
        spec: ElectionSpec,
        created_by: impl Into<Identity>,
    ) -> Result<Election> {
        let mut ledger = self.lock().await;
        // Validate before allocating, so a rejected spec leaves the counter untouched.
        let election = spec.into_election(0, created_by.into(), Some(random_ref()))?;
        let election = Election {
            id: ledger.allocate_election_id(),
            ..election
        };
        ledger.elections.push(election.clone());
        info!(
            "Created election {} '{}' with {} options",
            election.id,
            election.title,
            election.options.len()
        );
        Ok(election)
    }

    /// Flip the active flag. Dates are left alone.
    pub async fn toggle_election_active(&self, election_id: ElectionId) -> Result<Election> {
        let mut ledger = self.lock().await;
        let election = ledger
            .election_mut(election_id)
            .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
        election.is_active = !election.is_active;
        info!(
            "Election {election_id} is now {}",
            if election.is_active { "active" } else { "inactive" }
        );
        Ok(election.clone())
    }

    /// Apply an update to the mutable fields, all or nothing.
    pub async fn update_election(
        &self,
        election_id: ElectionId,
        update: ElectionUpdate,
    ) -> Result<Election> {
        let mut ledger = self.lock().await;
        let election = ledger
            .election_mut(election_id)
            .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
        *election = update.apply_to(election)?;
        info!("Updated election {election_id}");
        Ok(election.clone())
    }

    /// Attach a new candidate to an election.
    pub async fn add_candidate(
        &self,
        election_id: ElectionId,
        spec: CandidateSpec,
    ) -> Result<Candidate> {
        let mut ledger = self.lock().await;
        let election = ledger
            .election(election_id)
            .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
        let candidate = spec.into_candidate(0, election)?;
        let candidate = Candidate {
            id: ledger.allocate_candidate_id(),
            ..candidate
        };

        // Presence checked above, under the same lock.
        if let Some(election) = ledger.election_mut(election_id) {
            election
                .candidates
                .get_or_insert_with(Vec::new)
                .push(candidate.clone());
        }
        info!(
            "Added candidate {} '{}' to election {election_id}",
            candidate.id, candidate.name
        );
        Ok(candidate)
    }

    /// Remove a candidate. Returns whether anything was removed.
    pub async fn remove_candidate(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> bool {
        let mut ledger = self.lock().await;
        let Some(candidates) = ledger
            .election_mut(election_id)
            .and_then(|election| election.candidates.as_mut())
        else {
            debug!("No candidates to remove from election {election_id}");
            return false;
        };
        let before = candidates.len();
        candidates.retain(|candidate| candidate.id != candidate_id);
        let removed = candidates.len() != before;
        if removed {
            info!("Removed candidate {candidate_id} from election {election_id}");
        } else {
            debug!("Candidate {candidate_id} not found in election {election_id}");
        }
        removed
    }
}
