use crate::model::{
    common::{normalize_identity, ElectionId, ElectionStatus},
    election::Election,
    receipt::Receipt,
    stats::DashboardStats,
    tally::TallyView,
};

use super::ElectionStore;

/// Derived, read-only views over the ledger.
impl ElectionStore {
    pub async fn active_elections(&self) -> Vec<Election> {
        self.search_elections(ElectionStatus::Active, "").await
    }

    pub async fn ended_elections(&self) -> Vec<Election> {
        self.search_elections(ElectionStatus::Ended, "").await
    }

    /// Elections with the given status matching `text`.
    pub async fn search_elections(&self, status: ElectionStatus, text: &str) -> Vec<Election> {
        self.query_elections(status, text, None).await
    }

    pub async fn elections_created_by(&self, identity: &str) -> Vec<Election> {
        self.query_elections(ElectionStatus::All, "", Some(identity)).await
    }

    /// Elections with the given status matching `text`, optionally only those
    /// authored by `created_by`.
    pub async fn query_elections(
        &self,
        status: ElectionStatus,
        text: &str,
        created_by: Option<&str>,
    ) -> Vec<Election> {
        let created_by = created_by.map(str::trim);
        self.lock()
            .await
            .elections
            .iter()
            .filter(|election| {
                status.matches(election.is_active)
                    && election.matches_text(text)
                    && created_by
                        .map_or(true, |author| election.created_by.eq_ignore_ascii_case(author))
            })
            .cloned()
            .collect()
    }

    /// The voter's receipt for this election, if they have voted in it.
    pub async fn receipt_for(&self, election_id: ElectionId, voter: &str) -> Option<Receipt> {
        let voter = normalize_identity(voter);
        self.lock()
            .await
            .receipts
            .iter()
            .find(|receipt| {
                receipt.election_id == election_id && receipt.voter.eq_ignore_ascii_case(&voter)
            })
            .cloned()
    }

    /// The tally for display, with totals. `None` if the election does not exist.
    pub async fn tally_view(&self, election_id: ElectionId) -> Option<TallyView> {
        let ledger = self.lock().await;
        let election = ledger.election(election_id)?;
        let tally = ledger
            .tallies
            .get(&election_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Some(TallyView::new(election_id, &election.options, tally))
    }

    pub async fn dashboard_stats(&self) -> DashboardStats {
        let ledger = self.lock().await;
        DashboardStats::compute(&ledger.elections, &ledger.receipts)
    }
}
