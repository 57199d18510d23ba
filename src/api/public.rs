use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionId, ElectionStatus, Identity},
    dump::LedgerDump,
    election::Election,
    receipt::{Receipt, ReceiptFilter},
    stats::DashboardStats,
    tally::TallyView,
};
use crate::store::ElectionStore;

pub fn routes() -> Vec<Route> {
    routes![
        elections,
        election,
        election_tally,
        election_dump,
        receipts,
        stats
    ]
}

#[get("/elections?<status>&<search>&<created_by>")]
async fn elections(
    status: Option<ElectionStatus>,
    search: Option<String>,
    created_by: Option<Identity>,
    store: &State<ElectionStore>,
) -> Json<Vec<Election>> {
    let elections = store
        .query_elections(
            status.unwrap_or_default(),
            search.as_deref().unwrap_or_default(),
            created_by.as_deref(),
        )
        .await;
    Json(elections)
}

#[get("/elections/<election_id>")]
async fn election(election_id: ElectionId, store: &State<ElectionStore>) -> Result<Json<Election>> {
    store
        .get_election(election_id)
        .await
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}

#[get("/elections/<election_id>/tally")]
async fn election_tally(
    election_id: ElectionId,
    store: &State<ElectionStore>,
) -> Result<Json<TallyView>> {
    store
        .tally_view(election_id)
        .await
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}

/// Everything needed to verify an election offline.
#[get("/elections/<election_id>/dump")]
async fn election_dump(
    election_id: ElectionId,
    store: &State<ElectionStore>,
) -> Result<Json<LedgerDump>> {
    store
        .dump(election_id)
        .await
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}

#[get("/receipts?<election_id>&<voter>")]
async fn receipts(
    election_id: Option<ElectionId>,
    voter: Option<Identity>,
    store: &State<ElectionStore>,
) -> Json<Vec<Receipt>> {
    let filter = ReceiptFilter { election_id, voter };
    Json(store.list_receipts(&filter).await)
}

#[get("/stats")]
async fn stats(store: &State<ElectionStore>) -> Json<DashboardStats> {
    Json(store.dashboard_stats().await)
}
