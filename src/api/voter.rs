use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    auth::Voter,
    common::ElectionId,
    receipt::{Ballot, Receipt, ReceiptFilter},
};
use crate::store::ElectionStore;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, voter_receipts, voter_receipt]
}

/// Cast the caller's vote. Waits for the ballot to be confirmed.
#[post("/elections/<election_id>/vote", data = "<ballot>", format = "json")]
async fn cast_vote(
    election_id: ElectionId,
    ballot: Json<Ballot>,
    voter: Voter,
    store: &State<ElectionStore>,
) -> Result<Json<Receipt>> {
    let election = store
        .get_election(election_id)
        .await
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    if !election.is_active {
        return Err(Error::Status(
            Status::Forbidden,
            format!("Election {election_id} is not accepting votes"),
        ));
    }

    let receipt = store.cast_vote(election_id, &ballot.option, &voter.0).await?;
    Ok(Json(receipt))
}

/// Every receipt held by the caller.
#[get("/voter/receipts")]
async fn voter_receipts(voter: Voter, store: &State<ElectionStore>) -> Json<Vec<Receipt>> {
    Json(store.list_receipts(&ReceiptFilter::for_voter(voter.0)).await)
}

/// The caller's receipt for one election; 404 if they have not voted in it.
#[get("/voter/elections/<election_id>/receipt")]
async fn voter_receipt(
    election_id: ElectionId,
    voter: Voter,
    store: &State<ElectionStore>,
) -> Result<Json<Receipt>> {
    store
        .receipt_for(election_id, &voter.0)
        .await
        .map(Json)
        .ok_or_else(|| {
            Error::not_found(format!(
                "Receipt for {} in election {election_id}",
                voter.0
            ))
        })
}
