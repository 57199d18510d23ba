use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    auth::AuthoringActor,
    common::{CandidateId, ElectionId},
    election::{Candidate, CandidateSpec, Election, ElectionSpec, ElectionUpdate},
};
use crate::store::ElectionStore;

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        update_election,
        toggle_election,
        add_candidate,
        remove_candidate
    ]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    actor: AuthoringActor,
    spec: Json<ElectionSpec>,
    store: &State<ElectionStore>,
) -> Result<Json<Election>> {
    let election = store.create_election(spec.into_inner(), actor.0).await?;
    Ok(Json(election))
}

#[put("/elections/<election_id>", data = "<update>", format = "json")]
async fn update_election(
    _actor: AuthoringActor,
    election_id: ElectionId,
    update: Json<ElectionUpdate>,
    store: &State<ElectionStore>,
) -> Result<Json<Election>> {
    let election = store
        .update_election(election_id, update.into_inner())
        .await?;
    Ok(Json(election))
}

#[post("/elections/<election_id>/toggle")]
async fn toggle_election(
    _actor: AuthoringActor,
    election_id: ElectionId,
    store: &State<ElectionStore>,
) -> Result<Json<Election>> {
    let election = store.toggle_election_active(election_id).await?;
    Ok(Json(election))
}

#[post("/elections/<election_id>/candidates", data = "<spec>", format = "json")]
async fn add_candidate(
    _actor: AuthoringActor,
    election_id: ElectionId,
    spec: Json<CandidateSpec>,
    store: &State<ElectionStore>,
) -> Result<Json<Candidate>> {
    let candidate = store
        .add_candidate(election_id, spec.into_inner())
        .await?;
    Ok(Json(candidate))
}

/// Returns whether a candidate was removed.
#[delete("/elections/<election_id>/candidates/<candidate_id>")]
async fn remove_candidate(
    _actor: AuthoringActor,
    election_id: ElectionId,
    candidate_id: CandidateId,
    store: &State<ElectionStore>,
) -> Json<bool> {
    Json(store.remove_candidate(election_id, candidate_id).await)
}
