use std::time::Duration;

use rocket::{
    http::{Status, StatusClass},
    response::Responder,
};
use thiserror::Error;

use crate::model::common::ElectionId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Voter {voter} has already voted in election {election_id}")]
    AlreadyVoted {
        election_id: ElectionId,
        voter: String,
    },
    #[error("Confirmation failed: {0}")]
    Confirmation(String),
    #[error("Confirmation timed out after {0:?}")]
    ConfirmationTimeout(Duration),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation { .. } => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::AlreadyVoted { .. } => Status::Conflict,
            Self::Confirmation(_) => Status::BadGateway,
            Self::ConfirmationTimeout(_) => Status::GatewayTimeout,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match status.class() {
            StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }
        Err(status)
    }
}
