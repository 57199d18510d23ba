pub mod auth;
pub mod common;
pub mod dump;
pub mod election;
pub mod receipt;
pub mod stats;
pub mod tally;
