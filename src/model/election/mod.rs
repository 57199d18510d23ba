mod base;
mod spec;

pub use base::{Candidate, Election};
pub use spec::{CandidateSpec, ElectionSpec, ElectionUpdate};
