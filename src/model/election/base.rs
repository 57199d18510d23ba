use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, ElectionId, Identity};

/// A single proposal with a fixed option set, as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    /// Unique ID.
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    /// Distinct option labels. Tallies and candidates index into this.
    pub options: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Toggled by authoring actors; independent of the date range.
    pub is_active: bool,
    /// Identity of the authoring actor that created the election.
    pub created_by: Identity,
    /// Opaque provenance string standing in for a creation transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_tx_ref: Option<String>,
    /// Absent until the first candidate is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
}

impl Election {
    /// Index of the option with exactly this label.
    pub fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|option| option == label)
    }

    /// Candidates attached to this election, empty if none were ever added.
    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.as_deref().unwrap_or_default()
    }

    /// Case-insensitive substring match over title, description and option labels.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .options
                .iter()
                .any(|option| option.to_lowercase().contains(&needle))
    }
}

/// A person standing for one of an election's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub photo_url: String,
    pub biography: String,
    /// Index into the owning election's options.
    pub option_id: usize,
}
