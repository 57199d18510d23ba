use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{required_text, CandidateId, ElectionId, Identity},
    election::{Candidate, Election},
};

/// An election specification, as submitted by an authoring actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSpec {
    pub title: String,
    pub description: String,
    /// Blank entries are dropped before validation.
    pub options: Vec<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl ElectionSpec {
    /// Validate this spec and turn it into an active election with the given ID.
    pub fn into_election(
        self,
        id: ElectionId,
        created_by: Identity,
        external_tx_ref: Option<String>,
    ) -> Result<Election> {
        let title = required_text("title", &self.title)?;
        let description = required_text("description", &self.description)?;
        let options = validate_options(self.options)?;
        let start_date = self
            .start_date
            .ok_or_else(|| Error::validation("startDate", "must be set"))?;
        let end_date = self
            .end_date
            .ok_or_else(|| Error::validation("endDate", "must be set"))?;
        check_date_range(start_date, end_date)?;

        Ok(Election {
            id,
            title,
            description,
            options,
            start_date,
            end_date,
            is_active: true,
            created_by,
            external_tx_ref,
            candidates: None,
        })
    }
}

/// Every mutable field of an election. Options are fixed at creation since
/// tallies and candidates index into them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ElectionUpdate {
    /// Produce the updated election without touching the original.
    pub fn apply_to(&self, election: &Election) -> Result<Election> {
        let mut updated = election.clone();
        if let Some(title) = &self.title {
            updated.title = required_text("title", title)?;
        }
        if let Some(description) = &self.description {
            updated.description = required_text("description", description)?;
        }
        if let Some(start_date) = self.start_date {
            updated.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            updated.end_date = end_date;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }
        check_date_range(updated.start_date, updated.end_date)?;
        Ok(updated)
    }
}

/// A candidate specification, to be attached to an existing election.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSpec {
    pub name: String,
    pub photo_url: String,
    pub biography: String,
    pub option_id: usize,
}

impl CandidateSpec {
    /// Validate this spec against the election it will belong to.
    pub fn into_candidate(self, id: CandidateId, election: &Election) -> Result<Candidate> {
        let name = required_text("name", &self.name)?;
        let photo_url = required_text("photoUrl", &self.photo_url)?;
        let biography = required_text("biography", &self.biography)?;
        if self.option_id >= election.options.len() {
            return Err(Error::validation(
                "optionId",
                format!(
                    "{} is out of range for {} options",
                    self.option_id,
                    election.options.len()
                ),
            ));
        }

        Ok(Candidate {
            id,
            name,
            photo_url,
            biography,
            option_id: self.option_id,
        })
    }
}

/// Trim the options, drop the blank ones, and require at least two distinct labels.
fn validate_options(options: Vec<String>) -> Result<Vec<String>> {
    let mut kept: Vec<String> = Vec::with_capacity(options.len());
    for option in options {
        let option = option.trim();
        if option.is_empty() {
            continue;
        }
        if kept.iter().any(|existing| existing == option) {
            return Err(Error::validation(
                "options",
                format!("duplicate option '{option}'"),
            ));
        }
        kept.push(option.to_string());
    }
    if kept.len() < 2 {
        return Err(Error::validation(
            "options",
            "at least two options are required",
        ));
    }
    Ok(kept)
}

fn check_date_range(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Result<()> {
    if end_date < start_date {
        Err(Error::validation("endDate", "must not be before startDate"))
    } else {
        Ok(())
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use chrono::TimeZone;

    impl ElectionSpec {
        pub fn example() -> Self {
            Self {
                title: "Governance Parameter Update".to_string(),
                description: "Should we update the minimum quorum requirement from 10% to 15%?"
                    .to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
                start_date: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
                end_date: Some(Utc.with_ymd_and_hms(2023, 1, 10, 0, 0, 0).unwrap()),
            }
        }

        pub fn three_way_example() -> Self {
            Self {
                title: "Protocol Upgrade Proposal".to_string(),
                description: "Should we implement the proposed V2 smart contract upgrade?"
                    .to_string(),
                options: vec![
                    "Approve".to_string(),
                    "Reject".to_string(),
                    "Abstain".to_string(),
                ],
                start_date: Some(Utc.with_ymd_and_hms(2023, 4, 10, 0, 0, 0).unwrap()),
                end_date: Some(Utc.with_ymd_and_hms(2023, 4, 25, 0, 0, 0).unwrap()),
            }
        }
    }

    impl CandidateSpec {
        pub fn example() -> Self {
            Self {
                name: "Ada Lovelace".to_string(),
                photo_url: "/images/candidate-1.jpg".to_string(),
                biography: "Wrote the first published algorithm.".to_string(),
                option_id: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: Error) -> &'static str {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_spec() {
        let election = ElectionSpec::example()
            .into_election(4, "0xAuthor".to_string(), Some("0xfeed".to_string()))
            .unwrap();
        assert_eq!(election.id, 4);
        assert_eq!(election.options, vec!["Yes", "No"]);
        assert!(election.is_active);
        assert_eq!(election.created_by, "0xAuthor");
        assert_eq!(election.external_tx_ref.as_deref(), Some("0xfeed"));
        assert!(election.candidates.is_none());
    }

    #[test]
    fn blank_options_are_dropped() {
        let mut spec = ElectionSpec::example();
        spec.options = vec![" Yes ".into(), "".into(), "   ".into(), "No".into()];
        let election = spec.into_election(1, "a".into(), None).unwrap();
        assert_eq!(election.options, vec!["Yes", "No"]);
    }

    #[test]
    fn invalid_specs() {
        let mut spec = ElectionSpec::example();
        spec.options = vec!["OnlyOne".into()];
        assert_eq!(field_of(spec.into_election(1, "a".into(), None).unwrap_err()), "options");

        let mut spec = ElectionSpec::example();
        spec.options = vec!["Yes".into(), " Yes".into()];
        assert_eq!(field_of(spec.into_election(1, "a".into(), None).unwrap_err()), "options");

        let mut spec = ElectionSpec::example();
        spec.title = "  ".into();
        assert_eq!(field_of(spec.into_election(1, "a".into(), None).unwrap_err()), "title");

        let mut spec = ElectionSpec::example();
        spec.description = "".into();
        assert_eq!(
            field_of(spec.into_election(1, "a".into(), None).unwrap_err()),
            "description"
        );

        let mut spec = ElectionSpec::example();
        spec.start_date = None;
        assert_eq!(
            field_of(spec.into_election(1, "a".into(), None).unwrap_err()),
            "startDate"
        );

        let mut spec = ElectionSpec::example();
        spec.end_date = None;
        assert_eq!(field_of(spec.into_election(1, "a".into(), None).unwrap_err()), "endDate");

        let mut spec = ElectionSpec::example();
        std::mem::swap(&mut spec.start_date, &mut spec.end_date);
        assert_eq!(field_of(spec.into_election(1, "a".into(), None).unwrap_err()), "endDate");
    }

    #[test]
    fn same_day_range_is_allowed() {
        let mut spec = ElectionSpec::example();
        spec.end_date = spec.start_date;
        assert!(spec.into_election(1, "a".into(), None).is_ok());
    }

    #[test]
    fn update_merges_fields() {
        let election = Election::example();
        let update = ElectionUpdate {
            title: Some("  Renamed ".to_string()),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = update.apply_to(&election).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(!updated.is_active);
        assert_eq!(updated.description, election.description);
        assert_eq!(updated.options, election.options);
        assert_eq!(updated.start_date, election.start_date);
    }

    #[test]
    fn update_checks_merged_dates() {
        let election = Election::example();
        let update = ElectionUpdate {
            end_date: Some(election.start_date - chrono::Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(field_of(update.apply_to(&election).unwrap_err()), "endDate");

        let update = ElectionUpdate {
            description: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(field_of(update.apply_to(&election).unwrap_err()), "description");
    }

    #[test]
    fn candidate_validation() {
        let election = Election::example();

        let candidate = CandidateSpec::example().into_candidate(9, &election).unwrap();
        assert_eq!(candidate.id, 9);
        assert_eq!(candidate.option_id, 0);

        let mut spec = CandidateSpec::example();
        spec.option_id = 2;
        assert_eq!(field_of(spec.into_candidate(9, &election).unwrap_err()), "optionId");

        let mut spec = CandidateSpec::example();
        spec.name = " ".into();
        assert_eq!(field_of(spec.into_candidate(9, &election).unwrap_err()), "name");

        let mut spec = CandidateSpec::example();
        spec.photo_url = "".into();
        assert_eq!(field_of(spec.into_candidate(9, &election).unwrap_err()), "photoUrl");

        let mut spec = CandidateSpec::example();
        spec.biography = "".into();
        assert_eq!(field_of(spec.into_candidate(9, &election).unwrap_err()), "biography");
    }
}
