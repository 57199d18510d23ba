use serde::{Deserialize, Serialize};

use crate::model::common::ElectionId;

/// Vote counter for one option of one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub option_id: usize,
    pub option_text: String,
    pub votes: u64,
}

/// Per-option counters, index-aligned with the election's options.
pub type ResultTally = Vec<OptionTally>;

/// A tally with one zeroed counter per option.
pub fn zeroed(options: &[String]) -> ResultTally {
    options
        .iter()
        .enumerate()
        .map(|(option_id, option_text)| OptionTally {
            option_id,
            option_text: option_text.clone(),
            votes: 0,
        })
        .collect()
}

/// Sum of all counters.
pub fn total_votes(tally: &[OptionTally]) -> u64 {
    tally.iter().map(|entry| entry.votes).sum()
}

/// Results for display: every option, with totals and shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyView {
    pub election_id: ElectionId,
    pub results: Vec<OptionResult>,
    pub total_votes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: usize,
    pub option_text: String,
    pub votes: u64,
    /// Share of the total in percent; zero when nobody has voted.
    pub percentage: f64,
}

impl TallyView {
    /// Build the view from a stored tally, or from the options alone if no votes exist yet.
    pub fn new(election_id: ElectionId, options: &[String], tally: &[OptionTally]) -> Self {
        let tally = if tally.is_empty() {
            zeroed(options)
        } else {
            tally.to_vec()
        };
        let total_votes = total_votes(&tally);
        let results = tally
            .into_iter()
            .map(|entry| OptionResult {
                percentage: if total_votes == 0 {
                    0.0
                } else {
                    entry.votes as f64 * 100.0 / total_votes as f64
                },
                option_id: entry.option_id,
                option_text: entry.option_text,
                votes: entry.votes,
            })
            .collect();
        Self {
            election_id,
            results,
            total_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Approve".into(), "Reject".into(), "Abstain".into()]
    }

    #[test]
    fn zeroed_is_index_aligned() {
        let tally = zeroed(&options());
        assert_eq!(tally.len(), 3);
        for (i, entry) in tally.iter().enumerate() {
            assert_eq!(entry.option_id, i);
            assert_eq!(entry.option_text, options()[i]);
            assert_eq!(entry.votes, 0);
        }
        assert_eq!(total_votes(&tally), 0);
    }

    #[test]
    fn view_without_votes() {
        let view = TallyView::new(2, &options(), &[]);
        assert_eq!(view.total_votes, 0);
        assert_eq!(view.results.len(), 3);
        assert!(view.results.iter().all(|r| r.percentage == 0.0));
    }

    #[test]
    fn view_percentages() {
        let mut tally = zeroed(&options());
        tally[0].votes = 3;
        tally[2].votes = 1;
        let view = TallyView::new(2, &options(), &tally);
        assert_eq!(view.total_votes, 4);
        assert_eq!(view.results[0].percentage, 75.0);
        assert_eq!(view.results[1].percentage, 0.0);
        assert_eq!(view.results[2].percentage, 25.0);
    }
}
