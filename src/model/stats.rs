use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{election::Election, receipt::Receipt};

/// How many distinct days of voting activity the dashboard shows.
pub const ACTIVITY_DAYS: usize = 7;

/// Overview figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_elections: usize,
    pub active_elections: usize,
    pub unique_voters: usize,
    pub total_candidates: usize,
    /// Oldest first.
    pub votes_by_date: Vec<DailyVotes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVotes {
    pub date: NaiveDate,
    pub votes: u64,
}

impl DashboardStats {
    pub fn compute(elections: &[Election], receipts: &[Receipt]) -> Self {
        let unique_voters = receipts
            .iter()
            .map(|receipt| receipt.voter.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut by_date = BTreeMap::<NaiveDate, u64>::new();
        for receipt in receipts {
            *by_date.entry(receipt.timestamp.date_naive()).or_default() += 1;
        }
        let skip = by_date.len().saturating_sub(ACTIVITY_DAYS);
        let votes_by_date = by_date
            .into_iter()
            .skip(skip)
            .map(|(date, votes)| DailyVotes { date, votes })
            .collect();

        Self {
            total_elections: elections.len(),
            active_elections: elections.iter().filter(|e| e.is_active).count(),
            unique_voters,
            total_candidates: elections.iter().map(|e| e.candidates().len()).sum(),
            votes_by_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn empty() {
        let stats = DashboardStats::compute(&[], &[]);
        assert_eq!(stats.total_elections, 0);
        assert_eq!(stats.unique_voters, 0);
        assert!(stats.votes_by_date.is_empty());
    }

    #[test]
    fn counts() {
        let active = Election::example();
        let mut ended = Election::example();
        ended.id = 2;
        ended.is_active = false;

        let receipts = vec![
            Receipt::example(1, "0xA", "Yes"),
            Receipt::example(1, "0xB", "No"),
            Receipt::example(2, "0xA", "Yes"),
        ];
        let stats = DashboardStats::compute(&[active, ended], &receipts);
        assert_eq!(stats.total_elections, 2);
        assert_eq!(stats.active_elections, 1);
        assert_eq!(stats.unique_voters, 2);
        assert_eq!(stats.total_candidates, 0);
    }

    #[test]
    fn activity_keeps_last_days() {
        let start = Utc.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).unwrap();
        let mut receipts = Vec::new();
        for day in 0..10 {
            let mut receipt = Receipt::example(1, &format!("0x{day}"), "Yes");
            receipt.timestamp = start + Duration::days(day);
            receipts.push(receipt);
        }
        // Two votes on the last day.
        let mut extra = Receipt::example(1, "0xextra", "No");
        extra.timestamp = start + Duration::days(9) + Duration::hours(3);
        receipts.push(extra);

        let stats = DashboardStats::compute(&[], &receipts);
        assert_eq!(stats.votes_by_date.len(), ACTIVITY_DAYS);
        assert_eq!(
            stats.votes_by_date.first().unwrap().date,
            NaiveDate::from_ymd_opt(2023, 4, 4).unwrap()
        );
        let last = stats.votes_by_date.last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2023, 4, 10).unwrap());
        assert_eq!(last.votes, 2);
    }
}
