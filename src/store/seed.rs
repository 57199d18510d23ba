use chrono::{DateTime, TimeZone, Utc};

use crate::confirmation::{SimulatedConfirmation, DEFAULT_NETWORK};
use crate::model::election::Election;

use super::{ElectionStore, Ledger, DEFAULT_CONFIRMATION_TIMEOUT};

const DEMO_AUTHOR: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn demo_election(
    id: u32,
    title: &str,
    description: &str,
    options: &[&str],
    (start_date, end_date): (DateTime<Utc>, DateTime<Utc>),
    is_active: bool,
    external_tx_ref: &str,
) -> Election {
    Election {
        id,
        title: title.to_string(),
        description: description.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        start_date,
        end_date,
        is_active,
        created_by: DEMO_AUTHOR.to_string(),
        external_tx_ref: Some(external_tx_ref.to_string()),
        candidates: None,
    }
}

impl Ledger {
    /// A ledger holding the sample proposals. No votes are recorded, so
    /// tallies start empty and agree with the (empty) receipt log.
    pub fn demo() -> Self {
        let elections = vec![
            demo_election(
                1,
                "Community Treasury Allocation",
                "How should we allocate the community treasury funds for Q2 2023?",
                &[
                    "Protocol Development",
                    "Marketing",
                    "Liquidity Incentives",
                    "Community Events",
                ],
                (midnight(2023, 4, 1), midnight(2023, 4, 15)),
                true,
                "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
            ),
            demo_election(
                2,
                "Governance Parameter Update",
                "Should we update the minimum quorum requirement from 10% to 15%?",
                &["Yes", "No"],
                (midnight(2023, 3, 15), midnight(2023, 3, 30)),
                false,
                "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
            ),
            demo_election(
                3,
                "Protocol Upgrade Proposal",
                "Should we implement the proposed V2 smart contract upgrade?",
                &["Approve", "Reject", "Abstain"],
                (midnight(2023, 4, 10), midnight(2023, 4, 25)),
                true,
                "0x7890abcdef1234567890abcdef1234567890abcdef1234567890abcdef123456",
            ),
        ];
        info!("Seeded {} demo elections", elections.len());
        Self {
            next_election_id: 3,
            elections,
            ..Default::default()
        }
    }
}

impl ElectionStore {
    /// A store holding the sample proposals, confirming ballots immediately.
    pub fn with_demo_data() -> Self {
        Self::from_parts(
            Ledger::demo(),
            SimulatedConfirmation::instant(DEFAULT_NETWORK),
            DEFAULT_CONFIRMATION_TIMEOUT,
        )
    }
}
