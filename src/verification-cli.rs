//! A simple CLI tool for verifying an election's ledger.
//! This uses the server's own verification routine, so it accepts exactly
//! what `GET /elections/<election_id>/dump` returns.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;
use thiserror::Error;

use votechain_backend::model::{
    dump::{LedgerDump, VerificationError},
    tally::TallyView,
};

const PROGRAM_NAME: &str = "verify-ledger";

const ABOUT_TEXT: &str = "Verify the integrity of an election's tally and receipts.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
 Other: Error.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of a single election,\n\
as returned by `GET /elections/<election_id>/dump`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(DUMP_PATH)
            .help(DUMP_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Error, PartialEq)]
enum Error {
    #[error("Could not read the dump: {0}")]
    IO(String),
    #[error("Could not decode the dump: {0}")]
    Format(String),
    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),
}

/// The verified result for one option.
#[derive(Debug, PartialEq)]
struct FriendlyResults {
    pub option_text: String,
    pub votes: u64,
    pub percentage: f64,
}

impl Display for FriendlyResults {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} vote{} ({:.1}%)",
            self.option_text,
            self.votes,
            if self.votes != 1 { "s" } else { "" },
            self.percentage
        )
    }
}

/// Load and verify a dump.
fn verify(path: &str) -> Result<(LedgerDump, Vec<FriendlyResults>), Error> {
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: LedgerDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    let counts = dump.verify()?;
    let view = TallyView::new(dump.election.id, &dump.election.options, &counts);
    let results = view
        .results
        .into_iter()
        .map(|result| FriendlyResults {
            option_text: result.option_text,
            votes: result.votes,
            percentage: result.percentage,
        })
        .collect();
    Ok((dump, results))
}

/// Run the program, returning the exit code.
fn run(args: &ArgMatches) -> u8 {
    // Unwrap safe as the argument is required.
    let path = args.get_one::<String>(DUMP_PATH).unwrap();

    match verify(path) {
        Ok((dump, results)) => {
            println!(
                "Election {} '{}': {} receipt{} verified.",
                dump.election.id,
                dump.election.title,
                dump.receipts.len(),
                if dump.receipts.len() != 1 { "s" } else { "" }
            );
            for result in results {
                println!("{result}");
            }
            0
        }
        Err(err @ Error::Verification(_)) => {
            println!("{err}");
            255
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
