use std::time::Duration;

use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::confirmation::{SimulatedConfirmation, DEFAULT_NETWORK};
use crate::store::{ElectionStore, Ledger};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default = "default_network_label")]
    network_label: String,
    #[serde(default = "default_confirmation_delay_ms")]
    confirmation_delay_ms: u64,
    #[serde(default = "default_confirmation_timeout_ms")]
    confirmation_timeout_ms: u64,
    #[serde(default)]
    admin_identities: Vec<String>,
    #[serde(default)]
    seed_demo_data: bool,
    // secrets
    admin_code: String,
}

fn default_network_label() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_confirmation_delay_ms() -> u64 {
    1500
}

fn default_confirmation_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Network label stamped on every receipt.
    pub fn network_label(&self) -> &str {
        &self.network_label
    }

    /// Simulated time for a ballot to be confirmed.
    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    /// Longest a ballot may wait for confirmation before it is rejected.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    /// Is this identity allowed to author elections without logging in?
    pub fn is_admin_identity(&self, identity: &str) -> bool {
        self.admin_identities
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(identity))
    }

    /// Does the submitted code unlock authoring?
    pub fn admin_code_matches(&self, code: &str) -> bool {
        !self.admin_code.is_empty() && self.admin_code == code
    }

    /// Should the store start with the sample elections?
    pub fn seed_demo_data(&self) -> bool {
        self.seed_demo_data
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the election store from the managed config and
/// places it into managed state. Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Election store needs the application config, which is not loaded");
            return Err(rocket);
        };

        let ledger = if config.seed_demo_data() {
            Ledger::demo()
        } else {
            Ledger::default()
        };
        let confirmation =
            SimulatedConfirmation::new(config.confirmation_delay(), config.network_label());
        info!(
            "Ballots confirm after {:?} on {}",
            confirmation.delay(),
            config.network_label()
        );
        let store = ElectionStore::from_parts(ledger, confirmation, config.confirmation_timeout());

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}


#[cfg(test)]
pub use examples::{TEST_ADMIN_CODE, TEST_ADMIN_IDENTITY};

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::figment::{providers::Serialized, Figment};

    #[test]
    fn defaults() {
        let figment = Figment::new().merge(Serialized::default("admin_code", "secret"));
        let config: Config = figment.extract().unwrap();
        assert_eq!(config.network_label(), DEFAULT_NETWORK);
        assert_eq!(config.confirmation_delay(), Duration::from_millis(1500));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(10));
        assert!(!config.seed_demo_data());
        assert!(!config.is_admin_identity("0xanyone"));
    }

    #[test]
    fn missing_admin_code_is_an_error() {
        let figment = Figment::new().merge(Serialized::default("seed_demo_data", true));
        assert!(figment.extract::<Config>().is_err());
    }

    #[test]
    fn admin_checks() {
        let config = Config::example();
        assert!(config.is_admin_identity(TEST_ADMIN_IDENTITY));
        assert!(config.is_admin_identity(&TEST_ADMIN_IDENTITY.to_uppercase()));
        assert!(!config.is_admin_identity("0xSomeoneElse"));
        assert!(config.admin_code_matches(TEST_ADMIN_CODE));
        assert!(!config.admin_code_matches("wrong"));
        assert!(!config.admin_code_matches(""));
    }
}
