#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StoreFairing};
use crate::logging::LoggerFairing;
use crate::store::ElectionStore;

pub mod api;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

pub use config::Config;

/// The server, configured from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
}

/// The server over an existing store and config, skipping the config and
/// store fairings.
pub fn rocket_for_store(store: ElectionStore, config: Config) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .manage(config)
        .manage(store)
}
