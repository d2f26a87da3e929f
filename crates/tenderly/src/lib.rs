//! Client for Tenderly forks and transaction simulations.
//!
//! A typical gas profiling run creates a fork at a block, runs a chain of
//! simulations on it (each one rooted at the previous simulation) and
//! finally deletes the fork.

pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod fork;
pub mod simulation;
pub mod validate;

use oval_utils::config::Config;

pub use api::ApiClient;
pub use config::TenderlyConfig;
pub use env::Environment;
pub use error::{Result, TenderlyError};
pub use fork::{Fork, ForkAccount, ForkManager, ForkParams};
pub use simulation::{ForkTarget, ResultUrl, SimulationParams, SimulationResult, SimulationRunner};

/// Fork manager and simulation runner sharing one resolved environment.
#[derive(Debug, Clone)]
pub struct Tenderly {
    pub forks: ForkManager,
    pub simulator: SimulationRunner,
}

impl Tenderly {
    pub fn new(env: Environment, cfg: TenderlyConfig) -> Result<Self> {
        let api = ApiClient::new(env, cfg)?;
        Ok(Self {
            forks: ForkManager::new(api.clone()),
            simulator: SimulationRunner::new(api),
        })
    }

    /// Resolves credentials from the process environment and endpoints from
    /// the `tenderly` config section.
    pub fn from_env() -> Result<Self> {
        let env = Environment::resolve()?;
        let cfg = TenderlyConfig::load_or_default()
            .map_err(|e| TenderlyError::Configuration(e.to_string()))?;
        Self::new(env, cfg)
    }
}
