use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::carbon::CarbonAccounting;
use crate::dispatch::DispatchOptimizer;
use crate::domain::BatteryState;
use crate::error::DispatchError;
use crate::sensitivity::SensitivityRunner;
use crate::simulation::Region;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub battery: BatteryConfig,
    pub optimizer: OptimizerConfig,
    pub sensitivity: SensitivityConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatteryConfig {
    pub capacity_mwh: f64,
    pub initial_charge_mwh: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    pub cost_weight: f64,
    pub emission_weight: f64,
    pub time_varying_carbon: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensitivityConfig {
    pub multipliers: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    pub region: Region,
    pub days: usize,
    pub seed: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("RDISPATCH__").split("__"));
        Ok(figment.extract()?)
    }

    pub fn battery_state(&self) -> Result<BatteryState, DispatchError> {
        BatteryState::new(self.battery.capacity_mwh, self.battery.initial_charge_mwh)?
            .with_efficiency(self.battery.efficiency)
    }

    pub fn dispatch_optimizer(&self) -> DispatchOptimizer {
        DispatchOptimizer::new(
            self.optimizer.cost_weight,
            self.optimizer.emission_weight,
            CarbonAccounting::from(self.optimizer.time_varying_carbon),
        )
    }

    pub fn sensitivity_runner(&self) -> Result<SensitivityRunner, DispatchError> {
        SensitivityRunner::new(self.sensitivity.multipliers.clone())
    }
}
