use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Default round-trip efficiency; the loss is applied on the charge leg.
pub const DEFAULT_ROUND_TRIP_EFFICIENCY: f64 = 0.9;

/// Fraction of capacity the battery can move per hour, in either direction.
pub const MAX_RATE_FRACTION: f64 = 0.2;

/// Battery parameters supplied by configuration or the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    pub capacity_mwh: f64,
    pub initial_charge_mwh: f64,
    pub round_trip_efficiency: f64,
}

impl BatteryState {
    pub fn new(capacity_mwh: f64, initial_charge_mwh: f64) -> Result<Self, DispatchError> {
        Self {
            capacity_mwh,
            initial_charge_mwh,
            round_trip_efficiency: DEFAULT_ROUND_TRIP_EFFICIENCY,
        }
        .validated()
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Result<Self, DispatchError> {
        self.round_trip_efficiency = efficiency;
        self.validated()
    }

    pub fn validated(self) -> Result<Self, DispatchError> {
        if !(self.capacity_mwh > 0.0) {
            return Err(DispatchError::InvalidInput(format!(
                "battery capacity must be positive, got {}",
                self.capacity_mwh
            )));
        }
        if !(0.0..=self.capacity_mwh).contains(&self.initial_charge_mwh) {
            return Err(DispatchError::InvalidInput(format!(
                "initial charge {} outside [0, {}]",
                self.initial_charge_mwh, self.capacity_mwh
            )));
        }
        if !(self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0) {
            return Err(DispatchError::InvalidInput(format!(
                "round-trip efficiency {} outside (0, 1]",
                self.round_trip_efficiency
            )));
        }
        Ok(self)
    }

    /// Maximum hourly charge or discharge energy (MWh).
    pub fn max_rate_mwh(&self) -> f64 {
        self.capacity_mwh * MAX_RATE_FRACTION
    }
}
