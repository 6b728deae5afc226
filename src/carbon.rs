//! Lifecycle carbon intensity model.
//!
//! Renewable sources carry no stack emissions, but manufacturing,
//! installation and transport do. The factors here are lifecycle
//! kg CO2 per MWh, optionally scaled by a time-of-day multiplier that
//! reflects the grid carbon intensity embedded at build time.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Carbon price used to fold emissions into the cost objective:
/// $100/ton CO2 = $0.1/kg CO2.
pub const CARBON_PRICE_PER_KG: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnergySource {
    Solar,
    Wind,
    Hydro,
}

impl EnergySource {
    /// Base lifecycle emission factor (kg CO2/MWh).
    pub fn base_intensity(self) -> f64 {
        match self {
            Self::Solar => 45.0,
            Self::Wind => 12.0,
            Self::Hydro => 24.0,
        }
    }

    /// Relative marginal-cost multiplier applied to the hourly market
    /// price. Solar is cheapest, hydro most expensive; both dispatch
    /// strategies and the realized-cost accounting share these values.
    pub fn cost_factor(self) -> f64 {
        match self {
            Self::Solar => 0.5,
            Self::Wind => 0.6,
            Self::Hydro => 0.7,
        }
    }
}

/// Which emission factors a dispatch call accounts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonAccounting {
    /// Base lifecycle factors only.
    FixedBase,
    /// Base factors scaled by the time-of-day multiplier band.
    TimeVarying,
}

impl From<bool> for CarbonAccounting {
    fn from(time_varying: bool) -> Self {
        if time_varying {
            Self::TimeVarying
        } else {
            Self::FixedBase
        }
    }
}

impl CarbonAccounting {
    /// Emission intensity (kg CO2/MWh) for `source` at plan hour `hour`.
    /// Hours beyond the first day wrap modulo 24.
    pub fn intensity(self, hour: usize, source: EnergySource) -> f64 {
        match self {
            Self::FixedBase => source.base_intensity(),
            Self::TimeVarying => source.base_intensity() * time_of_day_multiplier(hour % 24),
        }
    }
}

/// Time-of-day multiplier for grid carbon intensity, half-open hour bands.
/// Night hours benefit from lower grid carbon; the evening peak is highest.
pub fn time_of_day_multiplier(hour: usize) -> f64 {
    match hour % 24 {
        0..=5 => 0.85,
        6..=8 => 1.0,
        9..=16 => 1.15,
        17..=20 => 1.25,
        _ => 0.95,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn base_factors() {
        assert_eq!(EnergySource::Solar.base_intensity(), 45.0);
        assert_eq!(EnergySource::Wind.base_intensity(), 12.0);
        assert_eq!(EnergySource::Hydro.base_intensity(), 24.0);
    }

    #[test]
    fn band_edges_are_half_open() {
        assert_eq!(time_of_day_multiplier(0), 0.85);
        assert_eq!(time_of_day_multiplier(5), 0.85);
        assert_eq!(time_of_day_multiplier(6), 1.0);
        assert_eq!(time_of_day_multiplier(8), 1.0);
        assert_eq!(time_of_day_multiplier(9), 1.15);
        assert_eq!(time_of_day_multiplier(16), 1.15);
        assert_eq!(time_of_day_multiplier(17), 1.25);
        assert_eq!(time_of_day_multiplier(20), 1.25);
        assert_eq!(time_of_day_multiplier(21), 0.95);
        assert_eq!(time_of_day_multiplier(23), 0.95);
    }

    #[test]
    fn hours_past_midnight_wrap() {
        for source in EnergySource::iter() {
            assert_eq!(
                CarbonAccounting::TimeVarying.intensity(26, source),
                CarbonAccounting::TimeVarying.intensity(2, source),
            );
        }
    }

    #[test]
    fn fixed_accounting_ignores_hour() {
        assert_eq!(
            CarbonAccounting::FixedBase.intensity(18, EnergySource::Solar),
            45.0
        );
        assert_eq!(
            CarbonAccounting::TimeVarying.intensity(18, EnergySource::Solar),
            45.0 * 1.25
        );
    }
}
