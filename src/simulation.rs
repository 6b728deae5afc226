//! Synthetic regional forecast profiles.
//!
//! Demo and test tooling, not a forecasting method: produces a valid
//! [`ForecastSeries`] with plausible diurnal shapes for a few reference
//! regions. Deterministic for a given seed.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::domain::{ForecastSeries, HourRecord};
use crate::error::DispatchError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Region {
    California,
    Texas,
    Norway,
}

struct RegionProfile {
    base_demand: f64,
    solar_capacity: f64,
    wind_capacity: f64,
    hydro_capacity: f64,
    price_base: f64,
}

impl Region {
    fn profile(self) -> RegionProfile {
        match self {
            Self::California => RegionProfile {
                base_demand: 1000.0,
                solar_capacity: 600.0,
                wind_capacity: 300.0,
                hydro_capacity: 200.0,
                price_base: 50.0,
            },
            Self::Texas => RegionProfile {
                base_demand: 1200.0,
                solar_capacity: 400.0,
                wind_capacity: 700.0,
                hydro_capacity: 100.0,
                price_base: 45.0,
            },
            Self::Norway => RegionProfile {
                base_demand: 800.0,
                solar_capacity: 150.0,
                wind_capacity: 400.0,
                hydro_capacity: 600.0,
                price_base: 40.0,
            },
        }
    }
}

/// Generate `days` whole days of hourly forecast for `region`, starting
/// 2025-01-01T00:00Z. Same seed, same series.
pub fn synthetic_series(
    region: Region,
    days: usize,
    seed: u64,
) -> Result<ForecastSeries, DispatchError> {
    if days == 0 {
        return Err(DispatchError::InvalidInput(
            "synthetic forecast needs at least one day".into(),
        ));
    }

    let profile = region.profile();
    let mut rng = StdRng::seed_from_u64(seed);
    let demand_noise = Normal::new(0.0, 0.05).expect("valid stddev");
    let solar_noise = Normal::new(0.0, 0.1).expect("valid stddev");
    let price_noise = Normal::new(0.0, 0.1).expect("valid stddev");

    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let hours = days * 24;
    let mut records = Vec::with_capacity(hours);

    for t in 0..hours {
        let hour = t % 24;
        let angle = |h: f64| h * std::f64::consts::PI / 12.0;

        // Demand: diurnal sine centered mid-day, floored at half base load.
        let demand_pattern = 0.7 + 0.3 * angle(hour as f64 - 6.0).sin();
        let demand = (profile.base_demand * (demand_pattern + demand_noise.sample(&mut rng)))
            .max(profile.base_demand * 0.5);

        // Solar: daylight only, peak at noon.
        let solar = if (6..=18).contains(&hour) {
            (profile.solar_capacity
                * (angle(hour as f64 - 6.0).sin() + solar_noise.sample(&mut rng)))
            .max(0.0)
        } else {
            0.0
        };

        // Wind: varies through the day, somewhat stronger at night.
        let wind_pattern = 0.5 + 0.3 * angle(hour as f64).sin() + 0.2 * rng.gen::<f64>();
        let wind = (profile.wind_capacity * wind_pattern).max(0.0);

        // Hydro: stable with mild variation.
        let hydro = profile.hydro_capacity * (0.7 + 0.2 * rng.gen::<f64>());

        // Price: morning and evening peaks, cheap nights. Floored well
        // above zero so the series always satisfies the price contract.
        let price_multiplier = match hour {
            7..=10 | 17..=21 => 1.5,
            0..=5 => 0.6,
            _ => 1.0,
        };
        let price = (profile.price_base * (price_multiplier + price_noise.sample(&mut rng)))
            .max(profile.price_base * 0.1);

        records.push(HourRecord {
            timestamp: start + Duration::hours(t as i64),
            demand_mwh: demand,
            solar_available_mwh: solar,
            wind_available_mwh: wind,
            hydro_available_mwh: hydro,
            price_per_mwh: price,
        });
    }

    ForecastSeries::new(records)
}
