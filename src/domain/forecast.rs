use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::carbon::EnergySource;
use crate::error::DispatchError;

/// One hour of forecasted demand, per-source availability and price.
/// Produced by an external forecaster; the dispatch core only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    pub timestamp: DateTime<Utc>,
    pub demand_mwh: f64,
    pub solar_available_mwh: f64,
    pub wind_available_mwh: f64,
    pub hydro_available_mwh: f64,
    pub price_per_mwh: f64,
}

impl HourRecord {
    pub fn available(&self, source: EnergySource) -> f64 {
        match source {
            EnergySource::Solar => self.solar_available_mwh,
            EnergySource::Wind => self.wind_available_mwh,
            EnergySource::Hydro => self.hydro_available_mwh,
        }
    }
}

/// An ordered, validated hourly forecast covering the planning horizon.
///
/// Construction enforces the data contract with the forecaster: strictly
/// increasing hourly timestamps, non-negative demand and availability,
/// strictly positive prices. Callers planning in whole days check the
/// horizon shape with [`ForecastSeries::ensure_daily_horizon`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSeries {
    records: Vec<HourRecord>,
}

impl ForecastSeries {
    pub fn new(records: Vec<HourRecord>) -> Result<Self, DispatchError> {
        if records.is_empty() {
            return Err(DispatchError::InvalidInput(
                "forecast series is empty".into(),
            ));
        }
        for (t, record) in records.iter().enumerate() {
            if record.demand_mwh < 0.0 {
                return Err(DispatchError::InvalidInput(format!(
                    "negative demand {} at hour {t}",
                    record.demand_mwh
                )));
            }
            if record.solar_available_mwh < 0.0
                || record.wind_available_mwh < 0.0
                || record.hydro_available_mwh < 0.0
            {
                return Err(DispatchError::InvalidInput(format!(
                    "negative availability at hour {t}"
                )));
            }
            if record.price_per_mwh <= 0.0 {
                return Err(DispatchError::InvalidInput(format!(
                    "non-positive price {} at hour {t}",
                    record.price_per_mwh
                )));
            }
        }
        for (t, pair) in records.windows(2).enumerate() {
            if pair[1].timestamp - pair[0].timestamp != Duration::hours(1) {
                return Err(DispatchError::InvalidInput(format!(
                    "timestamps must increase by exactly one hour (hours {t}..{})",
                    t + 1
                )));
            }
        }
        Ok(Self { records })
    }

    /// Horizon length in hours.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[HourRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HourRecord> {
        self.records.iter()
    }

    /// Fail fast unless the series covers a whole number of days, the only
    /// horizon shape the planners accept.
    pub fn ensure_daily_horizon(&self) -> Result<(), DispatchError> {
        if self.len() % 24 != 0 {
            return Err(DispatchError::InvalidInput(format!(
                "horizon must be a multiple of 24 hours, got {}",
                self.len()
            )));
        }
        Ok(())
    }

    /// Fail fast unless the series length matches the horizon the caller
    /// asked its forecaster for.
    pub fn ensure_horizon(&self, hours: usize) -> Result<(), DispatchError> {
        if self.len() != hours {
            return Err(DispatchError::InvalidInput(format!(
                "forecast covers {} hours but {hours} were requested",
                self.len()
            )));
        }
        Ok(())
    }

    /// Derive a scenario copy with every hourly price scaled by
    /// `multiplier`. Demand and availability are price-invariant in this
    /// model and pass through unchanged; the base series is not touched.
    pub fn scaled_prices(&self, multiplier: f64) -> Self {
        let records = self
            .records
            .iter()
            .map(|record| HourRecord {
                price_per_mwh: record.price_per_mwh * multiplier,
                ..record.clone()
            })
            .collect();
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ForecastSeries {
    type Item = &'a HourRecord;
    type IntoIter = std::slice::Iter<'a, HourRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(hour: i64) -> HourRecord {
        HourRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
            demand_mwh: 100.0,
            solar_available_mwh: 50.0,
            wind_available_mwh: 30.0,
            hydro_available_mwh: 40.0,
            price_per_mwh: 50.0,
        }
    }

    #[test]
    fn accepts_hourly_series() {
        let series = ForecastSeries::new((0..24).map(record).collect()).unwrap();
        assert_eq!(series.len(), 24);
        assert!(series.ensure_daily_horizon().is_ok());
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(
            ForecastSeries::new(vec![]),
            Err(DispatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_non_monotonic_timestamps() {
        let mut records: Vec<_> = (0..24).map(record).collect();
        records.swap(3, 4);
        assert!(ForecastSeries::new(records).is_err());
    }

    #[test]
    fn rejects_gap_in_timestamps() {
        let records: Vec<_> = (0..24).map(|h| record(h * 2)).collect();
        assert!(ForecastSeries::new(records).is_err());
    }

    #[test]
    fn rejects_negative_demand_and_free_power() {
        let mut records: Vec<_> = (0..24).map(record).collect();
        records[5].demand_mwh = -1.0;
        assert!(ForecastSeries::new(records).is_err());

        let mut records: Vec<_> = (0..24).map(record).collect();
        records[5].price_per_mwh = 0.0;
        assert!(ForecastSeries::new(records).is_err());
    }

    #[test]
    fn partial_day_fails_horizon_check() {
        let series = ForecastSeries::new((0..25).map(record).collect()).unwrap();
        assert!(series.ensure_daily_horizon().is_err());
        assert!(series.ensure_horizon(24).is_err());
        assert!(series.ensure_horizon(25).is_ok());
    }

    #[test]
    fn price_scaling_leaves_base_alone() {
        let series = ForecastSeries::new((0..24).map(record).collect()).unwrap();
        let scaled = series.scaled_prices(1.5);
        assert_eq!(scaled.records()[0].price_per_mwh, 75.0);
        assert_eq!(series.records()[0].price_per_mwh, 50.0);
        assert_eq!(scaled.records()[0].demand_mwh, series.records()[0].demand_mwh);
    }
}
