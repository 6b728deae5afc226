//! Myopic merit-order baseline.
//!
//! Serves each hour in isolation with no lookahead: cheapest source first
//! (solar, then wind, then hydro), battery discharge for the remainder,
//! leftover generation into the battery. Exists to show how much the LP
//! actually buys over a sensible rule of thumb.

use tracing::info;

use crate::carbon::EnergySource;
use crate::dispatch::DispatchStrategy;
use crate::domain::{BatteryState, DispatchPlan, ForecastSeries, HourlyAllocation, PlanStatus};
use crate::error::DispatchError;

/// Deterministic hour-by-hour heuristic. Never infeasible: shortfall is
/// recorded as unmet demand, not penalized or optimized.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyDispatcher;

impl GreedyDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn dispatch(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
    ) -> Result<DispatchPlan, DispatchError> {
        let battery = battery.validated()?;

        let max_rate = battery.max_rate_mwh();
        let efficiency = battery.round_trip_efficiency;
        let mut level = battery.initial_charge_mwh;

        let mut hours = Vec::with_capacity(series.len());

        for (t, record) in series.iter().enumerate() {
            let mut remaining = record.demand_mwh;

            // Fixed merit order reflecting relative cost: solar cheapest.
            let mut solar_use = record.solar_available_mwh.min(remaining);
            remaining -= solar_use;
            let mut wind_use = record.wind_available_mwh.min(remaining);
            remaining -= wind_use;
            let mut hydro_use = record.hydro_available_mwh.min(remaining);
            remaining -= hydro_use;

            let battery_discharge = remaining.min(max_rate).min(level);
            level -= battery_discharge;
            remaining -= battery_discharge;

            let unmet_demand = remaining.max(0.0);

            // Store leftover generation, bounded by the rate limit and the
            // headroom left after charge-leg losses.
            let excess_solar = record.solar_available_mwh - solar_use;
            let excess_wind = record.wind_available_mwh - wind_use;
            let excess_hydro = record.hydro_available_mwh - hydro_use;
            let total_excess = excess_solar + excess_wind + excess_hydro;

            let mut battery_charge = 0.0;
            if total_excess > 0.0 {
                battery_charge = total_excess
                    .min(max_rate)
                    .min((battery.capacity_mwh - level) / efficiency);
                level += battery_charge * efficiency;

                // Attribute the charged energy back into each source's
                // reported use, proportional to its share of the leftover,
                // so per-source use never exceeds availability.
                let charge_fraction = battery_charge / total_excess;
                solar_use += excess_solar * charge_fraction;
                wind_use += excess_wind * charge_fraction;
                hydro_use += excess_hydro * charge_fraction;
            }

            hours.push(HourlyAllocation {
                hour: t,
                timestamp: record.timestamp,
                demand_mwh: record.demand_mwh,
                solar_use_mwh: solar_use,
                wind_use_mwh: wind_use,
                hydro_use_mwh: hydro_use,
                battery_charge_mwh: battery_charge,
                battery_discharge_mwh: battery_discharge,
                battery_level_mwh: level,
                unmet_demand_mwh: unmet_demand,
                price_per_mwh: record.price_per_mwh,
            });
        }

        let total_cost: f64 = hours
            .iter()
            .map(|h| {
                h.price_per_mwh
                    * (h.solar_use_mwh * EnergySource::Solar.cost_factor()
                        + h.wind_use_mwh * EnergySource::Wind.cost_factor()
                        + h.hydro_use_mwh * EnergySource::Hydro.cost_factor())
            })
            .sum();
        // The baseline always accounts emissions with the fixed base
        // factors, whatever accounting mode the optimizer was configured
        // with. Deliberate asymmetry; callers compare against it as-is.
        let total_emissions_kg: f64 = hours
            .iter()
            .map(|h| {
                h.solar_use_mwh * EnergySource::Solar.base_intensity()
                    + h.wind_use_mwh * EnergySource::Wind.base_intensity()
                    + h.hydro_use_mwh * EnergySource::Hydro.base_intensity()
            })
            .sum();
        let total_unmet_mwh: f64 = hours.iter().map(|h| h.unmet_demand_mwh).sum();

        info!(
            horizon = hours.len(),
            total_cost, total_emissions_kg, total_unmet_mwh, "greedy dispatch complete"
        );

        Ok(DispatchPlan::solved(
            PlanStatus::Greedy,
            hours,
            total_cost,
            total_emissions_kg,
            total_unmet_mwh,
        ))
    }
}

impl DispatchStrategy for GreedyDispatcher {
    fn plan(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
    ) -> Result<DispatchPlan, DispatchError> {
        self.dispatch(series, battery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::domain::HourRecord;

    fn series_from(
        hours: usize,
        f: impl Fn(usize) -> (f64, f64, f64, f64, f64),
    ) -> ForecastSeries {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let records = (0..hours)
            .map(|t| {
                let (demand, solar, wind, hydro, price) = f(t);
                HourRecord {
                    timestamp: start + Duration::hours(t as i64),
                    demand_mwh: demand,
                    solar_available_mwh: solar,
                    wind_available_mwh: wind,
                    hydro_available_mwh: hydro,
                    price_per_mwh: price,
                }
            })
            .collect();
        ForecastSeries::new(records).unwrap()
    }

    #[test]
    fn merit_order_prefers_solar() {
        let series = series_from(24, |_| (100.0, 60.0, 60.0, 60.0, 50.0));
        let battery = BatteryState::new(500.0, 0.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        assert_eq!(plan.status, PlanStatus::Greedy);
        let first = &plan.hours[0];
        // 60 solar + 40 wind meet demand; remaining 20 wind + 60 hydro
        // leftover goes to storage pro rata.
        assert!(first.solar_use_mwh >= 60.0 - 1e-9);
        assert!(first.wind_use_mwh >= 40.0 - 1e-9);
        assert!(first.unmet_demand_mwh.abs() < 1e-9);
    }

    #[test]
    fn discharges_before_declaring_unmet() {
        let series = series_from(24, |_| (100.0, 20.0, 0.0, 0.0, 50.0));
        let battery = BatteryState::new(500.0, 250.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        let first = &plan.hours[0];
        assert_eq!(first.battery_discharge_mwh, 80.0);
        assert!(first.unmet_demand_mwh.abs() < 1e-9);
    }

    #[test]
    fn unmet_only_when_everything_is_exhausted() {
        // 300 demand vs 20 generation and a 100 MWh/h discharge cap.
        let series = series_from(24, |_| (300.0, 20.0, 0.0, 0.0, 50.0));
        let battery = BatteryState::new(500.0, 500.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        for hour in &plan.hours {
            if hour.unmet_demand_mwh > 0.0 {
                let at_source_cap = hour.solar_use_mwh >= 20.0 - 1e-9;
                let at_discharge_cap = hour.battery_discharge_mwh >= 100.0 - 1e-9
                    || hour.battery_level_mwh < 1e-9;
                assert!(at_source_cap && at_discharge_cap);
            }
        }
        assert!(plan.total_unmet_mwh > 0.0);
    }

    #[test]
    fn charging_respects_headroom_and_attribution() {
        // No demand, plenty of generation: charge at the rate cap and keep
        // per-source use within availability.
        let series = series_from(24, |_| (0.0, 80.0, 50.0, 30.0, 50.0));
        let battery = BatteryState::new(500.0, 0.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        let first = &plan.hours[0];
        assert_eq!(first.battery_charge_mwh, 100.0);
        assert!((first.battery_level_mwh - 90.0).abs() < 1e-9);
        assert!(first.solar_use_mwh <= 80.0 + 1e-9);
        assert!(first.wind_use_mwh <= 50.0 + 1e-9);
        assert!(first.hydro_use_mwh <= 30.0 + 1e-9);
        let reported = first.solar_use_mwh + first.wind_use_mwh + first.hydro_use_mwh;
        assert!((reported - first.battery_charge_mwh).abs() < 1e-9);
    }

    #[test]
    fn battery_level_stays_within_bounds() {
        let series = series_from(48, |t| {
            let solar = if t % 24 >= 6 && t % 24 <= 18 { 400.0 } else { 0.0 };
            (150.0, solar, 50.0, 30.0, 45.0)
        });
        let battery = BatteryState::new(300.0, 150.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        for hour in &plan.hours {
            assert!(hour.battery_level_mwh >= -1e-9);
            assert!(hour.battery_level_mwh <= 300.0 + 1e-9);
            assert!(hour.battery_charge_mwh <= battery.max_rate_mwh() + 1e-9);
            assert!(hour.battery_discharge_mwh <= battery.max_rate_mwh() + 1e-9);
        }
    }

    #[test]
    fn emissions_always_use_fixed_base_factors() {
        // Evening-peak-only series: time-varying accounting would scale
        // emissions by 1.25, the baseline must not.
        let series = series_from(24, |_| (100.0, 100.0, 0.0, 0.0, 50.0));
        let battery = BatteryState::new(500.0, 0.0).unwrap();
        let plan = GreedyDispatcher::new().dispatch(&series, &battery).unwrap();

        let expected: f64 = plan
            .hours
            .iter()
            .map(|h| h.solar_use_mwh * 45.0)
            .sum();
        assert!((plan.total_emissions_kg - expected).abs() < 1e-6);
    }
}
