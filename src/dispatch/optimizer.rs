//! LP dispatch optimizer.
//!
//! Builds one linear program over the whole horizon and hands it to the
//! LP solver backend. Single-day and multi-day planning are the same formulation
//! parameterized by horizon length; horizons beyond 24h additionally pin
//! the terminal battery level into a band so the finite horizon does not
//! drain or overfill the battery at the endpoint.

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel,
};
use tracing::{debug, info, warn};

use crate::carbon::{CarbonAccounting, EnergySource, CARBON_PRICE_PER_KG};
use crate::dispatch::DispatchStrategy;
use crate::domain::{BatteryState, DispatchPlan, ForecastSeries, HourlyAllocation, PlanStatus};
use crate::error::DispatchError;

/// Objective coefficient on unmet demand. Large enough to dominate any
/// realistic cost or emission term, so the solver drives shortfall to zero
/// whenever a feasible zero-shortfall allocation exists.
pub const UNMET_PENALTY: f64 = 10_000.0;

/// Terminal battery band for multi-day horizons, as fractions of capacity.
const TERMINAL_BAND: (f64, f64) = (0.2, 0.8);

/// Exact dispatch planner minimizing weighted cost and emissions.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptimizer {
    pub cost_weight: f64,
    pub emission_weight: f64,
    pub accounting: CarbonAccounting,
}

impl Default for DispatchOptimizer {
    fn default() -> Self {
        Self {
            cost_weight: 0.7,
            emission_weight: 0.3,
            accounting: CarbonAccounting::TimeVarying,
        }
    }
}

impl DispatchOptimizer {
    pub fn new(cost_weight: f64, emission_weight: f64, accounting: CarbonAccounting) -> Self {
        Self {
            cost_weight,
            emission_weight,
            accounting,
        }
    }

    /// Build and solve the horizon LP.
    ///
    /// Returns `Ok` with a failure-status plan when the solver proves the
    /// model infeasible or unbounded; returns `Err(SolverUnavailable)` when
    /// the solver itself cannot run. Neither case is retried here.
    pub fn optimize(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
    ) -> Result<DispatchPlan, DispatchError> {
        let battery = battery.validated()?;

        let horizon = series.len();
        let capacity = battery.capacity_mwh;
        let max_rate = battery.max_rate_mwh();
        let efficiency = battery.round_trip_efficiency;
        let records = series.records();

        debug!(horizon, capacity, "building dispatch LP");

        let mut problem = ProblemVariables::new();
        let solar = problem.add_vector(variable().min(0.0), horizon);
        let wind = problem.add_vector(variable().min(0.0), horizon);
        let hydro = problem.add_vector(variable().min(0.0), horizon);
        let charge = problem.add_vector(variable().min(0.0), horizon);
        let discharge = problem.add_vector(variable().min(0.0), horizon);
        let unmet = problem.add_vector(variable().min(0.0), horizon);
        let level = problem.add_vector(variable().min(0.0).max(capacity), horizon + 1);

        let cost: Expression = (0..horizon)
            .map(|t| {
                let price = records[t].price_per_mwh;
                price * EnergySource::Solar.cost_factor() * solar[t]
                    + price * EnergySource::Wind.cost_factor() * wind[t]
                    + price * EnergySource::Hydro.cost_factor() * hydro[t]
            })
            .sum();

        let emissions: Expression = (0..horizon)
            .map(|t| {
                self.accounting.intensity(t, EnergySource::Solar) * solar[t]
                    + self.accounting.intensity(t, EnergySource::Wind) * wind[t]
                    + self.accounting.intensity(t, EnergySource::Hydro) * hydro[t]
            })
            .sum();

        let shortfall: Expression = unmet.iter().map(|&v| Expression::from(v)).sum();

        let objective = self.cost_weight * cost
            + self.emission_weight * CARBON_PRICE_PER_KG * emissions
            + UNMET_PENALTY * shortfall;

        let mut model = problem.minimise(objective).using(default_solver);

        model = model.with(constraint!(level[0] == battery.initial_charge_mwh));

        for t in 0..horizon {
            let record = &records[t];

            // Demand balance: generation plus net battery flow plus the
            // unmet slack meets demand exactly.
            model = model.with(constraint!(
                solar[t] + wind[t] + hydro[t] + discharge[t] - charge[t] + unmet[t]
                    == record.demand_mwh
            ));

            model = model.with(constraint!(solar[t] <= record.solar_available_mwh));
            model = model.with(constraint!(wind[t] <= record.wind_available_mwh));
            model = model.with(constraint!(hydro[t] <= record.hydro_available_mwh));

            // Round-trip loss lands on the charge leg only.
            model = model.with(constraint!(
                level[t + 1] == level[t] + charge[t] * efficiency - discharge[t]
            ));

            model = model.with(constraint!(charge[t] <= max_rate));
            model = model.with(constraint!(discharge[t] <= max_rate));
            // Linear relaxation of charge/discharge exclusivity: the shared
            // cap discourages simultaneous flow but does not strictly forbid
            // it at reduced magnitudes. No binary indicator is used.
            model = model.with(constraint!(charge[t] + discharge[t] <= max_rate));
        }

        if horizon > 24 {
            model = model.with(constraint!(level[horizon] >= TERMINAL_BAND.0 * capacity));
            model = model.with(constraint!(level[horizon] <= TERMINAL_BAND.1 * capacity));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                warn!(horizon, "dispatch LP infeasible");
                return Ok(DispatchPlan::failed(
                    PlanStatus::Infeasible,
                    format!("optimization failed: model infeasible over {horizon}h horizon"),
                ));
            }
            Err(ResolutionError::Unbounded) => {
                warn!(horizon, "dispatch LP unbounded");
                return Ok(DispatchPlan::failed(
                    PlanStatus::Unbounded,
                    format!("optimization failed: model unbounded over {horizon}h horizon"),
                ));
            }
            Err(ResolutionError::Other(msg)) => {
                return Err(DispatchError::SolverUnavailable(msg.to_string()));
            }
            Err(ResolutionError::Str(msg)) => {
                return Err(DispatchError::SolverUnavailable(msg));
            }
        };

        let hours: Vec<HourlyAllocation> = (0..horizon)
            .map(|t| HourlyAllocation {
                hour: t,
                timestamp: records[t].timestamp,
                demand_mwh: records[t].demand_mwh,
                solar_use_mwh: solution.value(solar[t]),
                wind_use_mwh: solution.value(wind[t]),
                hydro_use_mwh: solution.value(hydro[t]),
                battery_charge_mwh: solution.value(charge[t]),
                battery_discharge_mwh: solution.value(discharge[t]),
                battery_level_mwh: solution.value(level[t + 1]),
                unmet_demand_mwh: solution.value(unmet[t]),
                price_per_mwh: records[t].price_per_mwh,
            })
            .collect();

        // Realized cost uses the fixed cost factors regardless of the
        // objective weights; emissions use the accounting mode of the call.
        let total_cost: f64 = hours
            .iter()
            .map(|h| {
                h.price_per_mwh
                    * (h.solar_use_mwh * EnergySource::Solar.cost_factor()
                        + h.wind_use_mwh * EnergySource::Wind.cost_factor()
                        + h.hydro_use_mwh * EnergySource::Hydro.cost_factor())
            })
            .sum();
        let total_emissions_kg: f64 = hours
            .iter()
            .map(|h| {
                h.solar_use_mwh * self.accounting.intensity(h.hour, EnergySource::Solar)
                    + h.wind_use_mwh * self.accounting.intensity(h.hour, EnergySource::Wind)
                    + h.hydro_use_mwh * self.accounting.intensity(h.hour, EnergySource::Hydro)
            })
            .sum();
        let total_unmet_mwh: f64 = hours.iter().map(|h| h.unmet_demand_mwh).sum();

        info!(
            horizon,
            total_cost, total_emissions_kg, total_unmet_mwh, "dispatch LP solved"
        );

        Ok(DispatchPlan::solved(
            PlanStatus::Optimal,
            hours,
            total_cost,
            total_emissions_kg,
            total_unmet_mwh,
        ))
    }
}

impl DispatchStrategy for DispatchOptimizer {
    fn plan(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
    ) -> Result<DispatchPlan, DispatchError> {
        self.optimize(series, battery)
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

    fn cost_only() -> DispatchOptimizer {
        DispatchOptimizer::new(1.0, 0.0, CarbonAccounting::FixedBase)
    }

    #[test]
    fn rejects_invalid_battery() {
        let series = series_from(24, |_| (100.0, 150.0, 0.0, 0.0, 50.0));
        let battery = BatteryState {
            capacity_mwh: 500.0,
            initial_charge_mwh: 600.0,
            round_trip_efficiency: 0.9,
        };
        assert!(matches!(
            cost_only().optimize(&series, &battery),
            Err(DispatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn abundant_solar_serves_all_demand() {
        // Empty battery: nothing stored to displace solar with, and
        // charging only adds cost, so every hour is served directly.
        let series = series_from(24, |_| (100.0, 150.0, 0.0, 0.0, 50.0));
        let battery = BatteryState::new(500.0, 0.0).unwrap();
        let plan = cost_only().optimize(&series, &battery).unwrap();

        assert_eq!(plan.status, PlanStatus::Optimal);
        assert_eq!(plan.hours.len(), 24);
        assert!(plan.total_unmet_mwh < 1e-6);
        for hour in &plan.hours {
            assert!((hour.solar_use_mwh - 100.0).abs() < 1e-4);
        }
        // 24h * 100 MWh * 50 $/MWh * 0.5
        assert!((plan.total_cost - 60_000.0).abs() < 1e-3);
    }

    #[test]
    fn stored_energy_is_dispatched_before_paid_generation() {
        // Battery discharge carries no marginal cost in the objective, so
        // a cost-only run drains the initial charge to displace solar.
        let series = series_from(24, |_| (100.0, 150.0, 0.0, 0.0, 50.0));
        let battery = BatteryState::new(500.0, 250.0).unwrap();
        let plan = cost_only().optimize(&series, &battery).unwrap();

        assert_eq!(plan.status, PlanStatus::Optimal);
        let discharged: f64 = plan.hours.iter().map(|h| h.battery_discharge_mwh).sum();
        assert!((discharged - 250.0).abs() < 1e-4);
        // (2400 - 250) MWh of solar at 50 * 0.5 per MWh.
        assert!((plan.total_cost - 53_750.0).abs() < 1e-3);
    }

    #[test]
    fn systemic_shortage_stays_optimal_with_unmet() {
        let series = series_from(24, |_| (1_000.0, 10.0, 10.0, 10.0, 50.0));
        let battery = BatteryState::new(100.0, 50.0).unwrap();
        let plan = cost_only().optimize(&series, &battery).unwrap();

        assert_eq!(plan.status, PlanStatus::Optimal);
        assert!(plan.total_unmet_mwh > 0.0);
    }

    #[test]
    fn terminal_band_applies_beyond_one_day() {
        let series = series_from(48, |t| {
            let solar = if t % 24 >= 6 && t % 24 <= 18 { 300.0 } else { 0.0 };
            (150.0, solar, 100.0, 80.0, 45.0)
        });
        let battery = BatteryState::new(500.0, 250.0).unwrap();
        let plan = cost_only().optimize(&series, &battery).unwrap();

        assert_eq!(plan.status, PlanStatus::Optimal);
        let terminal = plan.hours.last().unwrap().battery_level_mwh;
        assert!(terminal >= 0.2 * 500.0 - 1e-6);
        assert!(terminal <= 0.8 * 500.0 + 1e-6);
    }

    #[test]
    fn identical_inputs_give_identical_totals() {
        let series = series_from(24, |t| (120.0, 80.0, 60.0, 50.0, 40.0 + t as f64));
        let battery = BatteryState::new(400.0, 200.0).unwrap();
        let optimizer = DispatchOptimizer::default();

        let first = optimizer.optimize(&series, &battery).unwrap();
        let second = optimizer.optimize(&series, &battery).unwrap();

        assert!((first.total_cost - second.total_cost).abs() < 1e-6);
        assert!((first.total_emissions_kg - second.total_emissions_kg).abs() < 1e-6);
        assert!((first.total_unmet_mwh - second.total_unmet_mwh).abs() < 1e-6);
    }
}
