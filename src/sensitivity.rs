//! Price sensitivity sweep.
//!
//! Re-runs both dispatch strategies across price-scaled copies of a base
//! forecast and reports per-scenario aggregates plus a cost elasticity
//! helper. Scenarios are evaluated strictly sequentially; each one builds
//! an independent model, so one infeasible scenario never touches another.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dispatch::{DispatchOptimizer, GreedyDispatcher};
use crate::domain::{BatteryState, ForecastSeries};
use crate::error::DispatchError;

/// Default price multipliers: half price up to one-and-a-half times.
pub const DEFAULT_MULTIPLIERS: [f64; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

/// A derived price scenario. Never mutates the base series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub multiplier: f64,
    pub label: String,
}

impl Scenario {
    fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            label: format!("{}% Price", (multiplier * 100.0).round() as i64),
        }
    }
}

/// Aggregate totals one strategy produced under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub multiplier: f64,
    pub total_cost: f64,
    pub total_emissions_kg: f64,
    pub total_unmet_mwh: f64,
}

/// Which strategy's result list to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Optimized,
    Greedy,
}

/// Per-scenario aggregates for both strategies, in multiplier order.
///
/// An optimizer entry is missing for scenarios whose solve failed; greedy
/// entries are always present (the heuristic is never infeasible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub scenarios: Vec<Scenario>,
    pub optimized: Vec<ScenarioOutcome>,
    pub greedy: Vec<ScenarioOutcome>,
}

impl SensitivityReport {
    fn outcomes(&self, strategy: Strategy) -> &[ScenarioOutcome] {
        match strategy {
            Strategy::Optimized => &self.optimized,
            Strategy::Greedy => &self.greedy,
        }
    }

    /// Mean arc elasticity of total cost against the price multiplier,
    /// over consecutive scenario pairs. Returns 0.0 with fewer than two
    /// recorded outcomes. Distinct multipliers rule out a zero price
    /// change within a pair.
    pub fn elasticity(&self, strategy: Strategy) -> f64 {
        let outcomes = self.outcomes(strategy);
        if outcomes.len() < 2 {
            return 0.0;
        }
        let elasticities: Vec<f64> = outcomes
            .iter()
            .tuple_windows()
            .map(|(prev, curr)| {
                let price_change = (curr.multiplier - prev.multiplier) / prev.multiplier;
                let cost_change = (curr.total_cost - prev.total_cost) / prev.total_cost;
                cost_change / price_change
            })
            .collect();
        elasticities.iter().sum::<f64>() / elasticities.len() as f64
    }
}

/// Drives repeated optimizer and greedy runs across price scenarios.
#[derive(Debug, Clone)]
pub struct SensitivityRunner {
    multipliers: Vec<f64>,
}

impl Default for SensitivityRunner {
    fn default() -> Self {
        Self {
            multipliers: DEFAULT_MULTIPLIERS.to_vec(),
        }
    }
}

impl SensitivityRunner {
    /// Multipliers must be positive and distinct; they are evaluated and
    /// reported in ascending order regardless of input order.
    pub fn new(multipliers: Vec<f64>) -> Result<Self, DispatchError> {
        if multipliers.is_empty() {
            return Err(DispatchError::InvalidInput(
                "sensitivity sweep needs at least one price multiplier".into(),
            ));
        }
        if multipliers.iter().any(|&m| m <= 0.0) {
            return Err(DispatchError::InvalidInput(
                "price multipliers must be positive".into(),
            ));
        }
        let mut ordered: Vec<f64> = multipliers;
        ordered.sort_by_key(|&m| OrderedFloat(m));
        if ordered.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(DispatchError::InvalidInput(
                "price multipliers must be distinct".into(),
            ));
        }
        Ok(Self {
            multipliers: ordered,
        })
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    /// Run both strategies over every price scenario.
    ///
    /// A scenario whose LP solve comes back non-optimal is logged and its
    /// optimizer entry dropped; the sweep continues. A solver that cannot
    /// run at all aborts the whole sweep.
    pub fn run(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
        optimizer: &DispatchOptimizer,
        greedy: &GreedyDispatcher,
    ) -> Result<SensitivityReport, DispatchError> {
        let mut report = SensitivityReport {
            scenarios: Vec::with_capacity(self.multipliers.len()),
            optimized: Vec::with_capacity(self.multipliers.len()),
            greedy: Vec::with_capacity(self.multipliers.len()),
        };

        for &multiplier in &self.multipliers {
            let scenario = Scenario::new(multiplier);
            info!(multiplier, label = %scenario.label, "evaluating price scenario");
            let scaled = series.scaled_prices(multiplier);

            let optimized = optimizer.optimize(&scaled, battery)?;
            if optimized.is_success() {
                report.optimized.push(ScenarioOutcome {
                    multiplier,
                    total_cost: optimized.total_cost,
                    total_emissions_kg: optimized.total_emissions_kg,
                    total_unmet_mwh: optimized.total_unmet_mwh,
                });
            } else {
                warn!(
                    multiplier,
                    status = %optimized.status,
                    "optimizer failed for scenario, omitting from optimized results"
                );
            }

            let greedy_plan = greedy.dispatch(&scaled, battery)?;
            report.greedy.push(ScenarioOutcome {
                multiplier,
                total_cost: greedy_plan.total_cost,
                total_emissions_kg: greedy_plan.total_emissions_kg,
                total_unmet_mwh: greedy_plan.total_unmet_mwh,
            });

            report.scenarios.push(scenario);
        }

        Ok(report)
    }
}
