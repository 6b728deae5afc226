use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// The LP solver proved the plan optimal.
    Optimal,
    /// The solver reported the model infeasible.
    Infeasible,
    /// The solver reported the model unbounded.
    Unbounded,
    /// Produced by the myopic baseline heuristic, not a solver.
    Greedy,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Unbounded => write!(f, "Unbounded"),
            Self::Greedy => write!(f, "Greedy"),
        }
    }
}

/// Dispatch decision for a single hour of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAllocation {
    pub hour: usize,
    pub timestamp: DateTime<Utc>,
    pub demand_mwh: f64,
    pub solar_use_mwh: f64,
    pub wind_use_mwh: f64,
    pub hydro_use_mwh: f64,
    pub battery_charge_mwh: f64,
    pub battery_discharge_mwh: f64,
    /// Battery level after this hour's charge and discharge settle.
    pub battery_level_mwh: f64,
    pub unmet_demand_mwh: f64,
    pub price_per_mwh: f64,
}

/// The sole output artifact of a dispatch call. Immutable once produced.
///
/// A failed run carries only `status` and `message`: `hours` is empty and
/// the aggregate totals are zero. Partial or interpolated hourly data is
/// never emitted for a failed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub hours: Vec<HourlyAllocation>,
    /// Realized cost in currency units, always computed from the fixed
    /// per-source cost factors, independent of objective weighting.
    pub total_cost: f64,
    pub total_emissions_kg: f64,
    pub total_unmet_mwh: f64,
}

impl DispatchPlan {
    pub fn solved(
        status: PlanStatus,
        hours: Vec<HourlyAllocation>,
        total_cost: f64,
        total_emissions_kg: f64,
        total_unmet_mwh: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status,
            message: None,
            hours,
            total_cost,
            total_emissions_kg,
            total_unmet_mwh,
        }
    }

    pub fn failed(status: PlanStatus, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status,
            message: Some(message.into()),
            hours: Vec::new(),
            total_cost: 0.0,
            total_emissions_kg: 0.0,
            total_unmet_mwh: 0.0,
        }
    }

    /// True when the run produced usable hourly allocations.
    pub fn is_success(&self) -> bool {
        matches!(self.status, PlanStatus::Optimal | PlanStatus::Greedy) && self.message.is_none()
    }
}
