//! Hour-by-hour dispatch planning for renewable generation and battery
//! storage.
//!
//! The core contract is `ForecastSeries -> DispatchPlan`, served by two
//! independent strategies: an exact LP ([`dispatch::DispatchOptimizer`])
//! and a myopic baseline ([`dispatch::GreedyDispatcher`]). A
//! [`sensitivity::SensitivityRunner`] sweeps both across price-scaled
//! scenarios. Forecast production, persistence and presentation are
//! external collaborators.

pub mod carbon;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod sensitivity;
pub mod simulation;
pub mod telemetry;

pub use carbon::{CarbonAccounting, EnergySource};
pub use dispatch::{DispatchOptimizer, DispatchStrategy, GreedyDispatcher};
pub use domain::{BatteryState, DispatchPlan, ForecastSeries, HourRecord, PlanStatus};
pub use error::DispatchError;
pub use sensitivity::{SensitivityReport, SensitivityRunner, Strategy};
