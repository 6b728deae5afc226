//! Dispatch strategies.
//!
//! Two independent implementations of one contract, selected by the
//! caller:
//! - `DispatchOptimizer`: exact LP formulation solved by an external solver
//! - `GreedyDispatcher`: myopic merit-order baseline for comparison
//!
//! The optimizer never falls back to the heuristic on failure; any such
//! substitution is a caller decision.

pub mod greedy;
pub mod optimizer;

pub use greedy::GreedyDispatcher;
pub use optimizer::DispatchOptimizer;

use crate::domain::{BatteryState, DispatchPlan, ForecastSeries};
use crate::error::DispatchError;

/// The shared contract: one validated forecast in, one plan out.
pub trait DispatchStrategy {
    fn plan(
        &self,
        series: &ForecastSeries,
        battery: &BatteryState,
    ) -> Result<DispatchPlan, DispatchError>;
}
