pub mod battery;
pub mod forecast;
pub mod plan;

pub use battery::{BatteryState, DEFAULT_ROUND_TRIP_EFFICIENCY, MAX_RATE_FRACTION};
pub use forecast::{ForecastSeries, HourRecord};
pub use plan::{DispatchPlan, HourlyAllocation, PlanStatus};
