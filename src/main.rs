use anyhow::Result;
use renewable_dispatch::{config::Config, simulation, telemetry, GreedyDispatcher, Strategy};
use tracing::{info, warn};

fn main() -> Result<()> {
    telemetry::init_tracing();

    let cfg = Config::load()?;
    let battery = cfg.battery_state()?;
    let optimizer = cfg.dispatch_optimizer();
    let greedy = GreedyDispatcher::new();

    let series = simulation::synthetic_series(
        cfg.forecast.region,
        cfg.forecast.days,
        cfg.forecast.seed,
    )?;
    series.ensure_daily_horizon()?;

    info!(
        region = %cfg.forecast.region,
        days = cfg.forecast.days,
        horizon = series.len(),
        "planning dispatch"
    );

    let plan = optimizer.optimize(&series, &battery)?;
    if plan.is_success() {
        info!(
            status = %plan.status,
            total_cost = plan.total_cost,
            total_emissions_kg = plan.total_emissions_kg,
            total_unmet_mwh = plan.total_unmet_mwh,
            "optimized plan"
        );
    } else {
        warn!(
            status = %plan.status,
            message = plan.message.as_deref().unwrap_or(""),
            "optimization failed"
        );
    }

    let baseline = greedy.dispatch(&series, &battery)?;
    info!(
        status = %baseline.status,
        total_cost = baseline.total_cost,
        total_emissions_kg = baseline.total_emissions_kg,
        total_unmet_mwh = baseline.total_unmet_mwh,
        "greedy baseline"
    );

    let runner = cfg.sensitivity_runner()?;
    let report = runner.run(&series, &battery, &optimizer, &greedy)?;
    info!(
        optimized = report.elasticity(Strategy::Optimized),
        greedy = report.elasticity(Strategy::Greedy),
        "price elasticity of total cost"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
