//! Simulation orchestrator.
//!
//! This module wires a validated configuration into a `ResourceManager`,
//! drives it for the configured number of steps, and feeds each step's
//! report and snapshot to a reporting sink.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::Serialize;

use crate::config::Config;
use crate::manager::ResourceManager;
use crate::policy::{ActionPolicy, RandomPolicy};
use crate::process::ProcessId;
use crate::report::{ReportSink, Snapshot};

/// Totals gathered over a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub steps: u64,
    pub deadlocks_detected: u64,
    /// Victims in the order they were chosen
    pub victims: Vec<ProcessId>,
    pub final_state: Snapshot,
}

/// Build the action policy described by the configuration
pub fn build_policy(config: &Config) -> Box<dyn ActionPolicy> {
    let policy = match config.general.seed {
        Some(seed) => {
            info!("Using seeded action policy (seed {})", seed);
            RandomPolicy::seeded(seed)
        }
        None => RandomPolicy::from_entropy(),
    };
    Box::new(policy.with_request_probability(config.policy.request_probability))
}

/// Build a resource manager from the configuration and an action policy
pub fn build_manager(config: &Config, policy: Box<dyn ActionPolicy>) -> Result<ResourceManager> {
    config.validate()?;

    let manager = ResourceManager::new(
        config.system.available.clone(),
        config.system.processes,
        policy,
    )
    .wrap_err("Failed to initialize resource manager")?
    .with_detector(config.deadlock.detector.build())
    .with_elimination(config.deadlock.elimination);

    info!(
        "Deadlock handling: {} detector, {:?} elimination",
        manager.detector_name(),
        config.deadlock.elimination
    );
    Ok(manager)
}

/// Run a configured simulation to completion with a random action policy
pub fn run_simulation(config: &Config, sink: &mut dyn ReportSink) -> Result<SimulationSummary> {
    let manager = build_manager(config, build_policy(config))?;
    drive(manager, config, sink)
}

/// Step `manager` for `config.general.steps` steps, reporting every step
pub fn drive(
    mut manager: ResourceManager,
    config: &Config,
    sink: &mut dyn ReportSink,
) -> Result<SimulationSummary> {
    let mut deadlocks_detected = 0;
    let mut victims = Vec::new();

    for _ in 0..config.general.steps {
        let report = manager
            .step()
            .wrap_err_with(|| format!("Simulation aborted at step {}", manager.steps_run()))?;

        if report.deadlock_detected {
            deadlocks_detected += 1;
        }
        if let Some(resolution) = &report.resolution {
            victims.push(resolution.victim);
        }

        sink.on_step(&report, &manager.snapshot())?;

        if !config.general.step_delay.is_zero() {
            std::thread::sleep(config.general.step_delay);
        }
    }

    info!(
        "Simulation finished: {} steps, {} deadlocks detected, {} victims",
        manager.steps_run(),
        deadlocks_detected,
        victims.len()
    );

    Ok(SimulationSummary {
        steps: manager.steps_run(),
        deadlocks_detected,
        victims,
        final_state: manager.snapshot(),
    })
}
