//! # linewatchd — linewatch daemon
//!
//! Composition root that wires the scheduler to a set of virtual lines and
//! runs the simulation loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the virtual lines (adapter) and the action dispatcher worker
//! - Construct application services, injecting adapters via port traits
//! - Apply startup production plans and start every line
//! - Step the simulation on a fixed interval until SIGINT
//! - Drain the dispatcher on shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use linewatch_adapter_virtual::{SensorProfile, Simulation, VirtualLine};
use linewatch_app::actuator_sink::ActuatorSink;
use linewatch_app::clock::SystemClock;
use linewatch_app::dispatcher::ActionDispatcher;
use linewatch_app::services::control_service::ControlService;
use linewatch_app::services::scheduler_service::SchedulerService;
use linewatch_domain::command::LineCommand;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Adapters
    let devices = config.device_ids();
    let line = Arc::new(VirtualLine::new(devices.iter().cloned()));

    // Dispatch
    let (dispatcher, worker) = ActionDispatcher::spawn(ActuatorSink::new(Arc::clone(&line)));

    // Services
    let scheduler = Arc::new(SchedulerService::new(
        SystemClock,
        dispatcher,
        config.thresholds,
    ));
    let control = ControlService::new(Arc::clone(&line), Arc::clone(&scheduler));

    for device_id in &devices {
        scheduler.initialize(device_id);
        if let Some(plan) = &config.simulation.plan {
            scheduler.set_production_plan(
                device_id,
                plan.target_count,
                plan.auto_stop,
                plan.auto_switch_mode.clone(),
            );
        }
        control.issue(device_id, LineCommand::Start).await?;
    }

    let profile = match config.excursion() {
        Some(excursion) => SensorProfile::default().with_excursion(excursion),
        None => SensorProfile::default(),
    };
    let mut simulation = Simulation::new(Arc::clone(&scheduler), Arc::clone(&line), profile);

    tracing::info!(
        devices = devices.len(),
        tick_ms = config.simulation.tick_ms,
        "linewatchd running"
    );

    let mut interval = tokio::time::interval(config.tick_interval());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                simulation.step().await;
            }
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!(%err, "failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    tracing::info!(ticks = simulation.ticks(), "shutting down");
    for device_id in &devices {
        let state = scheduler.get_state(device_id);
        tracing::info!(
            %device_id,
            paused_by_scheduler = state.paused_by_scheduler,
            "final scheduler state"
        );
    }

    // The worker stops once every dispatcher handle is gone.
    drop(simulation);
    drop(control);
    drop(scheduler);
    worker.await?;

    Ok(())
}
