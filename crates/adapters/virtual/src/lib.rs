//! # linewatch-adapter-virtual
//!
//! Virtual/demo adapter that stands in for real production lines and their
//! sensors.
//!
//! ## Provided pieces
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualLine`] | `LineActuator` | Per-device run state and mode; the production counter advances on every [`tick`](VirtualLine::tick) while running |
//! | [`SensorProfile`] | — | Deterministic temperature / humidity / pressure series with an optional temperature excursion |
//! | [`Simulation`] | — | Steps the lines and feeds counts and readings into the `SchedulerService` |
//!
//! ## Dependency rule
//!
//! Depends on `linewatch-app` (port traits, scheduler service) and `linewatch-domain` only.

mod line;
mod sensor;
mod simulation;

pub use line::{DEFAULT_MODE, VirtualLine};
pub use sensor::{Excursion, SensorProfile, SensorReading};
pub use simulation::Simulation;
