//! # linewatch-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Clock` — wall-clock source for cooldowns, plan start and ETAs
//!   - `ActionSink` — receives every action the scheduler decides on
//!   - `LineActuator` — changes a production line's run state or mode
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SchedulerService` — per-device scheduler registry, reading checks,
//!     configuration and query API
//!   - `ControlService` — operator commands, which always clear the
//!     scheduler pause first
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (action dispatcher, clocks, actuator bridge)
//!
//! ## Dependency rule
//! Depends on `linewatch-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actuator_sink;
pub mod clock;
pub mod dispatcher;
pub mod ports;
pub mod services;
