//! # linewatch-domain
//!
//! Pure domain model for the linewatch production-line scheduler.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Metrics** and their **Thresholds** (temperature, humidity, pressure)
//! - Define **Rules** (condition → action bindings with cooldowns) and the
//!   per-device rule store
//! - Define **History buffers** used to judge short-term stability
//! - Define the **Pause state machine** that gates autonomous resume
//! - Define **Production plans** and their progress/ETA computation
//! - Define **Triggered actions** and the **Line commands** they map to
//! - Contain all invariant enforcement and decision logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod command;
pub mod history;
pub mod metric;
pub mod pause;
pub mod plan;
pub mod rule;
pub mod scheduler;
pub mod threshold;
