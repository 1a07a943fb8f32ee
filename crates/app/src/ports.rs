//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod action_sink;
pub mod actuator;
pub mod clock;

pub use action_sink::ActionSink;
pub use actuator::LineActuator;
pub use clock::Clock;
