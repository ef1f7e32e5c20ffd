//! Ordering of the brew systems inside `FixedUpdate`.
//!
//! ```text
//! Input  →  Physics  →  Report
//! ```
//!
//! * **Input** – Tick counter and queued host actions. Everything a host asked
//!   for before the tick is applied before the bed moves.
//! * **Physics** – One step of the bed while the session is pouring.
//! * **Report** – Aggregates and logging. These only *read* the session.

use bevy::prelude::*;

/// Configured as a chain by [`crate::BrewSimulationPlugin`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BrewSet {
    Input,
    Physics,
    Report,
}
