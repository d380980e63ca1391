//! Planning and Execution
//!
//! Consumers describe what they need with [`InterestSet`]s. The
//! [`Planner`] discovers every update required to keep those outputs fresh,
//! orders them into a [`Plan`] and runs the plan on demand.
//!
//! # Lifecycle
//!
//! 1. `add()` one interest set per concern.
//! 2. `update()` whenever the composition of the model may have changed.
//!    Discovery and ordering are redone from scratch.
//! 3. `execute()` once per refresh cycle. Each call in the plan runs exactly
//!    once, in the same order every time until the next `update()`.

mod call;
mod config;
mod interest;
mod planner;

pub use call::{Call, CallKey, Plan, PlanEntry, PlanStats};
pub use config::PlannerConfig;
pub use interest::InterestSet;
pub use planner::Planner;
