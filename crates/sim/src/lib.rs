#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Arena Step Simulator
//!
//! A deterministic state machine that runs rollouts against a declarative
//! [`envspec::EnvSpec`] without any trained model.
//!
//! ## Key Components
//!
//! -   **State:** [`SimulatorState`] holds agent and object positions, the
//!     step counter, the reward accumulator and the per-step event log. Every
//!     step produces a fresh snapshot; recorded history never aliases live
//!     state.
//! -   **Conditions:** [`condition::evaluate`] answers a tagged predicate
//!     against the current state. Malformed references evaluate `false`.
//! -   **Actions:** [`action::apply`] moves agents, clamping to the world and
//!     rejecting moves into walls or obstacles.
//! -   **Rules:** [`reward::evaluate`] sums every satisfied reward rule and
//!     [`termination::check`] decides whether the episode ends.
//! -   **Policies:** [`policy::select_action`] implements the built-in random
//!     and goal-seeking greedy strategies.
//! -   **Rollouts:** [`rollout::run_rollout`] validates, initializes and loops
//!     until termination or the step budget runs out.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sim::{run_rollout, Policy};
//!
//! let spec = envspec::EnvSpec::from_path("maze.json")?;
//! let mut rng = fastrand::Rng::with_seed(7);
//! let result = run_rollout(&spec, Policy::Greedy, 100, &mut rng);
//! println!("success: {} in {} steps", result.success, result.episode_length);
//! ```
//!
//! Randomness only enters through the [`RandomSource`] handed to the loop, so
//! a seeded source makes a rollout fully reproducible.

pub mod action;
pub mod collision;
pub mod condition;
pub mod policy;
pub mod reward;
pub mod rng;
pub mod rollout;
pub mod state;
pub mod termination;

pub use action::{Action, AgentAction};
pub use policy::Policy;
pub use reward::RewardContribution;
pub use rng::{derive_seed, RandomSource};
pub use rollout::{
    run_batch, run_episode, run_rollout, step, BatchResult, BatchSummary, RolloutConfig,
    RolloutResult, StepRecord,
};
pub use state::{AgentState, ObjectState, RecentPositions, SimEvent, SimulatorState, StepInfo};
pub use termination::{TerminationCheck, TerminationReason};
