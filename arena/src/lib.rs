//! # Arena
//!
//! Declarative 2D reinforcement-learning environments and a universal step
//! simulator.
//!
//! ## Crates
//!
//! -   **[`envspec`]:** The environment specification data model, its JSON
//!     form and the preflight validator.
//! -   **[`sim`]:** The step simulator: condition evaluation, action
//!     application, rewards, termination, the built-in random and greedy
//!     policies, and the rollout loop.
//! -   **`arena`:** This crate. A command-line runner that loads a
//!     specification from disk, runs seeded batches of rollouts and writes the
//!     results as JSON, optionally rerunning whenever the file changes.
//!
//! ## Getting Started
//!
//! ```text
//! arena maze.json --policy greedy --max-steps 100 --episodes 10 --summary
//! ```

pub mod app;
pub mod watcher;

pub use envspec;
pub use sim;
