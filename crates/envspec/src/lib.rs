#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Arena Environment Specifications
//!
//! Declarative description of a small 2D reinforcement-learning environment.
//!
//! An [`EnvSpec`] is plain data: a [`World`] with bounds and a coordinate
//! system, the static [`ObjectDef`]s placed in it, the [`AgentDef`]s that
//! move, an [`ActionSpace`], and the reward and termination [`Rules`] whose
//! [`Condition`]s are evaluated by the simulator every step.
//!
//! Specifications are authored by an external editor and exchanged as JSON:
//!
//! ```rust
//! use envspec::EnvSpec;
//!
//! let spec = EnvSpec::from_json(r#"{
//!     "world": { "coordinateSystem": "grid", "width": 5, "height": 5 },
//!     "objects": [ { "id": "goal", "type": "goal", "position": { "x": 4, "y": 4 } } ],
//!     "agents": [ { "id": "agent", "position": { "x": 0, "y": 0 } } ],
//!     "actionSpace": { "type": "discrete", "actions": ["up", "down", "left", "right"] },
//!     "rules": {
//!         "rewards": [ { "id": "reach", "value": 10,
//!                        "condition": { "type": "agent_at_object", "objectId": "goal" } } ],
//!         "terminations": [ { "id": "done",
//!                             "condition": { "type": "agent_at_object", "objectId": "goal" } } ]
//!     }
//! }"#).unwrap();
//! assert!(envspec::validate(&spec).is_ok());
//! ```
//!
//! Nothing in this crate is checked at construction time. The hard preflight
//! gate lives in [`validate`] and must pass before a rollout starts.

pub mod condition;
pub mod model;
pub mod types;
pub mod validate;

pub use condition::Condition;
pub use model::{
    ActionSpace, AgentDef, CoordinateSystem, EnvSpec, ObjectDef, ObjectKind, RewardRule, Rules,
    Shape, TerminationRule, World,
};
pub use types::Vec2;
pub use validate::{validate, validate_report, Validation, ValidationError};
