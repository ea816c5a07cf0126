//! # Preflight Validation
//!
//! Hard gate run before any rollout. Checks happen in a fixed order and the
//! first failure wins, so a specification always reports the same error.
//! Missing rules are rejected outright rather than defaulted.

use serde::Serialize;
use thiserror::Error;

use crate::model::{ActionSpace, EnvSpec};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("world must have positive width/height (got {width} x {height})")]
    NonPositiveWorld { width: f32, height: f32 },
    #[error("specification must declare at least one agent")]
    NoAgents,
    #[error("agent '{0}' has a non-numeric position")]
    NonFiniteAgentPosition(String),
    #[error("agent '{id}' at ({x}, {y}) is outside the {width} x {height} grid")]
    AgentOutOfBounds {
        id: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[error("action space is missing")]
    MissingActionSpace,
    #[error("discrete action space requires a non-empty action list")]
    EmptyDiscreteActions,
    #[error("continuous action space is invalid: {0}")]
    InvalidContinuousSpace(&'static str),
    #[error("no reward rules declared: at least one reward rule is required")]
    NoRewardRules,
    #[error("no termination rules declared: at least one termination rule is required")]
    NoTerminationRules,
    #[error("object '{id}' at ({x}, {y}) is more than twice the world size out of bounds")]
    ObjectFarOutOfBounds { id: String, x: f32, y: f32 },
}

/// Outcome of [`validate_report`], in the shape consumers serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Check every hard precondition of a rollout.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(spec: &EnvSpec) -> Result<(), ValidationError> {
    check_world(spec)?;
    check_agents(spec)?;
    check_action_space(spec)?;
    check_rules(spec)?;
    check_objects(spec)
}

/// [`validate`] folded into a `{valid, error}` report.
#[must_use]
pub fn validate_report(spec: &EnvSpec) -> Validation {
    match validate(spec) {
        Ok(()) => Validation {
            valid: true,
            error: None,
        },
        Err(e) => Validation {
            valid: false,
            error: Some(e.to_string()),
        },
    }
}

fn check_world(spec: &EnvSpec) -> Result<(), ValidationError> {
    let world = &spec.world;
    // NaN is not positive and is rejected here too.
    let positive = |v: f32| v > 0.0;
    if !(positive(world.width) && positive(world.height)) {
        return Err(ValidationError::NonPositiveWorld {
            width: world.width,
            height: world.height,
        });
    }
    Ok(())
}

fn check_agents(spec: &EnvSpec) -> Result<(), ValidationError> {
    if spec.agents.is_empty() {
        return Err(ValidationError::NoAgents);
    }
    for agent in &spec.agents {
        if !agent.position.is_finite() {
            return Err(ValidationError::NonFiniteAgentPosition(agent.id.clone()));
        }
        if spec.is_grid() && !spec.world.contains(agent.position) {
            return Err(ValidationError::AgentOutOfBounds {
                id: agent.id.clone(),
                x: agent.position.x,
                y: agent.position.y,
                width: spec.world.width,
                height: spec.world.height,
            });
        }
    }
    Ok(())
}

fn check_action_space(spec: &EnvSpec) -> Result<(), ValidationError> {
    match &spec.action_space {
        None => Err(ValidationError::MissingActionSpace),
        Some(ActionSpace::Discrete { actions }) if actions.is_empty() => {
            Err(ValidationError::EmptyDiscreteActions)
        }
        Some(ActionSpace::Continuous { dimensions, .. }) if *dimensions == 0 => Err(
            ValidationError::InvalidContinuousSpace("dimensions must be at least 1"),
        ),
        Some(ActionSpace::Continuous { range, .. }) if !ascending(*range) => Err(
            ValidationError::InvalidContinuousSpace("range low must be below range high"),
        ),
        Some(_) => Ok(()),
    }
}

fn ascending([low, high]: [f32; 2]) -> bool {
    low < high
}

fn check_rules(spec: &EnvSpec) -> Result<(), ValidationError> {
    if spec.rules.rewards.is_empty() {
        return Err(ValidationError::NoRewardRules);
    }
    if spec.rules.terminations.is_empty() {
        return Err(ValidationError::NoTerminationRules);
    }
    Ok(())
}

fn check_objects(spec: &EnvSpec) -> Result<(), ValidationError> {
    let limit_x = spec.world.width * 2.0;
    let limit_y = spec.world.height * 2.0;
    let far = |v: f32, limit: f32| !v.is_finite() || v < -limit || v > limit;

    match spec
        .objects
        .iter()
        .find(|o| far(o.position.x, limit_x) || far(o.position.y, limit_y))
    {
        Some(o) => Err(ValidationError::ObjectFarOutOfBounds {
            id: o.id.clone(),
            x: o.position.x,
            y: o.position.y,
        }),
        None => Ok(()),
    }
}
