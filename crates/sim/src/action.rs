//! # Action Application
//!
//! Turns a selected [`Action`] into new agent positions.
//!
//! Discrete moves advance one cell on a grid and [`CARTESIAN_STEP`] units
//! otherwise. "Up" decreases y on a grid (screen coordinates) and increases y
//! in a cartesian world. Continuous vectors are scaled by [`MAX_SPEED`].
//! Every candidate position is clamped into the world, snapped to a cell on
//! grids, and rejected outright if it lands inside a wall or obstacle.
//!
//! Agents are moved one at a time in specification order. Agents do not block
//! each other within a step.

use envspec::{EnvSpec, Vec2, World};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::collision::solid_at;
use crate::state::{SimEvent, SimulatorState};

pub const GRID_STEP: f32 = 1.0;
pub const CARTESIAN_STEP: f32 = 0.1;
pub const MAX_SPEED: f32 = 0.1;

/// Action name the policies fall back to when nothing can be chosen.
pub const IDLE_ACTION: &str = "noop";

/// What one agent does in a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentAction {
    Discrete(String),
    Continuous(Vec2),
}

impl AgentAction {
    #[must_use]
    pub fn discrete(name: impl Into<String>) -> Self {
        Self::Discrete(name.into())
    }
}

/// Action for a whole step.
///
/// A `Single` action drives the first agent; `Multi` maps agent ids to their
/// own actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Action {
    Single(AgentAction),
    Multi(BTreeMap<String, AgentAction>),
}

impl From<AgentAction> for Action {
    fn from(action: AgentAction) -> Self {
        Self::Single(action)
    }
}

/// Unit displacement for a named discrete action, or `None` for names that do
/// not move the agent.
#[must_use]
pub fn direction(name: &str, world: &World) -> Option<Vec2> {
    let step = if world.is_grid() { GRID_STEP } else { CARTESIAN_STEP };
    // Grid y grows downward, cartesian y grows upward.
    let up = if world.is_grid() { -step } else { step };
    match name.to_ascii_lowercase().as_str() {
        "up" => Some(Vec2::new(0.0, up)),
        "down" => Some(Vec2::new(0.0, -up)),
        "left" => Some(Vec2::new(-step, 0.0)),
        "right" => Some(Vec2::new(step, 0.0)),
        _ => None,
    }
}

/// Apply `action` to a copy of `state`.
///
/// Events describing each agent's outcome are appended to the copy's log.
/// The step counter is not touched; that belongs to [`crate::rollout::step`].
#[must_use]
pub fn apply(state: &SimulatorState, action: &Action, spec: &EnvSpec) -> SimulatorState {
    let mut next = state.clone();
    apply_in_place(&mut next, action, spec);
    next
}

pub(crate) fn apply_in_place(state: &mut SimulatorState, action: &Action, spec: &EnvSpec) {
    match action {
        Action::Single(agent_action) => {
            if !state.agents.is_empty() {
                move_agent(state, 0, agent_action, spec);
            }
        }
        Action::Multi(per_agent) => {
            for idx in 0..state.agents.len() {
                if let Some(agent_action) = per_agent.get(&state.agents[idx].id) {
                    move_agent(state, idx, agent_action, spec);
                }
            }
            for id in per_agent.keys() {
                if state.agent(id).is_none() {
                    state
                        .info
                        .events
                        .push(SimEvent::UnknownAgent { agent: id.clone() });
                }
            }
        }
    }
}

fn move_agent(state: &mut SimulatorState, idx: usize, action: &AgentAction, spec: &EnvSpec) {
    let agent_id = state.agents[idx].id.clone();
    let from = state.agents[idx].position;

    let delta = match action {
        AgentAction::Discrete(name) => direction(name, &spec.world),
        AgentAction::Continuous(v) => Some(*v * MAX_SPEED),
    };
    let Some(delta) = delta.filter(|d| d.is_finite()) else {
        state.info.events.push(SimEvent::Idle {
            agent: agent_id,
            action: describe(action),
        });
        return;
    };

    let candidate = spec.world.clamp(from + delta);
    if let Some(wall) = solid_at(&state.objects, spec, candidate) {
        let by = wall.id.clone();
        state.info.events.push(SimEvent::Blocked {
            agent: agent_id,
            by,
            at: candidate,
        });
        return;
    }

    if candidate == from {
        state.info.events.push(SimEvent::Idle {
            agent: agent_id,
            action: describe(action),
        });
        return;
    }

    let agent = &mut state.agents[idx];
    agent.recent.push(from);
    agent.position = candidate;
    state.info.events.push(SimEvent::Moved {
        agent: agent_id,
        from,
        to: candidate,
    });
}

fn describe(action: &AgentAction) -> String {
    match action {
        AgentAction::Discrete(name) => name.clone(),
        AgentAction::Continuous(v) => v.to_string(),
    }
}
