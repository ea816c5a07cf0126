//! # Built-in Policies
//!
//! Action selection without a trained model.
//!
//! -   [`Policy::Random`] draws uniformly from the declared discrete actions,
//!     or a uniform `[-1, 1]` vector in continuous spaces.
//! -   [`Policy::Greedy`] walks toward the nearest goal. In discrete spaces it
//!     probes each candidate cell for bounds, walls, obstacles and other
//!     agents, and detours around blockers while refusing to step back into
//!     the agent's recently vacated cells. In continuous spaces it steers
//!     straight at the goal with no obstacle avoidance.
//!
//! With more than one agent the policy returns an [`Action::Multi`] holding
//! one choice per agent; the others' current positions count as obstacles.

use envspec::{ActionSpace, EnvSpec, Vec2};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::action::{direction, Action, AgentAction, IDLE_ACTION};
use crate::collision::solid_at;
use crate::rng::RandomSource;
use crate::state::{AgentState, SimulatorState};

/// Distance under which another agent occupies a probed cell.
const AGENT_CLEARANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Random,
    #[default]
    Greedy,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Greedy => write!(f, "greedy"),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "greedy" => Ok(Self::Greedy),
            other => Err(format!("unknown policy '{other}' (expected random or greedy)")),
        }
    }
}

/// Choose the next action for every agent in `state`.
pub fn select_action<R: RandomSource + ?Sized>(
    state: &SimulatorState,
    spec: &EnvSpec,
    policy: Policy,
    rng: &mut R,
) -> Action {
    if state.agents.len() > 1 {
        Action::Multi(
            (0..state.agents.len())
                .map(|idx| {
                    (
                        state.agents[idx].id.clone(),
                        select_for_agent(state, spec, policy, idx, &mut *rng),
                    )
                })
                .collect(),
        )
    } else {
        Action::Single(select_for_agent(state, spec, policy, 0, rng))
    }
}

fn select_for_agent<R: RandomSource + ?Sized>(
    state: &SimulatorState,
    spec: &EnvSpec,
    policy: Policy,
    idx: usize,
    rng: &mut R,
) -> AgentAction {
    let Some(space) = &spec.action_space else {
        return AgentAction::discrete(IDLE_ACTION);
    };
    match (policy, space) {
        (Policy::Random, _) => random_action(space, rng),
        (Policy::Greedy, ActionSpace::Discrete { actions }) => {
            greedy_discrete(state, spec, actions, idx, rng)
        }
        (Policy::Greedy, ActionSpace::Continuous { .. }) => {
            greedy_continuous(state, space, idx, rng)
        }
    }
}

/// Uniform draw from the action space.
pub fn random_action<R: RandomSource + ?Sized>(space: &ActionSpace, rng: &mut R) -> AgentAction {
    match space {
        ActionSpace::Discrete { actions } if actions.is_empty() => {
            AgentAction::discrete(IDLE_ACTION)
        }
        ActionSpace::Discrete { actions } => {
            AgentAction::Discrete(actions[rng.next_index(actions.len())].clone())
        }
        ActionSpace::Continuous { .. } => AgentAction::Continuous(Vec2::new(
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
        )),
    }
}

fn nearest_goal(state: &SimulatorState, from: Vec2) -> Option<Vec2> {
    state
        .goals()
        .map(|g| g.position)
        .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
}

fn greedy_continuous<R: RandomSource + ?Sized>(
    state: &SimulatorState,
    space: &ActionSpace,
    idx: usize,
    rng: &mut R,
) -> AgentAction {
    let Some(agent) = state.agents.get(idx) else {
        return random_action(space, rng);
    };
    match nearest_goal(state, agent.position) {
        Some(goal) => AgentAction::Continuous((goal - agent.position).normalize_or_zero()),
        None => random_action(space, rng),
    }
}

/// Collision probe for one agent's candidate cells.
struct Probe<'a> {
    state: &'a SimulatorState,
    spec: &'a EnvSpec,
    agent: &'a AgentState,
}

impl Probe<'_> {
    /// Unclamped cell the named action would lead to, if it moves at all.
    fn target(&self, name: &str) -> Option<Vec2> {
        direction(name, &self.spec.world).map(|d| self.agent.position + d)
    }

    fn is_blocked(&self, target: Vec2) -> bool {
        !self.spec.world.contains(target)
            || solid_at(&self.state.objects, self.spec, target).is_some()
            || self
                .state
                .agents
                .iter()
                .filter(|other| other.id != self.agent.id)
                .any(|other| other.position.distance(target) < AGENT_CLEARANCE)
    }

    /// Whether the action moves the agent somewhere it may stand.
    fn is_open(&self, name: &str) -> bool {
        self.target(name).is_some_and(|t| !self.is_blocked(t))
    }
}

fn greedy_discrete<R: RandomSource + ?Sized>(
    state: &SimulatorState,
    spec: &EnvSpec,
    actions: &[String],
    idx: usize,
    rng: &mut R,
) -> AgentAction {
    let space = ActionSpace::Discrete {
        actions: actions.to_vec(),
    };
    let Some(agent) = state.agents.get(idx) else {
        return random_action(&space, rng);
    };
    let Some(goal) = nearest_goal(state, agent.position) else {
        return random_action(&space, rng);
    };

    let delta = goal - agent.position;
    let horizontal = if delta.x >= 0.0 { "right" } else { "left" };
    // Grid y grows downward, so a goal below is reached with "down".
    let goal_below = delta.y >= 0.0;
    let vertical = match (spec.is_grid(), goal_below) {
        (true, true) | (false, false) => "down",
        (true, false) | (false, true) => "up",
    };
    let (preferred, perpendicular) = if delta.x.abs() >= delta.y.abs() {
        (horizontal, [vertical, opposite(vertical)])
    } else {
        (vertical, [horizontal, opposite(horizontal)])
    };

    let declared = |name: &str| actions.iter().find(|a| a.eq_ignore_ascii_case(name));
    let probe = Probe { state, spec, agent };

    if let Some(action) = declared(preferred).filter(|a| probe.is_open(a)) {
        return AgentAction::Discrete(action.clone());
    }

    let detour = perpendicular
        .iter()
        .filter_map(|name| declared(name))
        .find(|a| {
            probe.is_open(a)
                && probe
                    .target(a)
                    .is_some_and(|t| !agent.recent.contains(t))
        });
    if let Some(action) = detour {
        return AgentAction::Discrete(action.clone());
    }

    if let Some(action) = actions.iter().find(|a| probe.is_open(a)) {
        return AgentAction::Discrete(action.clone());
    }

    tracing::debug!(agent = %agent.id, "greedy policy fully blocked, keeping preferred move");
    AgentAction::Discrete(
        declared(preferred)
            .or_else(|| actions.first())
            .cloned()
            .unwrap_or_else(|| IDLE_ACTION.to_string()),
    )
}

fn opposite(name: &str) -> &'static str {
    match name {
        "up" => "down",
        "down" => "up",
        "left" => "right",
        _ => "left",
    }
}
