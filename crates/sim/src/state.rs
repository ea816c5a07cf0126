//! # Simulator State
//!
//! Snapshot of one episode at one step. The rollout loop owns the live state
//! and records clones, so a recorded snapshot never changes afterwards.

use envspec::{EnvSpec, ObjectKind, Vec2};
use serde::Serialize;
use std::fmt;

use crate::reward::RewardContribution;
use crate::termination::TerminationReason;

/// Number of previous positions remembered per agent.
pub const RECENT_POSITIONS: usize = 2;

/// Fixed-size ring of the positions an agent most recently moved away from.
///
/// The greedy policy refuses detours back into these cells, which stops it
/// from bouncing between two positions in front of an obstacle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RecentPositions {
    slots: [Option<Vec2>; RECENT_POSITIONS],
    next: usize,
}

impl RecentPositions {
    pub fn push(&mut self, position: Vec2) {
        self.slots[self.next] = Some(position);
        self.next = (self.next + 1) % RECENT_POSITIONS;
    }

    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        self.iter().any(|p| p.distance(position) < 1e-3)
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.slots.iter().flatten().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    pub id: String,
    pub position: Vec2,
    pub rotation: f32,
    pub recent: RecentPositions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectState {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub position: Vec2,
    pub rotation: f32,
}

/// Something that happened during a step, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Moved {
        agent: String,
        from: Vec2,
        to: Vec2,
    },
    Blocked {
        agent: String,
        by: String,
        at: Vec2,
    },
    /// The action did not translate into movement.
    Idle { agent: String, action: String },
    UnknownAgent { agent: String },
    Reward { rule: String, value: f32 },
    Terminated { reason: TerminationReason },
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { agent, from, to } => write!(f, "{agent} moved from {from} to {to}"),
            Self::Blocked { agent, by, at } => write!(f, "{agent} blocked by {by} at {at}"),
            Self::Idle { agent, action } => write!(f, "{agent} stayed put ({action})"),
            Self::UnknownAgent { agent } => write!(f, "action for unknown agent {agent} ignored"),
            Self::Reward { rule, value } => write!(f, "reward {value} from rule {rule}"),
            Self::Terminated { reason } => write!(f, "episode terminated: {reason}"),
        }
    }
}

/// Per-step diagnostics. Cleared at the start of every step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepInfo {
    pub events: Vec<SimEvent>,
    pub rewards: Vec<RewardContribution>,
}

impl StepInfo {
    /// Sum of this step's reward contributions.
    #[must_use]
    pub fn reward_delta(&self) -> f32 {
        self.rewards.iter().map(|r| r.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorState {
    pub agents: Vec<AgentState>,
    pub objects: Vec<ObjectState>,
    pub step: u64,
    pub total_reward: f32,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
    pub info: StepInfo,
}

impl SimulatorState {
    /// Initial state (step 0) for a specification.
    #[must_use]
    pub fn new(spec: &EnvSpec) -> Self {
        Self {
            agents: spec
                .agents
                .iter()
                .map(|a| AgentState {
                    id: a.id.clone(),
                    position: a.position,
                    rotation: a.rotation,
                    recent: RecentPositions::default(),
                })
                .collect(),
            objects: spec
                .objects
                .iter()
                .map(|o| ObjectState {
                    id: o.id.clone(),
                    kind: o.kind,
                    position: o.position,
                    rotation: o.rotation,
                })
                .collect(),
            step: 0,
            total_reward: 0.0,
            done: false,
            termination: None,
            info: StepInfo::default(),
        }
    }

    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&AgentState> {
        self.agents.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&ObjectState> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Position of an agent or, failing that, an object with this id.
    #[must_use]
    pub fn entity_position(&self, id: &str) -> Option<Vec2> {
        self.agent(id)
            .map(|a| a.position)
            .or_else(|| self.object(id).map(|o| o.position))
    }

    pub fn goals(&self) -> impl Iterator<Item = &ObjectState> {
        self.objects.iter().filter(|o| o.kind == ObjectKind::Goal)
    }
}
