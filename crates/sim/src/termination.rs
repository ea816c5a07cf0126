//! # Termination
//!
//! Two authorities end an episode. [`check`] evaluates the declared
//! termination rules (skipping `timeout` rules, which the step budget covers)
//! and then falls back to an implicit goal test on the first agent. The
//! rollout loop separately enforces its step budget.

use envspec::EnvSpec;
use serde::Serialize;
use std::fmt;

use crate::condition;
use crate::state::{SimEvent, SimulatorState};

/// Distance at which the first agent counts as standing on a goal.
pub const GOAL_REACH_DISTANCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationReason {
    /// A declared termination rule matched.
    Rule { rule_id: String },
    /// Implicit fallback: the first agent reached a goal object.
    GoalReached,
    /// The caller's step budget ran out.
    MaxSteps,
    /// The specification failed validation; nothing was simulated.
    Invalid { error: String },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule { rule_id } => write!(f, "rule {rule_id}"),
            Self::GoalReached => write!(f, "goal reached"),
            Self::MaxSteps => write!(f, "max steps"),
            Self::Invalid { error } => write!(f, "invalid specification: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationCheck {
    pub terminated: bool,
    pub reason: Option<TerminationReason>,
}

impl TerminationCheck {
    fn ended(reason: TerminationReason) -> Self {
        Self {
            terminated: true,
            reason: Some(reason),
        }
    }

    fn running() -> Self {
        Self {
            terminated: false,
            reason: None,
        }
    }
}

/// Decide whether `state` ends the episode.
///
/// A state that is already done stays done with its original reason.
#[must_use]
pub fn check(state: &SimulatorState, spec: &EnvSpec) -> TerminationCheck {
    if state.done {
        return TerminationCheck {
            terminated: true,
            reason: state.termination.clone(),
        };
    }

    let matched = spec
        .rules
        .terminations
        .iter()
        .filter(|rule| !rule.condition.is_timeout())
        .find(|rule| condition::evaluate(&rule.condition, state, spec));
    if let Some(rule) = matched {
        return TerminationCheck::ended(TerminationReason::Rule {
            rule_id: rule.id.clone(),
        });
    }

    if first_agent_at_goal(state) {
        return TerminationCheck::ended(TerminationReason::GoalReached);
    }
    TerminationCheck::running()
}

/// Whether the first agent is within [`GOAL_REACH_DISTANCE`] of any goal.
///
/// Only agent 0 is inspected, also in multi-agent worlds.
#[must_use]
pub fn first_agent_at_goal(state: &SimulatorState) -> bool {
    let Some(agent) = state.agents.first() else {
        return false;
    };
    state
        .goals()
        .any(|g| g.position.distance(agent.position) <= GOAL_REACH_DISTANCE)
}

/// Textual heuristic: the last logged event reads like a goal being reached.
///
/// Kept next to [`first_agent_at_goal`] as a second, independent success
/// signal; the two can disagree (e.g. a rule named `reach_goal` firing on a
/// large goal while the agent is still off-center).
#[must_use]
pub fn events_signal_goal(events: &[SimEvent]) -> bool {
    events.last().is_some_and(|event| {
        let text = event.to_string().to_ascii_lowercase();
        text.contains("goal") && text.contains("reach")
    })
}
