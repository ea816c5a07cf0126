//! # Rollout Loop
//!
//! Drives one episode: validate, initialize, then select → apply → reward →
//! terminate until the episode ends or the step budget runs out. Each step's
//! state is recorded as an independent snapshot.

use envspec::{validate, EnvSpec};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::action::{self, Action};
use crate::policy::{self, Policy};
use crate::reward;
use crate::rng::{derive_seed, RandomSource};
use crate::state::{SimEvent, SimulatorState, StepInfo};
use crate::termination::{self, TerminationReason};

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: u64,
    pub action: Action,
    /// Reward earned by this step alone.
    pub reward: f32,
    pub state: SimulatorState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutResult {
    pub steps: Vec<StepRecord>,
    pub total_reward: f32,
    pub episode_length: usize,
    pub success: bool,
    pub termination_reason: Option<TerminationReason>,
}

impl RolloutResult {
    fn invalid(error: String) -> Self {
        Self {
            steps: Vec::new(),
            total_reward: 0.0,
            episode_length: 0,
            success: false,
            termination_reason: Some(TerminationReason::Invalid { error }),
        }
    }
}

/// Advance `state` by one action.
///
/// A done state is returned unchanged. Otherwise the step counter advances,
/// the action is applied, every reward rule is evaluated and accumulated, and
/// termination is checked.
#[must_use]
pub fn step(state: &SimulatorState, action: &Action, spec: &EnvSpec) -> SimulatorState {
    if state.done {
        return state.clone();
    }

    let mut next = state.clone();
    next.info = StepInfo::default();
    next.step += 1;
    action::apply_in_place(&mut next, action, spec);

    let rewards = reward::evaluate(&next, spec);
    for r in &rewards {
        next.info.events.push(SimEvent::Reward {
            rule: r.rule_id.clone(),
            value: r.value,
        });
    }
    next.info.rewards = rewards;
    next.total_reward += next.info.reward_delta();

    let check = termination::check(&next, spec);
    if check.terminated {
        end(&mut next, check.reason.unwrap_or(TerminationReason::GoalReached));
    }
    next
}

fn end(state: &mut SimulatorState, reason: TerminationReason) {
    state.done = true;
    state
        .info
        .events
        .push(SimEvent::Terminated {
            reason: reason.clone(),
        });
    state.termination = Some(reason);
}

/// Run one episode of `spec` under `policy` for at most `max_steps` steps.
///
/// Never fails: an invalid specification yields a zero-step result whose
/// termination reason carries the validation error.
pub fn run_rollout<R: RandomSource + ?Sized>(
    spec: &EnvSpec,
    policy: Policy,
    max_steps: usize,
    rng: &mut R,
) -> RolloutResult {
    if let Err(e) = validate(spec) {
        warn!("rejecting specification: {e}");
        return RolloutResult::invalid(e.to_string());
    }

    info!(%policy, max_steps, agents = spec.agents.len(), "starting rollout");
    let initial = SimulatorState::new(spec);
    let mut state = initial.clone();
    let mut steps: Vec<StepRecord> = Vec::with_capacity(max_steps.min(1024));

    while !state.done && steps.len() < max_steps {
        let action = policy::select_action(&state, spec, policy, rng);
        let mut next = step(&state, &action, spec);
        if !next.done && steps.len() + 1 >= max_steps {
            end(&mut next, TerminationReason::MaxSteps);
        }
        let reward = next.info.reward_delta();
        debug!(step = next.step, reward, events = ?next.info.events, "step");

        steps.push(StepRecord {
            step: next.step,
            action,
            reward,
            state: next.clone(),
        });
        state = next;
    }

    let success = termination::first_agent_at_goal(&state)
        || termination::events_signal_goal(&state.info.events);
    let termination_reason = state
        .termination
        .clone()
        .or(Some(TerminationReason::MaxSteps));

    info!(
        steps = steps.len(),
        total_reward = state.total_reward,
        success,
        "rollout finished"
    );
    RolloutResult {
        episode_length: steps.len(),
        total_reward: state.total_reward,
        steps,
        success,
        termination_reason,
    }
}

/// Settings for a batch of independent episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutConfig {
    pub policy: Policy,
    pub max_steps: usize,
    pub episodes: usize,
    /// Run seed; episode seeds are derived from it.
    pub seed: u64,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Greedy,
            max_steps: 200,
            episodes: 1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f32,
    pub mean_reward: f32,
    pub mean_length: f32,
}

impl BatchSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_results(results: &[RolloutResult]) -> Self {
        let episodes = results.len();
        let successes = results.iter().filter(|r| r.success).count();
        let n = episodes.max(1) as f32;
        Self {
            episodes,
            successes,
            success_rate: successes as f32 / n,
            mean_reward: results.iter().map(|r| r.total_reward).sum::<f32>() / n,
            mean_length: results.iter().map(|r| r.episode_length as f32).sum::<f32>() / n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub episodes: Vec<RolloutResult>,
    pub summary: BatchSummary,
}

/// Run episode number `episode` of a batch with its derived seed.
#[must_use]
pub fn run_episode(spec: &EnvSpec, config: &RolloutConfig, episode: u64) -> RolloutResult {
    let mut rng = fastrand::Rng::with_seed(derive_seed(config.seed, episode));
    run_rollout(spec, config.policy, config.max_steps, &mut rng)
}

/// Run `config.episodes` independent episodes.
///
/// Episodes share nothing but the read-only specification, and each one is
/// reproducible on its own from `(config.seed, index)`.
#[must_use]
pub fn run_batch(spec: &EnvSpec, config: &RolloutConfig) -> BatchResult {
    let episodes: Vec<RolloutResult> = (0..config.episodes as u64)
        .map(|episode| run_episode(spec, config, episode))
        .collect();
    let summary = BatchSummary::from_results(&episodes);
    info!(
        episodes = summary.episodes,
        success_rate = summary.success_rate,
        mean_reward = summary.mean_reward,
        "batch finished"
    );
    BatchResult { episodes, summary }
}
