//! Reward rule evaluation.
//!
//! Every declared rule is checked every step and all satisfied rules
//! contribute. There is no implicit reward.

use envspec::EnvSpec;
use serde::Serialize;

use crate::condition;
use crate::state::SimulatorState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardContribution {
    pub rule_id: String,
    pub value: f32,
    pub reason: String,
}

/// Contributions of all reward rules whose condition holds, in declaration
/// order.
#[must_use]
pub fn evaluate(state: &SimulatorState, spec: &EnvSpec) -> Vec<RewardContribution> {
    spec.rules
        .rewards
        .iter()
        .filter(|rule| condition::evaluate(&rule.condition, state, spec))
        .map(|rule| RewardContribution {
            rule_id: rule.id.clone(),
            value: rule.value,
            reason: if rule.shaping {
                format!("{} (shaping)", rule.condition)
            } else {
                rule.condition.to_string()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use envspec::{AgentDef, Condition, RewardRule, Vec2, World};

    #[test]
    fn overlapping_rules_all_contribute() {
        let spec = EnvSpec {
            world: World::grid(5.0, 5.0),
            agents: vec![AgentDef::new("a", Vec2::new(1.0, 1.0))],
            rules: envspec::Rules {
                rewards: vec![
                    RewardRule {
                        id: "here".into(),
                        condition: Condition::agent_at_position(Vec2::new(1.0, 1.0)),
                        value: 2.0,
                        shaping: false,
                    },
                    RewardRule {
                        id: "living".into(),
                        condition: Condition::Timeout { steps: 0 },
                        value: -0.1,
                        shaping: true,
                    },
                    RewardRule {
                        id: "elsewhere".into(),
                        condition: Condition::agent_at_position(Vec2::new(4.0, 4.0)),
                        value: 100.0,
                        shaping: false,
                    },
                ],
                terminations: vec![],
            },
            ..EnvSpec::default()
        };
        let state = SimulatorState::new(&spec);
        let rewards = evaluate(&state, &spec);
        let ids: Vec<_> = rewards.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, ["here", "living"]);
        assert!(rewards[1].reason.contains("shaping"));
        let total: f32 = rewards.iter().map(|r| r.value).sum();
        assert!((total - 1.9).abs() < 1e-6);
    }
}
