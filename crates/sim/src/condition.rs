//! # Condition Evaluation
//!
//! Pure evaluation of a [`Condition`] against a [`SimulatorState`]. A
//! condition that names a missing agent, object or region is simply false, so
//! one bad rule can never abort a rollout.

use envspec::{Condition, EnvSpec, Shape, Vec2};

use crate::collision::{in_rect, shape_of};
use crate::state::{AgentState, SimulatorState};

/// Distance below which two entities collide.
pub const COLLISION_DISTANCE: f32 = 1.0;

/// Contact margin for `agent_at_object`, added to a circle's radius.
pub const OBJECT_CONTACT_MARGIN: f32 = 0.5;

/// Radius used for regions that are neither rectangles nor circles.
pub const DEFAULT_REGION_RADIUS: f32 = 5.0;

/// Evaluate `condition` against `state`.
#[must_use]
pub fn evaluate(condition: &Condition, state: &SimulatorState, spec: &EnvSpec) -> bool {
    match condition {
        Condition::AgentAtPosition {
            position,
            tolerance,
            agent_id,
        } => agents(state, agent_id.as_deref()).any(|a| a.position.distance(*position) <= *tolerance),
        Condition::AgentAtObject {
            object_id,
            agent_id,
        } => {
            let Some(object) = state.object(object_id) else {
                return false;
            };
            // Rectangles get the flat margin, not their half-extents.
            let threshold = match shape_of(spec, object_id) {
                Shape::Circle { radius } => radius + OBJECT_CONTACT_MARGIN,
                Shape::Point | Shape::Rect { .. } => OBJECT_CONTACT_MARGIN,
            };
            agents(state, agent_id.as_deref())
                .any(|a| a.position.distance(object.position) <= threshold)
        }
        Condition::Collision { a, b } => {
            match (state.entity_position(a), state.entity_position(b)) {
                (Some(pa), Some(pb)) => pa.distance(pb) < COLLISION_DISTANCE,
                _ => false,
            }
        }
        Condition::Timeout { steps } => state.step >= *steps,
        Condition::InsideRegion {
            region_id,
            agent_id,
        } => {
            let Some(region) = state.object(region_id) else {
                return false;
            };
            let shape = shape_of(spec, region_id);
            agents(state, agent_id.as_deref()).any(|a| inside(shape, region.position, a.position))
        }
        Condition::Custom { .. } => false,
    }
}

/// Agents a condition applies to: the named one, or all of them.
fn agents<'a>(
    state: &'a SimulatorState,
    agent_id: Option<&'a str>,
) -> impl Iterator<Item = &'a AgentState> + 'a {
    state
        .agents
        .iter()
        .filter(move |a| agent_id.map_or(true, |id| a.id == id))
}

fn inside(shape: Shape, center: Vec2, p: Vec2) -> bool {
    match shape {
        Shape::Rect { width, height } => in_rect(center, width, height, p),
        Shape::Circle { radius } => center.distance(p) <= radius,
        Shape::Point => center.distance(p) <= DEFAULT_REGION_RADIUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envspec::{AgentDef, ObjectDef, ObjectKind};

    fn spec_with(objects: Vec<ObjectDef>, agents: Vec<AgentDef>) -> EnvSpec {
        EnvSpec {
            world: envspec::World::grid(10.0, 10.0),
            objects,
            agents,
            ..EnvSpec::default()
        }
    }

    #[test]
    fn agent_at_position_uses_tolerance() {
        let spec = spec_with(vec![], vec![AgentDef::new("a", Vec2::new(2.0, 2.0))]);
        let state = SimulatorState::new(&spec);
        let near = Condition::AgentAtPosition {
            position: Vec2::new(2.4, 2.0),
            tolerance: 0.5,
            agent_id: None,
        };
        let far = Condition::agent_at_position(Vec2::new(3.0, 2.0));
        assert!(evaluate(&near, &state, &spec));
        assert!(!evaluate(&far, &state, &spec));
    }

    #[test]
    fn agent_filter_restricts_to_named_agent() {
        let spec = spec_with(
            vec![ObjectDef::new("g", ObjectKind::Goal, Vec2::new(1.0, 1.0))],
            vec![
                AgentDef::new("a", Vec2::new(0.0, 0.0)),
                AgentDef::new("b", Vec2::new(1.0, 1.0)),
            ],
        );
        let state = SimulatorState::new(&spec);
        let any = Condition::agent_at_object("g");
        let only_a = Condition::AgentAtObject {
            object_id: "g".into(),
            agent_id: Some("a".into()),
        };
        let ghost = Condition::AgentAtObject {
            object_id: "g".into(),
            agent_id: Some("ghost".into()),
        };
        assert!(evaluate(&any, &state, &spec));
        assert!(!evaluate(&only_a, &state, &spec));
        assert!(!evaluate(&ghost, &state, &spec));
    }

    #[test]
    fn circle_objects_widen_contact_by_radius() {
        let spec = spec_with(
            vec![ObjectDef::new("pad", ObjectKind::Checkpoint, Vec2::new(5.0, 5.0))
                .with_shape(Shape::Circle { radius: 2.0 })],
            vec![AgentDef::new("a", Vec2::new(7.0, 5.0))],
        );
        let state = SimulatorState::new(&spec);
        assert!(evaluate(&Condition::agent_at_object("pad"), &state, &spec));
    }

    #[test]
    fn rect_objects_use_flat_margin_not_extents() {
        // Agent sits inside a 6x6 rect but 2 units from its center: still no contact.
        let spec = spec_with(
            vec![ObjectDef::new("zone", ObjectKind::Goal, Vec2::new(5.0, 5.0)).with_shape(
                Shape::Rect {
                    width: 6.0,
                    height: 6.0,
                },
            )],
            vec![AgentDef::new("a", Vec2::new(7.0, 5.0))],
        );
        let state = SimulatorState::new(&spec);
        assert!(!evaluate(&Condition::agent_at_object("zone"), &state, &spec));
        let region = Condition::InsideRegion {
            region_id: "zone".into(),
            agent_id: None,
        };
        assert!(evaluate(&region, &state, &spec));
    }

    #[test]
    fn collision_threshold_is_strict() {
        let spec = spec_with(
            vec![ObjectDef::new("rock", ObjectKind::Obstacle, Vec2::new(3.0, 0.0))],
            vec![
                AgentDef::new("a", Vec2::new(0.0, 0.0)),
                AgentDef::new("b", Vec2::new(0.5, 0.5)),
            ],
        );
        let state = SimulatorState::new(&spec);
        let ab = Condition::Collision {
            a: "a".into(),
            b: "b".into(),
        };
        let a_rock = Condition::Collision {
            a: "a".into(),
            b: "rock".into(),
        };
        let missing = Condition::Collision {
            a: "a".into(),
            b: "nope".into(),
        };
        assert!(evaluate(&ab, &state, &spec));
        assert!(!evaluate(&a_rock, &state, &spec));
        assert!(!evaluate(&missing, &state, &spec));
    }

    #[test]
    fn timeout_compares_step_counter() {
        let spec = spec_with(vec![], vec![AgentDef::new("a", Vec2::ZERO)]);
        let mut state = SimulatorState::new(&spec);
        let cond = Condition::Timeout { steps: 3 };
        state.step = 2;
        assert!(!evaluate(&cond, &state, &spec));
        state.step = 3;
        assert!(evaluate(&cond, &state, &spec));
    }

    #[test]
    fn point_regions_fall_back_to_default_radius() {
        let spec = spec_with(
            vec![ObjectDef::new("area", ObjectKind::Region, Vec2::new(0.0, 0.0))],
            vec![AgentDef::new("a", Vec2::new(3.0, 4.0))],
        );
        let state = SimulatorState::new(&spec);
        let cond = Condition::InsideRegion {
            region_id: "area".into(),
            agent_id: None,
        };
        assert!(evaluate(&cond, &state, &spec));
    }

    #[test]
    fn custom_scripts_never_run() {
        let spec = spec_with(vec![], vec![AgentDef::new("a", Vec2::ZERO)]);
        let state = SimulatorState::new(&spec);
        let cond = Condition::Custom {
            script: "return true".into(),
        };
        assert!(!evaluate(&cond, &state, &spec));
    }
}
