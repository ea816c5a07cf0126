//! # Agent/Object Geometry
//!
//! Containment tests between an agent-sized point and object shapes. Agents
//! are treated as discs of radius [`AGENT_RADIUS`]; rectangles are
//! axis-aligned and centered on the object position (rotation is ignored).

use envspec::{EnvSpec, Shape, Vec2};

use crate::state::ObjectState;

pub const AGENT_RADIUS: f32 = 0.5;

/// Whether an agent at `p` would overlap an object of `shape` at `center`.
#[must_use]
pub fn overlaps(shape: Shape, center: Vec2, p: Vec2) -> bool {
    match shape {
        Shape::Point => center.distance(p) < AGENT_RADIUS,
        Shape::Circle { radius } => center.distance(p) < radius + AGENT_RADIUS,
        Shape::Rect { width, height } => in_rect(center, width, height, p),
    }
}

/// Axis-aligned box test, edges inclusive.
#[must_use]
pub fn in_rect(center: Vec2, width: f32, height: f32, p: Vec2) -> bool {
    (p.x - center.x).abs() <= width * 0.5 && (p.y - center.y).abs() <= height * 0.5
}

/// Shape of an object, looked up in the specification by id.
#[must_use]
pub fn shape_of(spec: &EnvSpec, id: &str) -> Shape {
    spec.object(id).map(|o| o.shape).unwrap_or_default()
}

/// First wall or obstacle that would contain an agent placed at `p`.
#[must_use]
pub fn solid_at<'a>(objects: &'a [ObjectState], spec: &EnvSpec, p: Vec2) -> Option<&'a ObjectState> {
    objects
        .iter()
        .filter(|o| o.kind.is_solid())
        .find(|o| overlaps(shape_of(spec, &o.id), o.position, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_margin_includes_agent_radius() {
        let shape = Shape::Circle { radius: 1.0 };
        let c = Vec2::new(5.0, 5.0);
        assert!(overlaps(shape, c, Vec2::new(6.4, 5.0)));
        assert!(!overlaps(shape, c, Vec2::new(6.6, 5.0)));
    }

    #[test]
    fn rect_is_centered_box() {
        let shape = Shape::Rect {
            width: 4.0,
            height: 2.0,
        };
        let c = Vec2::new(2.0, 2.0);
        assert!(overlaps(shape, c, Vec2::new(4.0, 3.0)));
        assert!(!overlaps(shape, c, Vec2::new(4.1, 2.0)));
        assert!(!overlaps(shape, c, Vec2::new(2.0, 3.5)));
    }

    #[test]
    fn point_blocks_only_its_own_cell() {
        let c = Vec2::new(1.0, 1.0);
        assert!(overlaps(Shape::Point, c, c));
        assert!(!overlaps(Shape::Point, c, Vec2::new(1.0, 2.0)));
    }
}
