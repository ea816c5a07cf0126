//! # Specification Model
//!
//! Serde data types for a declarative environment. Field names follow the
//! camelCase JSON produced by the editor; tagged unions use a `type` (or
//! `kind`, for shapes) discriminator.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::condition::Condition;
use crate::types::Vec2;

/// Complete declarative description of an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvSpec {
    #[serde(default)]
    pub world: World,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub agents: Vec<AgentDef>,
    #[serde(default)]
    pub action_space: Option<ActionSpace>,
    #[serde(default)]
    pub rules: Rules,
}

/// How positions are interpreted.
///
/// Grid worlds use screen-style coordinates (y grows downward) and integer
/// cells; cartesian worlds use y-up continuous coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    #[default]
    Grid,
    #[serde(alias = "continuous2d", alias = "continuous")]
    Cartesian,
}

/// World bounds. A missing world deserializes to a zero-sized one, which the
/// validator rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl World {
    #[must_use]
    pub const fn grid(width: f32, height: f32) -> Self {
        Self {
            coordinate_system: CoordinateSystem::Grid,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn cartesian(width: f32, height: f32) -> Self {
        Self {
            coordinate_system: CoordinateSystem::Cartesian,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_grid(&self) -> bool {
        self.coordinate_system == CoordinateSystem::Grid
    }

    /// Largest reachable coordinate. Grid cells run `0..=floor(width-1)`,
    /// cartesian worlds span `0..=width`.
    #[must_use]
    pub fn max_corner(&self) -> Vec2 {
        if self.is_grid() {
            let last_cell = |size: f32| (size - 1.0).floor().max(0.0);
            Vec2::new(last_cell(self.width), last_cell(self.height))
        } else {
            Vec2::new(self.width.max(0.0), self.height.max(0.0))
        }
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max_corner();
        p.x >= 0.0 && p.y >= 0.0 && p.x <= max.x && p.y <= max.y
    }

    /// Clamp into bounds; grid positions are then snapped to the nearest cell.
    #[must_use]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        let max = self.max_corner();
        let clamped = Vec2::new(p.x.clamp(0.0, max.x), p.y.clamp(0.0, max.y));
        if self.is_grid() {
            clamped.round()
        } else {
            clamped
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Wall,
    Obstacle,
    Goal,
    Trap,
    Key,
    Door,
    Checkpoint,
    Region,
    Custom,
}

impl ObjectKind {
    /// Objects that block agent movement.
    #[must_use]
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Obstacle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Point,
    Circle {
        radius: f32,
    },
    Rect {
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub position: Vec2,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub rotation: f32,
}

impl ObjectDef {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ObjectKind, position: Vec2) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            shape: Shape::Point,
            rotation: 0.0,
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDef {
    pub id: String,
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
}

impl AgentDef {
    #[must_use]
    pub fn new(id: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            rotation: 0.0,
        }
    }
}

fn default_dimensions() -> usize {
    2
}

fn unit_range() -> [f32; 2] {
    [-1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpace {
    Discrete {
        actions: Vec<String>,
    },
    Continuous {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
        #[serde(default = "unit_range")]
        range: [f32; 2],
    },
}

impl ActionSpace {
    /// Discrete space over the given action names.
    #[must_use]
    pub fn discrete<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Discrete {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Two-dimensional continuous space over `[-1, 1]`.
    #[must_use]
    pub fn continuous() -> Self {
        Self::Continuous {
            dimensions: default_dimensions(),
            range: unit_range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRule {
    pub id: String,
    pub condition: Condition,
    pub value: f32,
    /// Editor hint that the rule is a shaping term; evaluation is unaffected.
    #[serde(default)]
    pub shaping: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationRule {
    pub id: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    #[serde(default)]
    pub rewards: Vec<RewardRule>,
    #[serde(default)]
    pub terminations: Vec<TerminationRule>,
}

impl EnvSpec {
    /// Parse a specification from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or does not match the schema.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON specification file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read specification {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("failed to parse specification {}", path.display()))
    }

    /// Serialize back to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&ObjectDef> {
        self.objects.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&AgentDef> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// All `goal`-typed objects, in declaration order.
    pub fn goals(&self) -> impl Iterator<Item = &ObjectDef> {
        self.objects.iter().filter(|o| o.kind == ObjectKind::Goal)
    }

    #[must_use]
    pub fn is_grid(&self) -> bool {
        self.world.is_grid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_shapes_and_aliases() {
        let spec = EnvSpec::from_json(
            r#"{
                "world": { "coordinateSystem": "continuous2d", "width": 10, "height": 8 },
                "objects": [
                    { "id": "pond", "type": "region", "position": { "x": 5, "y": 5 },
                      "shape": { "kind": "circle", "radius": 2 } },
                    { "id": "block", "type": "wall", "position": { "x": 1, "y": 1 },
                      "shape": { "kind": "rect", "width": 2, "height": 1 } }
                ],
                "actionSpace": { "type": "continuous" }
            }"#,
        )
        .unwrap();

        assert_eq!(spec.world.coordinate_system, CoordinateSystem::Cartesian);
        assert_eq!(spec.objects[0].shape, Shape::Circle { radius: 2.0 });
        assert!(spec.objects[1].kind.is_solid());
        assert_eq!(spec.action_space, Some(ActionSpace::continuous()));
        assert!(spec.agents.is_empty());
    }

    #[test]
    fn missing_world_defaults_to_zero_size() {
        let spec = EnvSpec::from_json("{}").unwrap();
        assert_eq!(spec.world.width, 0.0);
        assert!(spec.action_space.is_none());
    }

    #[test]
    fn grid_clamp_rounds_to_cells() {
        let world = World::grid(5.0, 5.0);
        assert_eq!(world.clamp(Vec2::new(-1.0, 7.2)), Vec2::new(0.0, 4.0));
        assert_eq!(world.clamp(Vec2::new(2.4, 2.6)), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn fractional_grid_clamps_to_last_whole_cell() {
        let world = World::grid(5.5, 1.0);
        assert_eq!(world.max_corner(), Vec2::new(4.0, 0.0));
        let clamped = world.clamp(Vec2::new(4.5, 0.0));
        assert_eq!(clamped, Vec2::new(4.0, 0.0));
        assert!(world.contains(clamped));
    }

    #[test]
    fn cartesian_clamp_keeps_fractions() {
        let world = World::cartesian(5.0, 5.0);
        assert_eq!(world.clamp(Vec2::new(5.3, 2.25)), Vec2::new(5.0, 2.25));
    }
}
