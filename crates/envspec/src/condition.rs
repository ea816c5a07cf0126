//! Tagged predicates over simulator state, embedded by value in reward and
//! termination rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Vec2;

fn default_tolerance() -> f32 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// An agent is within `tolerance` of a fixed point.
    AgentAtPosition {
        position: Vec2,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
        #[serde(default, rename = "agentId", skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
    },
    /// An agent touches an object.
    AgentAtObject {
        #[serde(rename = "objectId")]
        object_id: String,
        #[serde(default, rename = "agentId", skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
    },
    /// Two entities (agents or objects) are closer than one unit.
    Collision {
        #[serde(rename = "idA", alias = "entityA")]
        a: String,
        #[serde(rename = "idB", alias = "entityB")]
        b: String,
    },
    /// The step counter reached `steps`.
    Timeout { steps: u64 },
    /// An agent is inside a region object.
    InsideRegion {
        #[serde(rename = "regionId")]
        region_id: String,
        #[serde(default, rename = "agentId", skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
    },
    /// User script. Never executed; always evaluates false.
    Custom {
        #[serde(default)]
        script: String,
    },
}

impl Condition {
    #[must_use]
    pub fn agent_at_object(object_id: impl Into<String>) -> Self {
        Self::AgentAtObject {
            object_id: object_id.into(),
            agent_id: None,
        }
    }

    #[must_use]
    pub fn agent_at_position(position: Vec2) -> Self {
        Self::AgentAtPosition {
            position,
            tolerance: default_tolerance(),
            agent_id: None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentAtPosition {
                position,
                tolerance,
                ..
            } => write!(f, "agent within {tolerance} of {position}"),
            Self::AgentAtObject { object_id, .. } => write!(f, "agent at object '{object_id}'"),
            Self::Collision { a, b } => write!(f, "collision between '{a}' and '{b}'"),
            Self::Timeout { steps } => write!(f, "timeout after {steps} steps"),
            Self::InsideRegion { region_id, .. } => write!(f, "agent inside region '{region_id}'"),
            Self::Custom { .. } => write!(f, "custom script (disabled)"),
        }
    }
}
