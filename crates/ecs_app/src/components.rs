//! Components used by the demo.

use ecs_component::Component;
use ecs_data::ComponentCodecs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Units per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Component for Name {
    fn type_name() -> &'static str {
        "Name"
    }
}

/// Marks the entity the player has selected. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selected;

impl Component for Selected {
    fn type_name() -> &'static str {
        "Selected"
    }
}

/// Codecs for every kind that is saved with a level.
pub fn codecs() -> ComponentCodecs {
    ComponentCodecs::new()
        .with::<Position>()
        .with::<Velocity>()
        .with::<Name>()
}
