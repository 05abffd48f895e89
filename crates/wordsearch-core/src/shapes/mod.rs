//! Grid shapes: the fixed built-in set and user-defined custom shapes.

mod registry;

pub use registry::ShapeRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shapes the generation engine knows without a custom definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinShape {
    #[default]
    Square,
    Circle,
    Diamond,
    Triangle,
    Hexagon,
    Heart,
    Star,
    Butterfly,
    Flower,
    Dog,
    Cat,
    Fish,
    Tree,
    House,
    Car,
}

impl BuiltinShape {
    /// Every built-in shape, in menu order.
    pub const ALL: [BuiltinShape; 15] = [
        BuiltinShape::Square,
        BuiltinShape::Circle,
        BuiltinShape::Diamond,
        BuiltinShape::Triangle,
        BuiltinShape::Hexagon,
        BuiltinShape::Heart,
        BuiltinShape::Star,
        BuiltinShape::Butterfly,
        BuiltinShape::Flower,
        BuiltinShape::Dog,
        BuiltinShape::Cat,
        BuiltinShape::Fish,
        BuiltinShape::Tree,
        BuiltinShape::House,
        BuiltinShape::Car,
    ];

    /// Identifier used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinShape::Square => "square",
            BuiltinShape::Circle => "circle",
            BuiltinShape::Diamond => "diamond",
            BuiltinShape::Triangle => "triangle",
            BuiltinShape::Hexagon => "hexagon",
            BuiltinShape::Heart => "heart",
            BuiltinShape::Star => "star",
            BuiltinShape::Butterfly => "butterfly",
            BuiltinShape::Flower => "flower",
            BuiltinShape::Dog => "dog",
            BuiltinShape::Cat => "cat",
            BuiltinShape::Fish => "fish",
            BuiltinShape::Tree => "tree",
            BuiltinShape::House => "house",
            BuiltinShape::Car => "car",
        }
    }

    /// Exact, case-sensitive lookup by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.name() == name)
    }
}

/// Identifier of the shape a puzzle is laid out in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ShapeId {
    BuiltIn(BuiltinShape),
    Custom(String),
}

impl ShapeId {
    /// Resolve a wire name: built-in names map to [`ShapeId::BuiltIn`],
    /// anything else is a custom shape name.
    pub fn parse(name: &str) -> Self {
        match BuiltinShape::from_name(name) {
            Some(shape) => ShapeId::BuiltIn(shape),
            None => ShapeId::Custom(name.to_string()),
        }
    }

    /// Wire name of this shape.
    pub fn as_str(&self) -> &str {
        match self {
            ShapeId::BuiltIn(shape) => shape.name(),
            ShapeId::Custom(name) => name,
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, ShapeId::BuiltIn(_))
    }

    /// Custom shape name, if this is a custom shape.
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            ShapeId::Custom(name) => Some(name),
            ShapeId::BuiltIn(_) => None,
        }
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        ShapeId::BuiltIn(BuiltinShape::default())
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ShapeId {
    fn from(name: String) -> Self {
        ShapeId::parse(&name)
    }
}

impl From<ShapeId> for String {
    fn from(id: ShapeId) -> Self {
        id.as_str().to_string()
    }
}

/// Membership test against the built-in set.
pub fn is_built_in(name: &str) -> bool {
    BuiltinShape::from_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_set_is_exact() {
        let names: Vec<&str> = BuiltinShape::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "square", "circle", "diamond", "triangle", "hexagon", "heart", "star",
                "butterfly", "flower", "dog", "cat", "fish", "tree", "house", "car",
            ]
        );
        for name in names {
            assert!(is_built_in(name));
        }
    }

    #[test]
    fn test_custom_names_are_not_built_in() {
        assert!(!is_built_in("my_drawing"));
        assert!(!is_built_in("Square"));
        assert!(!is_built_in(""));
    }

    #[test]
    fn test_parse() {
        assert_eq!(ShapeId::parse("heart"), ShapeId::BuiltIn(BuiltinShape::Heart));
        assert_eq!(ShapeId::parse("rocket"), ShapeId::Custom("rocket".to_string()));
        assert_eq!(ShapeId::default().as_str(), "square");
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&ShapeId::BuiltIn(BuiltinShape::Star)).unwrap();
        assert_eq!(json, "\"star\"");
        let id: ShapeId = serde_json::from_str("\"blob\"").unwrap();
        assert_eq!(id, ShapeId::Custom("blob".to_string()));
    }
}
