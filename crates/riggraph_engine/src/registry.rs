// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vertex type registry: declares which attribute slots each vertex
//! type carries.

use indexmap::IndexMap;
use riggraph_core::AttrType;
use serde::{Deserialize, Serialize};

/// Shape of one attribute slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrKind {
    /// A single typed value slot
    Scalar(AttrType),
    /// Named sub-slots
    Compound(Vec<AttrSpec>),
    /// Indexed sub-slots, created on demand
    Array(Box<AttrSpec>),
}

/// Declaration of one attribute slot of a vertex type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSpec {
    /// Long attribute name
    pub name: String,
    /// Short attribute name
    pub short_name: String,
    /// Slot shape
    pub kind: AttrKind,
}

impl AttrSpec {
    /// Declare a scalar slot.
    pub fn scalar(
        name: impl Into<String>,
        short_name: impl Into<String>,
        attr_type: AttrType,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            kind: AttrKind::Scalar(attr_type),
        }
    }

    /// Declare a compound slot with named children.
    pub fn compound(
        name: impl Into<String>,
        short_name: impl Into<String>,
        children: Vec<AttrSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            kind: AttrKind::Compound(children),
        }
    }

    /// Declare an array slot with the given element shape.
    pub fn array(
        name: impl Into<String>,
        short_name: impl Into<String>,
        element: AttrSpec,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            kind: AttrKind::Array(Box::new(element)),
        }
    }
}

/// A vertex type: its name, hierarchy capability and attribute slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexType {
    /// Unique type name
    pub name: String,
    /// Whether vertices of this type participate in the structural
    /// hierarchy
    pub hierarchical: bool,
    /// Attribute slots instantiated on every vertex of this type
    pub attrs: Vec<AttrSpec>,
}

impl VertexType {
    /// Declare a vertex type.
    pub fn new(name: impl Into<String>, hierarchical: bool, attrs: Vec<AttrSpec>) -> Self {
        Self {
            name: name.into(),
            hierarchical,
            attrs,
        }
    }
}

/// Registry of available vertex types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    types: IndexMap<String, VertexType>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in vertex types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(VertexType::new("transform", true, dag_attrs()));
        registry.register(VertexType::new("joint", true, dag_attrs()));
        registry.register(VertexType::new(
            "multMatrix",
            false,
            vec![
                AttrSpec::array(
                    "matrixIn",
                    "i",
                    AttrSpec::scalar("matrixIn", "i", AttrType::Matrix),
                ),
                AttrSpec::scalar("matrixSum", "o", AttrType::Matrix),
                AttrSpec::scalar("message", "msg", AttrType::Message),
            ],
        ));
        registry.register(VertexType::new(
            "inverseMatrix",
            false,
            vec![
                AttrSpec::scalar("inputMatrix", "imat", AttrType::Matrix),
                AttrSpec::scalar("outputMatrix", "omat", AttrType::Matrix),
                AttrSpec::scalar("message", "msg", AttrType::Message),
            ],
        ));
        registry.register(VertexType::new(
            "network",
            false,
            vec![AttrSpec::scalar("message", "msg", AttrType::Message)],
        ));
        registry.register(VertexType::new(
            "container",
            false,
            vec![
                AttrSpec::scalar("message", "msg", AttrType::Message),
                AttrSpec::scalar("containerType", "ctyp", AttrType::String),
            ],
        ));
        registry
    }

    /// Register a vertex type, replacing any previous declaration.
    pub fn register(&mut self, vertex_type: VertexType) {
        self.types.insert(vertex_type.name.clone(), vertex_type);
    }

    /// Look up a vertex type by name.
    pub fn get(&self, name: &str) -> Option<&VertexType> {
        self.types.get(name)
    }

    /// Iterate all registered types.
    pub fn types(&self) -> impl Iterator<Item = &VertexType> {
        self.types.values()
    }
}

fn triple(name: &str, short: &str, axes: [(&str, &str); 3]) -> AttrSpec {
    AttrSpec::compound(
        name,
        short,
        axes.iter()
            .map(|(long, sn)| AttrSpec::scalar(*long, *sn, AttrType::Float))
            .collect(),
    )
}

/// Attribute slots shared by the hierarchical (DAG) vertex types.
fn dag_attrs() -> Vec<AttrSpec> {
    vec![
        triple(
            "translate",
            "t",
            [
                ("translateX", "tx"),
                ("translateY", "ty"),
                ("translateZ", "tz"),
            ],
        ),
        triple(
            "rotate",
            "r",
            [("rotateX", "rx"), ("rotateY", "ry"), ("rotateZ", "rz")],
        ),
        triple(
            "scale",
            "s",
            [("scaleX", "sx"), ("scaleY", "sy"), ("scaleZ", "sz")],
        ),
        AttrSpec::scalar("matrix", "m", AttrType::Matrix),
        AttrSpec::scalar("inverseMatrix", "im", AttrType::Matrix),
        AttrSpec::array(
            "worldMatrix",
            "wm",
            AttrSpec::scalar("worldMatrix", "wm", AttrType::Matrix),
        ),
        AttrSpec::array(
            "parentMatrix",
            "pm",
            AttrSpec::scalar("parentMatrix", "pm", AttrType::Matrix),
        ),
        AttrSpec::scalar("offsetParentMatrix", "opm", AttrType::Matrix),
        AttrSpec::scalar("inheritsTransform", "it", AttrType::Bool),
        AttrSpec::scalar("visibility", "v", AttrType::Bool),
        AttrSpec::scalar("message", "msg", AttrType::Message),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let registry = TypeRegistry::with_builtins();
        for name in ["transform", "joint", "multMatrix", "inverseMatrix", "network", "container"] {
            assert!(registry.get(name).is_some(), "missing builtin {name}");
        }
        assert!(registry.get("transform").unwrap().hierarchical);
        assert!(!registry.get("multMatrix").unwrap().hierarchical);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TypeRegistry::new();
        registry.register(VertexType::new("custom", false, Vec::new()));
        registry.register(VertexType::new(
            "custom",
            true,
            vec![AttrSpec::scalar("value", "val", AttrType::Float)],
        ));
        let custom = registry.get("custom").unwrap();
        assert!(custom.hierarchical);
        assert_eq!(custom.attrs.len(), 1);
    }

    #[test]
    fn test_specs_round_trip_through_serde() {
        let registry = TypeRegistry::with_builtins();
        let json = serde_json::to_string(registry.get("transform").unwrap()).unwrap();
        let back: VertexType = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, registry.get("transform").unwrap());
    }
}
