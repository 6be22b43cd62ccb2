// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node handles: references to one vertex in the host graph.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::host::{AttrRequest, SceneRef, VertexHandle};
use crate::plug::Plug;
use crate::value::Value;

/// A reference to one vertex in the host graph.
///
/// The wrapper has no lifetime of its own: dropping it never touches
/// the vertex, and two wrappers over the same vertex compare and hash
/// equal. Name, hierarchy and attribute lookups are live round-trips
/// to the host, never cached.
#[derive(Clone)]
pub struct Node {
    scene: SceneRef,
    handle: VertexHandle,
}

impl Node {
    /// Request creation of a new vertex from the host.
    ///
    /// With a `parent`, the vertex is created as its structural child;
    /// otherwise it is free-standing. Name assignment is best effort -
    /// the host may disambiguate on collision, so re-read [`Node::name`]
    /// rather than assuming the requested name stuck.
    pub fn create(
        scene: &SceneRef,
        type_name: &str,
        name: Option<&str>,
        parent: Option<&Node>,
    ) -> Result<Node> {
        let handle = scene
            .borrow_mut()
            .create_vertex(type_name, name, parent.map(|p| p.handle))?;
        let node = Node::wrap(scene, handle);
        tracing::debug!("created {} vertex {}", type_name, node);
        Ok(node)
    }

    /// Resolve a display name to a node, if the host knows it.
    pub fn from_name(scene: &SceneRef, name: &str) -> Option<Node> {
        let handle = scene.borrow().lookup_vertex(name)?;
        Some(Node::wrap(scene, handle))
    }

    /// Wrap a host vertex handle.
    pub fn wrap(scene: &SceneRef, handle: VertexHandle) -> Node {
        Node {
            scene: scene.clone(),
            handle,
        }
    }

    /// The underlying host handle.
    pub fn handle(&self) -> VertexHandle {
        self.handle
    }

    /// The scene this node belongs to.
    pub fn scene(&self) -> &SceneRef {
        &self.scene
    }

    /// Whether the handle still refers to a live vertex.
    pub fn exists(&self) -> bool {
        self.scene.borrow().vertex_exists(self.handle)
    }

    /// Shortest unambiguous display name, falling back to a qualified
    /// path when the short form is ambiguous.
    pub fn name(&self) -> Result<String> {
        Ok(self.scene.borrow().vertex_name(self.handle)?)
    }

    /// Request a rename, returning the name the host actually assigned.
    pub fn rename(&self, name: &str) -> Result<String> {
        let assigned = self.scene.borrow_mut().rename_vertex(self.handle, name)?;
        tracing::debug!("renamed vertex to {}", assigned);
        Ok(assigned)
    }

    /// Type name of the vertex.
    pub fn type_name(&self) -> Result<String> {
        Ok(self.scene.borrow().vertex_type(self.handle)?)
    }

    /// Whether the vertex participates in the structural hierarchy.
    pub fn is_hierarchical(&self) -> bool {
        self.scene.borrow().is_hierarchical(self.handle)
    }

    /// Immediate structural parents, derived live from the host.
    pub fn parents(&self) -> Vec<Node> {
        let scene = self.scene.borrow();
        (0..scene.parent_count(self.handle))
            .filter_map(|idx| scene.parent_at(self.handle, idx))
            .map(|h| Node::wrap(&self.scene, h))
            .collect()
    }

    /// Immediate structural children, derived live from the host.
    pub fn children(&self) -> Vec<Node> {
        let scene = self.scene.borrow();
        (0..scene.child_count(self.handle))
            .filter_map(|idx| scene.child_at(self.handle, idx))
            .map(|h| Node::wrap(&self.scene, h))
            .collect()
    }

    /// Resolve an attribute name to a plug.
    ///
    /// When this vertex is a container, its published interface is
    /// consulted first, so external callers keep working when the
    /// internal wiring behind a published name is swapped. A miss on
    /// both paths yields the null plug.
    pub fn plug(&self, name: &str) -> Plug {
        let scene = self.scene.borrow();
        if scene.is_container(self.handle) {
            for (published, handle) in scene.published_plugs(self.handle) {
                if published == name {
                    return Plug::wrap(&self.scene, handle);
                }
            }
        }
        match scene.find_plug(self.handle, name) {
            Some(handle) => Plug::wrap(&self.scene, handle),
            None => Plug::null(&self.scene),
        }
    }

    /// Resolve an attribute name and assign through the variadic
    /// setter; `node.set(key, args)` is `node.plug(key).set(args)`.
    pub fn set(&self, key: &str, args: &[Value]) -> Result<()> {
        self.plug(key).set(args)
    }

    /// Add a dynamic attribute to this vertex, returning its plug.
    pub fn add_attr(&self, request: &AttrRequest) -> Result<Plug> {
        let handle = self.scene.borrow_mut().add_attribute(self.handle, request)?;
        Ok(Plug::wrap(&self.scene, handle))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .scene
            .borrow()
            .vertex_name(self.handle)
            .unwrap_or_else(|_| format!("<vertex {:?}>", self.handle.0));
        f.write_str(&name)
    }
}
