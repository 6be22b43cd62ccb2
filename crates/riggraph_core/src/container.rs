// SPDX-License-Identifier: MIT OR Apache-2.0
//! Container handles: nodes that bound a sub-graph of members and
//! expose a curated published interface.
//!
//! A container *has* a node rather than inheriting one: node-like
//! operations forward to the wrapped [`Node`], and everything
//! container-specific (membership, published interface, root
//! transform, the container tree) is queried live from the host.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{Result, RigError};
use crate::graph::Graph;
use crate::host::{PublishRole, SceneRef, VertexHandle};
use crate::node::Node;
use crate::plug::Plug;
use crate::value::Value;

/// Vertex type name of containers in the host engine.
pub const CONTAINER_TYPE: &str = "container";

/// A node that also bounds a sub-graph with a published interface.
#[derive(Clone, PartialEq, Eq)]
pub struct Container {
    node: Node,
}

impl Container {
    /// Allocate a new container vertex.
    pub fn create(scene: &SceneRef, name: Option<&str>) -> Result<Container> {
        let node = Node::create(scene, CONTAINER_TYPE, name, None)?;
        Ok(Container { node })
    }

    /// Wrap an existing node, which must be of the container kind.
    pub fn from_node(node: Node) -> Option<Container> {
        if node.scene().borrow().is_container(node.handle()) {
            Some(Container { node })
        } else {
            None
        }
    }

    /// Create a container holding every member of `graph`.
    ///
    /// With `set_root_transform` on, the first DAG root derived from
    /// `graph` (if any) becomes the container's root transform.
    pub fn containerize(
        scene: &SceneRef,
        graph: &Graph,
        name: Option<&str>,
        set_root_transform: bool,
    ) -> Result<Container> {
        let container = Container::create(scene, name)?;
        for node in graph.nodes() {
            container.add_node(node)?;
        }

        if set_root_transform {
            let roots = graph.dag_roots(true)?;
            if let Some(root) = roots.nodes().next() {
                container.set_root_transform(Some(root))?;
            };
        }

        tracing::debug!(
            "containerized {} members into {}",
            graph.len(),
            container
        );
        Ok(container)
    }

    /// The wrapped node.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The scene this container belongs to.
    pub fn scene(&self) -> &SceneRef {
        self.node.scene()
    }

    /// The underlying host handle.
    pub fn handle(&self) -> VertexHandle {
        self.node.handle()
    }

    /// Display name; forwards to the wrapped node.
    pub fn name(&self) -> Result<String> {
        self.node.name()
    }

    /// Rename; forwards to the wrapped node.
    pub fn rename(&self, name: &str) -> Result<String> {
        self.node.rename(name)
    }

    /// Resolve an attribute, published names first; forwards to the
    /// wrapped node.
    pub fn plug(&self, name: &str) -> Plug {
        self.node.plug(name)
    }

    /// Resolve and assign an attribute; forwards to the wrapped node.
    pub fn set(&self, key: &str, args: &[Value]) -> Result<()> {
        self.node.set(key, args)
    }

    // --- membership -----------------------------------------------------

    /// Add a node to this container's membership; idempotent.
    pub fn add_node(&self, node: &Node) -> Result<()> {
        self.scene()
            .borrow_mut()
            .add_member(self.handle(), node.handle())?;
        Ok(())
    }

    /// Create a vertex and add it as a member in one step.
    pub fn create_node(
        &self,
        type_name: &str,
        name: Option<&str>,
        parent: Option<&Node>,
    ) -> Result<Node> {
        let node = Node::create(self.scene(), type_name, name, parent)?;
        self.add_node(&node)?;
        Ok(node)
    }

    /// The live member selection, re-derived from the host on every
    /// access so it reflects external mutation.
    pub fn nodes(&self) -> Graph {
        let members = self.scene().borrow().members(self.handle());
        let mut out = Graph::new();
        for member in members {
            out.add(Node::wrap(self.scene(), member));
        }
        out
    }

    // --- published interface --------------------------------------------

    /// Generic published nodes, name to handle, in publish order.
    pub fn published_nodes(&self) -> IndexMap<String, Node> {
        self.published_partition(PublishRole::Generic)
    }

    /// Published parent-anchor nodes.
    pub fn published_parent_anchor(&self) -> IndexMap<String, Node> {
        self.published_partition(PublishRole::ParentAnchor)
    }

    /// Published child-anchor nodes.
    pub fn published_child_anchor(&self) -> IndexMap<String, Node> {
        self.published_partition(PublishRole::ChildAnchor)
    }

    /// Published plugs, name to handle, in publish order.
    pub fn published_plugs(&self) -> IndexMap<String, Plug> {
        self.scene()
            .borrow()
            .published_plugs(self.handle())
            .into_iter()
            .map(|(name, handle)| (name, Plug::wrap(self.scene(), handle)))
            .collect()
    }

    /// Publish a node under a stable name in one role partition.
    ///
    /// Name collisions across partitions are permitted; callers must
    /// know which partition they expect.
    pub fn publish_node(&self, name: &str, node: &Node, role: PublishRole) -> Result<()> {
        self.scene()
            .borrow_mut()
            .publish_node(self.handle(), name, node.handle(), role)?;
        Ok(())
    }

    /// Publish a plug under a stable name.
    pub fn publish_plug(&self, name: &str, plug: &Plug) -> Result<()> {
        let handle = plug.handle().ok_or(RigError::NullPlug)?;
        self.scene()
            .borrow_mut()
            .publish_plug(self.handle(), name, handle)?;
        Ok(())
    }

    fn published_partition(&self, role: PublishRole) -> IndexMap<String, Node> {
        self.scene()
            .borrow()
            .published_nodes(self.handle(), role)
            .into_iter()
            .map(|(name, handle)| (name, Node::wrap(self.scene(), handle)))
            .collect()
    }

    // --- root transform -------------------------------------------------

    /// The designated structural anchor, if any.
    pub fn root_transform(&self) -> Option<Node> {
        let handle = self.scene().borrow().root_transform_of(self.handle())?;
        Some(Node::wrap(self.scene(), handle))
    }

    /// Designate or clear the structural anchor.
    ///
    /// Clearing when no anchor is set is a no-op. The anchor must
    /// already be a member; a non-member fails with
    /// [`RigError::NotAMember`] and the existing anchor is untouched.
    pub fn set_root_transform(&self, node: Option<&Node>) -> Result<()> {
        match node {
            None => {
                if self.root_transform().is_none() {
                    return Ok(());
                }
                self.scene()
                    .borrow_mut()
                    .set_root_transform_of(self.handle(), None)?;
                Ok(())
            }
            Some(node) => {
                if !self.nodes().contains_node(node) {
                    return Err(RigError::NotAMember {
                        node: node.name().unwrap_or_default(),
                        container: self.name().unwrap_or_default(),
                    });
                }
                self.scene()
                    .borrow_mut()
                    .set_root_transform_of(self.handle(), Some(node.handle()))?;
                Ok(())
            }
        }
    }

    // --- container tree -------------------------------------------------

    /// The container this container is a member of, if any.
    ///
    /// This is the container *tree*, not the member graph: a container
    /// has at most one parent container.
    pub fn parent(&self) -> Option<Container> {
        let handle = self.scene().borrow().member_container(self.handle())?;
        Some(Container {
            node: Node::wrap(self.scene(), handle),
        })
    }

    /// Member containers of this container.
    pub fn children(&self) -> Vec<Container> {
        self.scene()
            .borrow()
            .subcontainers(self.handle())
            .into_iter()
            .map(|handle| Container {
                node: Node::wrap(self.scene(), handle),
            })
            .collect()
    }

    // --- current container ----------------------------------------------

    /// Whether this is the container new vertices are created into.
    pub fn is_current(&self) -> bool {
        self.scene().borrow().current_container() == Some(self.handle())
    }

    /// Make this container current (or clear it, when `current` is off
    /// and this container holds the toggle).
    pub fn make_current(&self, current: bool) -> Result<()> {
        let mut scene = self.scene().borrow_mut();
        if current {
            scene.set_current_container(Some(self.handle()))?;
        } else if scene.current_container() == Some(self.handle()) {
            scene.set_current_container(None)?;
        }
        Ok(())
    }

    /// Make this container current for a scope.
    ///
    /// The returned guard restores the previously current container
    /// when dropped, so vertex creation inside the scope lands in this
    /// container's membership.
    pub fn as_current(&self) -> Result<CurrentGuard> {
        let previous = self.scene().borrow().current_container();
        self.scene()
            .borrow_mut()
            .set_current_container(Some(self.handle()))?;
        Ok(CurrentGuard {
            scene: self.scene().clone(),
            previous,
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Container").field(&self.node.to_string()).finish()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

/// Scope guard restoring the previously current container on drop.
pub struct CurrentGuard {
    scene: SceneRef,
    previous: Option<VertexHandle>,
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        if let Err(err) = self
            .scene
            .borrow_mut()
            .set_current_container(self.previous)
        {
            tracing::warn!("failed to restore current container: {}", err);
        }
    }
}
