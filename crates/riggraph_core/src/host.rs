// SPDX-License-Identifier: MIT OR Apache-2.0
//! The boundary with the host graph engine.
//!
//! The host owns graph storage, the vertex type system and mutation
//! commits. This module defines the opaque handle types the host deals
//! in and the [`HostScene`] trait the rest of the crate calls through.
//! Any engine implementing the trait can sit behind the handle layer.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Shared reference to the host scene.
///
/// The layer is single-threaded by contract, so handles share the scene
/// through `Rc<RefCell<..>>` rather than any sync primitive.
pub type SceneRef = Rc<RefCell<dyn HostScene>>;

/// Opaque handle to one vertex in the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexHandle(pub Uuid);

impl VertexHandle {
    /// Create a new random vertex handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VertexHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to one attribute slot of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlugHandle(pub Uuid);

impl PlugHandle {
    /// Create a new random plug handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlugHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Scalar data type of an attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// 4x4 matrix value
    Matrix,
    /// Connection-only slot carrying no data
    Message,
}

/// Typed value stored in a scalar attribute slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
    /// Row-major 4x4 matrix
    Matrix([[f64; 4]; 4]),
}

impl AttrValue {
    /// The attribute type this value carries.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Self::Bool(_) => AttrType::Bool,
            Self::Int(_) => AttrType::Int,
            Self::Float(_) => AttrType::Float,
            Self::String(_) => AttrType::String,
            Self::Matrix(_) => AttrType::Matrix,
        }
    }
}

/// Request to add a dynamic attribute to a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrRequest {
    /// Long attribute name
    pub long_name: String,
    /// Short attribute name
    pub short_name: String,
    /// Scalar data type of the new slot
    pub attr_type: AttrType,
}

impl AttrRequest {
    /// Build a request for a scalar attribute.
    pub fn new(
        long_name: impl Into<String>,
        short_name: impl Into<String>,
        attr_type: AttrType,
    ) -> Self {
        Self {
            long_name: long_name.into(),
            short_name: short_name.into(),
            attr_type,
        }
    }
}

/// Role partition of a container's published interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishRole {
    /// Generic published node
    Generic,
    /// Parent-anchor node
    ParentAnchor,
    /// Child-anchor node
    ChildAnchor,
}

/// Filter for the bulk `ls` query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsFilter {
    /// Display-name pattern; `*` matches any run of characters
    pub pattern: Option<String>,
    /// Restrict to vertices of this type
    pub vertex_type: Option<String>,
}

impl LsFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match display names against a wildcard pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            vertex_type: None,
        }
    }

    /// Match vertices of one type.
    pub fn of_type(vertex_type: impl Into<String>) -> Self {
        Self {
            pattern: None,
            vertex_type: Some(vertex_type.into()),
        }
    }
}

/// Filter for the `list_relatives` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativesFilter {
    /// Include immediate structural children
    pub children: bool,
    /// Include immediate structural parents
    pub parents: bool,
    /// Include all structural descendants, any depth
    pub all_descendants: bool,
}

impl Default for RelativesFilter {
    fn default() -> Self {
        Self {
            children: true,
            parents: false,
            all_descendants: false,
        }
    }
}

/// Rejection reported by the host engine.
///
/// Opaque to this layer: the message is propagated unchanged and the
/// current operation is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("host rejected operation: {0}")]
pub struct HostError(pub String);

impl HostError {
    /// Build a rejection with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Operations the host graph engine must provide.
///
/// Every method is a synchronous round-trip; mutation methods are
/// expected to commit through the host's own transactional unit so that
/// a failure leaves no partial state. `connect` with `force` set must
/// perform the disconnect-existing-then-connect pair atomically.
pub trait HostScene {
    // --- vertices -------------------------------------------------------

    /// Create a vertex of the named type, optionally named and parented.
    ///
    /// The requested name is best effort; the host may disambiguate.
    fn create_vertex(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        parent: Option<VertexHandle>,
    ) -> Result<VertexHandle, HostError>;

    /// Resolve a display name to a vertex handle.
    fn lookup_vertex(&self, name: &str) -> Option<VertexHandle>;

    /// Whether the handle still refers to a live vertex.
    fn vertex_exists(&self, vertex: VertexHandle) -> bool;

    /// Type name of the vertex.
    fn vertex_type(&self, vertex: VertexHandle) -> Result<String, HostError>;

    /// Shortest unambiguous display name, or a qualified path when the
    /// short form is ambiguous.
    fn vertex_name(&self, vertex: VertexHandle) -> Result<String, HostError>;

    /// Rename the vertex, returning the name the host actually assigned.
    fn rename_vertex(&mut self, vertex: VertexHandle, name: &str) -> Result<String, HostError>;

    // --- hierarchy ------------------------------------------------------

    /// Whether the vertex participates in the structural hierarchy at all.
    fn is_hierarchical(&self, vertex: VertexHandle) -> bool;

    /// Number of immediate structural parents.
    fn parent_count(&self, vertex: VertexHandle) -> usize;

    /// Immediate structural parent at the given index.
    fn parent_at(&self, vertex: VertexHandle, index: usize) -> Option<VertexHandle>;

    /// Number of immediate structural children.
    fn child_count(&self, vertex: VertexHandle) -> usize;

    /// Immediate structural child at the given index.
    fn child_at(&self, vertex: VertexHandle, index: usize) -> Option<VertexHandle>;

    /// Whether `ancestor` is a structural ancestor of `vertex`, any depth.
    fn is_ancestor_of(&self, ancestor: VertexHandle, vertex: VertexHandle) -> bool;

    // --- plugs ----------------------------------------------------------

    /// Resolve an attribute name (long or short, nested included) on a
    /// vertex to a plug handle.
    fn find_plug(&self, vertex: VertexHandle, name: &str) -> Option<PlugHandle>;

    /// Add a dynamic scalar attribute to a vertex.
    fn add_attribute(
        &mut self,
        vertex: VertexHandle,
        request: &AttrRequest,
    ) -> Result<PlugHandle, HostError>;

    /// Vertex owning the plug.
    fn plug_vertex(&self, plug: PlugHandle) -> Result<VertexHandle, HostError>;

    /// Qualified `node.attr..` display name of the plug.
    fn plug_name(&self, plug: PlugHandle) -> Result<String, HostError>;

    /// Whether the plug is a compound of named sub-slots.
    fn plug_is_compound(&self, plug: PlugHandle) -> bool;

    /// Whether the plug is an array of indexed sub-slots.
    fn plug_is_array(&self, plug: PlugHandle) -> bool;

    /// Number of children of a compound plug.
    fn plug_child_count(&self, plug: PlugHandle) -> usize;

    /// Child of a compound plug at the given position.
    fn plug_child_at(&self, plug: PlugHandle, index: usize) -> Option<PlugHandle>;

    /// `(long, short)` names of a compound child at the given position.
    fn plug_child_names(&self, plug: PlugHandle, index: usize) -> Option<(String, String)>;

    /// Array element at the given logical index, created if necessary.
    fn plug_element(&mut self, plug: PlugHandle, logical_index: u32)
        -> Result<PlugHandle, HostError>;

    /// Logical index of an array element plug.
    fn plug_logical_index(&self, plug: PlugHandle) -> Option<u32>;

    // --- values ---------------------------------------------------------

    /// Assign a typed value to a scalar plug.
    fn set_value(&mut self, plug: PlugHandle, value: AttrValue) -> Result<(), HostError>;

    /// Current value of a scalar plug, if one has been assigned.
    fn value(&self, plug: PlugHandle) -> Result<Option<AttrValue>, HostError>;

    // --- connections ----------------------------------------------------

    /// Create the directed edge `source -> dest`.
    ///
    /// A destination holds at most one incoming edge. With `force` set,
    /// an existing incoming edge is disconnected first, atomically with
    /// the new connection; without it an occupied destination is a
    /// rejection.
    fn connect(
        &mut self,
        source: PlugHandle,
        dest: PlugHandle,
        force: bool,
    ) -> Result<(), HostError>;

    /// Remove the edge `source -> dest`; removing an absent edge is Ok.
    fn disconnect(&mut self, source: PlugHandle, dest: PlugHandle) -> Result<(), HostError>;

    /// The single upstream plug connected into `plug`, if any.
    fn source_of(&self, plug: PlugHandle) -> Option<PlugHandle>;

    /// All downstream plugs `plug` is connected into.
    fn destinations_of(&self, plug: PlugHandle) -> Vec<PlugHandle>;

    // --- containers -----------------------------------------------------

    /// Whether the vertex is of the container kind.
    fn is_container(&self, vertex: VertexHandle) -> bool;

    /// Add a vertex to a container's membership; idempotent.
    fn add_member(&mut self, container: VertexHandle, member: VertexHandle)
        -> Result<(), HostError>;

    /// Current members of a container, in membership order.
    fn members(&self, container: VertexHandle) -> Vec<VertexHandle>;

    /// The container a vertex is a member of, if any.
    fn member_container(&self, vertex: VertexHandle) -> Option<VertexHandle>;

    /// Members of a container that are themselves containers.
    fn subcontainers(&self, container: VertexHandle) -> Vec<VertexHandle>;

    /// Published `(name, vertex)` entries for one role partition.
    fn published_nodes(
        &self,
        container: VertexHandle,
        role: PublishRole,
    ) -> Vec<(String, VertexHandle)>;

    /// Published `(name, plug)` entries.
    fn published_plugs(&self, container: VertexHandle) -> Vec<(String, PlugHandle)>;

    /// Publish a vertex under a stable name in one role partition.
    fn publish_node(
        &mut self,
        container: VertexHandle,
        name: &str,
        vertex: VertexHandle,
        role: PublishRole,
    ) -> Result<(), HostError>;

    /// Publish a plug under a stable name.
    fn publish_plug(
        &mut self,
        container: VertexHandle,
        name: &str,
        plug: PlugHandle,
    ) -> Result<(), HostError>;

    /// The container's designated root-transform vertex, if any.
    fn root_transform_of(&self, container: VertexHandle) -> Option<VertexHandle>;

    /// Set or clear the container's root-transform vertex.
    fn set_root_transform_of(
        &mut self,
        container: VertexHandle,
        vertex: Option<VertexHandle>,
    ) -> Result<(), HostError>;

    /// The container new vertices are currently created into, if any.
    fn current_container(&self) -> Option<VertexHandle>;

    /// Set or clear the current container.
    fn set_current_container(&mut self, container: Option<VertexHandle>)
        -> Result<(), HostError>;

    // --- bulk queries ---------------------------------------------------

    /// List vertices matching the filter, in creation order.
    fn ls(&self, filter: &LsFilter) -> Vec<VertexHandle>;

    /// Upstream construction history of a vertex, the vertex itself first.
    fn list_history(&self, vertex: VertexHandle) -> Vec<VertexHandle>;

    /// Structural relatives of a vertex per the filter flags.
    fn list_relatives(&self, vertex: VertexHandle, filter: &RelativesFilter) -> Vec<VertexHandle>;
}
