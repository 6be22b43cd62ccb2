// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection sets: ordered, deduplicated collections of node and plug
//! references, with set algebra and hierarchy derivation.
//!
//! A [`Graph`] is a *selection*, not graph storage: it is built from
//! explicit adds or host queries, and every derivation is scoped
//! strictly to its own membership, never the full host graph.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{Result, RigError};
use crate::host::{LsFilter, PlugHandle, RelativesFilter, SceneRef, VertexHandle};
use crate::node::Node;
use crate::plug::Plug;

/// One member of a selection: a node or a plug reference.
///
/// The variant is fixed at insertion time; use sites pattern-match
/// instead of probing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneItem {
    /// A vertex reference
    Node(Node),
    /// An attribute slot reference
    Plug(Plug),
}

impl SceneItem {
    /// The node, when this member is one.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            Self::Plug(_) => None,
        }
    }

    /// The plug, when this member is one.
    pub fn as_plug(&self) -> Option<&Plug> {
        match self {
            Self::Plug(p) => Some(p),
            Self::Node(_) => None,
        }
    }

    fn key(&self) -> Option<ItemKey> {
        match self {
            Self::Node(n) => Some(ItemKey::Vertex(n.handle())),
            Self::Plug(p) => p.handle().map(ItemKey::Plug),
        }
    }
}

impl From<Node> for SceneItem {
    fn from(n: Node) -> Self {
        Self::Node(n)
    }
}

impl From<Plug> for SceneItem {
    fn from(p: Plug) -> Self {
        Self::Plug(p)
    }
}

impl fmt::Display for SceneItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => n.fmt(f),
            Self::Plug(p) => p.fmt(f),
        }
    }
}

/// Membership key: the underlying host handle, never wrapper identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ItemKey {
    Vertex(VertexHandle),
    Plug(PlugHandle),
}

/// An ordered, deduplicated selection of node/plug references.
///
/// Iteration order is insertion order (host ordering for query-built
/// selections). Adding a member already present is a no-op. Equality
/// is set equality over the underlying handles; order is presentation
/// only.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    items: IndexMap<ItemKey, SceneItem>,
}

impl Graph {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, deduplicating by underlying handle.
    ///
    /// Returns whether the selection changed. Null plugs are not
    /// members and are ignored.
    pub fn add(&mut self, item: impl Into<SceneItem>) -> bool {
        let item = item.into();
        let Some(key) = item.key() else {
            return false;
        };
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, item);
        true
    }

    /// In-place accumulation of another selection's members.
    pub fn extend(&mut self, other: &Graph) {
        for item in other.iter() {
            self.add(item.clone());
        }
    }

    /// Whether the selection contains this member, by underlying handle.
    pub fn contains(&self, item: &SceneItem) -> bool {
        item.key().is_some_and(|k| self.items.contains_key(&k))
    }

    /// Whether the selection contains this node.
    pub fn contains_node(&self, node: &Node) -> bool {
        self.items.contains_key(&ItemKey::Vertex(node.handle()))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Random access into the ordered selection.
    pub fn get(&self, index: usize) -> Option<&SceneItem> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    /// Iterate members in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneItem> {
        self.items.values()
    }

    /// Iterate only the node members, in selection order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter_map(SceneItem::as_node)
    }

    // --- set algebra ----------------------------------------------------

    /// Members of `self` followed by members of `other` not already
    /// present. Operands are untouched.
    pub fn union(&self, other: &Graph) -> Graph {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    /// Members present in both selections, in `self` order.
    pub fn intersection(&self, other: &Graph) -> Graph {
        let mut out = Graph::new();
        for item in self.iter() {
            if other.contains(item) {
                out.add(item.clone());
            }
        }
        out
    }

    /// Members of `self` not present in `other`.
    pub fn difference(&self, other: &Graph) -> Graph {
        let mut out = Graph::new();
        for item in self.iter() {
            if !other.contains(item) {
                out.add(item.clone());
            }
        }
        out
    }

    /// Members present in exactly one of the two selections.
    pub fn symmetric_difference(&self, other: &Graph) -> Graph {
        let mut out = self.difference(other);
        out.extend(&other.difference(self));
        out
    }

    // --- host queries ---------------------------------------------------

    /// Build a selection from the host's bulk list query.
    ///
    /// An empty result is an empty selection, never an error.
    pub fn ls(scene: &SceneRef, filter: &LsFilter) -> Graph {
        let handles = scene.borrow().ls(filter);
        Self::from_vertices(scene, handles)
    }

    /// Build a selection from a vertex's upstream construction history.
    pub fn list_history(scene: &SceneRef, node: &Node) -> Graph {
        let handles = scene.borrow().list_history(node.handle());
        Self::from_vertices(scene, handles)
    }

    /// Build a selection from a vertex's structural relatives.
    pub fn list_relatives(scene: &SceneRef, node: &Node, filter: &RelativesFilter) -> Graph {
        let handles = scene.borrow().list_relatives(node.handle(), filter);
        Self::from_vertices(scene, handles)
    }

    fn from_vertices(scene: &SceneRef, handles: Vec<VertexHandle>) -> Graph {
        let mut out = Graph::new();
        for handle in handles {
            out.add(Node::wrap(scene, handle));
        }
        out
    }

    // --- hierarchy derivation -------------------------------------------

    /// Members that are not structural descendants of any other member.
    ///
    /// Members without hierarchy capability (plugs, non-hierarchical
    /// vertices) are skipped when `safe` is on, and fail with
    /// [`RigError::NotHierarchical`] when it is off. A hierarchical
    /// member that simply has no parents is a valid root, never an
    /// error.
    pub fn dag_roots(&self, safe: bool) -> Result<Graph> {
        let mut out = Graph::new();
        for item in self.iter() {
            let node = match self.hierarchical_member(item, safe)? {
                Some(node) => node,
                None => continue,
            };
            let scene = node.scene().borrow();
            let mut is_root = true;
            for other in self.nodes() {
                if other == node {
                    continue;
                }
                if scene.is_ancestor_of(other.handle(), node.handle()) {
                    is_root = false;
                    break;
                }
            }
            drop(scene);
            if is_root {
                out.add(node.clone());
            }
        }
        Ok(out)
    }

    /// Members (excluding `node`) that are structural descendants of
    /// `node`, at any depth. A non-hierarchical `node` yields an empty
    /// selection.
    pub fn children_of(&self, node: &Node) -> Graph {
        self.reachable(node, Direction::Down)
    }

    /// Members (excluding `node`) that are structural ancestors of
    /// `node`, at any depth.
    pub fn parents_of(&self, node: &Node) -> Graph {
        self.reachable(node, Direction::Up)
    }

    /// The immediate descendant frontier: descendants of `node` in this
    /// selection that are not reachable only through another member of
    /// that same descendant set.
    pub fn direct_children_of(&self, node: &Node) -> Graph {
        self.direct_frontier(node, Direction::Down)
    }

    /// The nearest ancestor of `node` within this selection, if any.
    ///
    /// Symmetric to [`Graph::direct_children_of`] but upward; the
    /// reduction yields at most a handful of candidates and the first
    /// in selection order is returned.
    pub fn direct_parent_of(&self, node: &Node) -> Option<Node> {
        self.direct_frontier(node, Direction::Up)
            .nodes()
            .next()
            .cloned()
    }

    /// Full reachable set in one direction, scoped to the selection.
    /// Self-membership is stripped before any ancestry test so a member
    /// never matches as its own ancestor or descendant.
    fn reachable(&self, node: &Node, direction: Direction) -> Graph {
        let mut out = Graph::new();
        if !node.is_hierarchical() {
            return out;
        }
        let scene = node.scene().borrow();
        for member in self.nodes() {
            if member == node {
                continue;
            }
            let related = match direction {
                Direction::Down => scene.is_ancestor_of(node.handle(), member.handle()),
                Direction::Up => scene.is_ancestor_of(member.handle(), node.handle()),
            };
            if related {
                out.add(member.clone());
            }
        }
        drop(scene);
        out
    }

    /// Transitive reduction, shared by both directions: compute the
    /// full reachable set, then subtract the union of each member's
    /// own reachable set within it.
    fn direct_frontier(&self, node: &Node, direction: Direction) -> Graph {
        let full = self.reachable(node, direction);
        let mut transitive = Graph::new();
        for member in full.nodes() {
            transitive.extend(&full.reachable(member, direction));
        }
        full.difference(&transitive)
    }

    fn hierarchical_member<'a>(&self, item: &'a SceneItem, safe: bool) -> Result<Option<&'a Node>> {
        if let SceneItem::Node(node) = item {
            if node.is_hierarchical() {
                return Ok(Some(node));
            }
        }
        if safe {
            Ok(None)
        } else {
            Err(RigError::NotHierarchical {
                what: item.to_string(),
            })
        }
    }
}

/// Direction of a hierarchy derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Down,
    Up,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl Eq for Graph {}

impl FromIterator<SceneItem> for Graph {
    fn from_iter<T: IntoIterator<Item = SceneItem>>(iter: T) -> Self {
        let mut out = Graph::new();
        for item in iter {
            out.add(item);
        }
        out
    }
}
