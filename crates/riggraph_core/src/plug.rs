// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plug handles: references to one attribute slot of one vertex.
//!
//! A plug may be scalar, compound (named sub-slots) or array (indexed
//! sub-slots). Indexing never fails: a miss yields the null plug
//! sentinel, which can itself be indexed and tested, so lookups chain
//! without panics.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Shl, Shr};

use crate::error::{Result, RigError};
use crate::host::{AttrValue, HostError, PlugHandle, SceneRef};
use crate::node::Node;
use crate::value::Value;

/// Key used to index into a compound or array plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugIndex<'a> {
    /// Compound child by long or short name
    Name(&'a str),
    /// Compound child by position, or array element by logical index
    Position(usize),
}

impl<'a> From<&'a str> for PlugIndex<'a> {
    fn from(v: &'a str) -> Self {
        Self::Name(v)
    }
}

impl From<usize> for PlugIndex<'_> {
    fn from(v: usize) -> Self {
        Self::Position(v)
    }
}

impl From<u32> for PlugIndex<'_> {
    fn from(v: u32) -> Self {
        Self::Position(v as usize)
    }
}

/// A reference to one attribute slot of one vertex.
///
/// Two plugs over the same underlying slot compare and hash equal.
/// The null plug (see [`Plug::is_null`]) is the sentinel returned by
/// indexing misses; every operation on it other than further indexing
/// fails with [`RigError::NullPlug`].
#[derive(Clone)]
pub struct Plug {
    scene: SceneRef,
    slot: Option<PlugHandle>,
}

impl Plug {
    /// Wrap a host plug handle.
    pub fn wrap(scene: &SceneRef, handle: PlugHandle) -> Self {
        Self {
            scene: scene.clone(),
            slot: Some(handle),
        }
    }

    /// The null plug sentinel.
    pub fn null(scene: &SceneRef) -> Self {
        Self {
            scene: scene.clone(),
            slot: None,
        }
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        self.slot.is_none()
    }

    /// The underlying host handle, unless null.
    pub fn handle(&self) -> Option<PlugHandle> {
        self.slot
    }

    /// The scene this plug belongs to.
    pub fn scene(&self) -> &SceneRef {
        &self.scene
    }

    fn require(&self) -> Result<PlugHandle> {
        self.slot.ok_or(RigError::NullPlug)
    }

    /// Qualified `node.attr..` display name.
    pub fn name(&self) -> Result<String> {
        let handle = self.require()?;
        Ok(self.scene.borrow().plug_name(handle)?)
    }

    /// The vertex owning this plug.
    pub fn node(&self) -> Result<Node> {
        let handle = self.require()?;
        let vertex = self.scene.borrow().plug_vertex(handle)?;
        Ok(Node::wrap(&self.scene, vertex))
    }

    /// Whether the plug is a compound of named sub-slots.
    pub fn is_compound(&self) -> bool {
        self.slot
            .is_some_and(|h| self.scene.borrow().plug_is_compound(h))
    }

    /// Whether the plug is an array of indexed sub-slots.
    pub fn is_array(&self) -> bool {
        self.slot
            .is_some_and(|h| self.scene.borrow().plug_is_array(h))
    }

    /// Logical index, when this plug is an array element.
    pub fn logical_index(&self) -> Option<u32> {
        let handle = self.slot?;
        self.scene.borrow().plug_logical_index(handle)
    }

    /// Resolve a compound child or array element.
    ///
    /// Compound plugs resolve names against long then short child
    /// names, and positions against child order. Array plugs resolve
    /// positions as logical indices, creating the element on demand.
    /// Any other combination, including indexing the null plug, yields
    /// the null plug; this never fails.
    pub fn child<'k>(&self, key: impl Into<PlugIndex<'k>>) -> Plug {
        let Some(handle) = self.slot else {
            return Plug::null(&self.scene);
        };
        let key = key.into();

        let (compound, array) = {
            let scene = self.scene.borrow();
            (scene.plug_is_compound(handle), scene.plug_is_array(handle))
        };

        match key {
            PlugIndex::Name(name) if compound => {
                let scene = self.scene.borrow();
                for idx in 0..scene.plug_child_count(handle) {
                    if let Some((long, short)) = scene.plug_child_names(handle, idx) {
                        if name == long || name == short {
                            if let Some(child) = scene.plug_child_at(handle, idx) {
                                return Plug::wrap(&self.scene, child);
                            }
                        }
                    }
                }
                Plug::null(&self.scene)
            }
            PlugIndex::Position(idx) if compound => {
                match self.scene.borrow().plug_child_at(handle, idx) {
                    Some(child) => Plug::wrap(&self.scene, child),
                    None => Plug::null(&self.scene),
                }
            }
            PlugIndex::Position(idx) if array => {
                let element = self
                    .scene
                    .borrow_mut()
                    .plug_element(handle, idx as u32);
                match element {
                    Ok(e) => Plug::wrap(&self.scene, e),
                    Err(_) => Plug::null(&self.scene),
                }
            }
            _ => Plug::null(&self.scene),
        }
    }

    /// Connect this plug into `other`.
    ///
    /// A destination holds at most one incoming connection. When
    /// `other` is already driven and `force` is off, this fails with
    /// [`RigError::AlreadyConnected`] and the existing edge stays; with
    /// `force` on, the host replaces the edge atomically.
    pub fn connect(&self, other: &Plug, force: bool) -> Result<()> {
        let source = self.require()?;
        let dest = other.require()?;

        let occupied = self.scene.borrow().source_of(dest).is_some();
        if occupied && !force {
            return Err(RigError::AlreadyConnected {
                dest: other.name()?,
            });
        }

        self.scene.borrow_mut().connect(source, dest, force)?;
        tracing::debug!("connected {} -> {}", self.display_name(), other.display_name());
        Ok(())
    }

    /// Remove the edge from this plug into `other`.
    ///
    /// Removing an edge that does not exist is a silent no-op.
    pub fn disconnect(&self, other: &Plug) -> Result<()> {
        let source = self.require()?;
        let dest = other.require()?;
        self.scene.borrow_mut().disconnect(source, dest)?;
        tracing::debug!(
            "disconnected {} -> {}",
            self.display_name(),
            other.display_name()
        );
        Ok(())
    }

    /// Forward connect: this plug drives `other`, replacing any
    /// existing connection into `other`. Also spelled `self >> other`.
    pub fn drive(&self, other: &Plug) -> Result<()> {
        self.connect(other, true)
    }

    /// Backward connect: `other` drives this plug, replacing any
    /// existing connection into it. Also spelled `self << other`.
    pub fn driven_by(&self, other: &Plug) -> Result<()> {
        other.connect(self, true)
    }

    /// The single upstream plug connected into this one, if any.
    pub fn source(&self) -> Option<Plug> {
        let handle = self.slot?;
        let source = self.scene.borrow().source_of(handle)?;
        Some(Plug::wrap(&self.scene, source))
    }

    /// All downstream plugs this one is connected into.
    pub fn destinations(&self) -> Vec<Plug> {
        let Some(handle) = self.slot else {
            return Vec::new();
        };
        self.scene
            .borrow()
            .destinations_of(handle)
            .into_iter()
            .map(|d| Plug::wrap(&self.scene, d))
            .collect()
    }

    /// Variadic, type-dispatched assignment.
    ///
    /// Dispatch order, first match wins:
    /// 1. a sole plug reference connects that plug into this one
    ///    (forced), rather than assigning a value;
    /// 2. exactly 16 numeric values are a row-major 4x4 matrix, even
    ///    when this plug is array-typed;
    /// 3. a compound or array plug distributes the values positionally
    ///    across its children/elements, recursing through sequences;
    /// 4. a sole scalar assigns by its dynamic type.
    pub fn set(&self, args: &[Value]) -> Result<()> {
        let handle = self.require()?;

        if let [Value::Plug(upstream)] = args {
            return upstream.connect(self, true);
        }

        if let Some(matrix) = Value::matrix16(args) {
            self.scene
                .borrow_mut()
                .set_value(handle, AttrValue::Matrix(matrix))?;
            return Ok(());
        }

        if self.is_compound() || self.is_array() {
            for (idx, arg) in args.iter().enumerate() {
                let child = self.child(idx);
                match arg {
                    Value::Seq(inner) => child.set(inner)?,
                    other => child.set(std::slice::from_ref(other))?,
                }
            }
            return Ok(());
        }

        match args {
            [single] => {
                let value = single.to_attr_value().ok_or_else(|| {
                    HostError::new(format!(
                        "cannot assign {single:?} to scalar plug {}",
                        self.display_name()
                    ))
                })?;
                self.scene.borrow_mut().set_value(handle, value)?;
                Ok(())
            }
            _ => Err(RigError::Host(HostError::new(format!(
                "scalar plug {} given {} values",
                self.display_name(),
                args.len()
            )))),
        }
    }

    /// Current value of the plug, if one has been assigned.
    pub fn value(&self) -> Result<Option<AttrValue>> {
        let handle = self.require()?;
        Ok(self.scene.borrow().value(handle)?)
    }

    fn display_name(&self) -> String {
        match self.slot {
            Some(handle) => self
                .scene
                .borrow()
                .plug_name(handle)
                .unwrap_or_else(|_| format!("<plug {:?}>", handle.0)),
            None => "<null plug>".to_owned(),
        }
    }
}

impl PartialEq for Plug {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl Eq for Plug {}

impl Hash for Plug {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl fmt::Debug for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Plug").field(&self.display_name()).finish()
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl Shr for &Plug {
    type Output = Result<()>;

    fn shr(self, rhs: &Plug) -> Self::Output {
        self.drive(rhs)
    }
}

impl Shl for &Plug {
    type Output = Result<()>;

    fn shl(self, rhs: &Plug) -> Self::Output {
        self.driven_by(rhs)
    }
}
