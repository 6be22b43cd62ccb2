// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handle layer over an externally-hosted dependency graph.
//!
//! This crate wraps opaque references into a host scene graph with four
//! cooperating abstractions:
//! - [`Node`] - a reference to one graph vertex
//! - [`Plug`] - a reference to one attribute slot, with compound/array
//!   indexing and directed connect/disconnect
//! - [`Graph`] - an ordered, deduplicated selection of node/plug
//!   references with set algebra and hierarchy derivation
//! - [`Container`] - a node that bounds a sub-graph of members and
//!   exposes a published interface
//!
//! ## Architecture
//!
//! The host engine owns the actual graph storage and type system; this
//! layer only talks to it through the [`HostScene`] trait. Everything
//! here is a live view: names, hierarchy and membership are re-derived
//! from the host on every access, never cached.
//!
//! The layer is single-threaded by contract, matching the host engines
//! it wraps; handles share the scene through `Rc<RefCell<..>>`.

pub mod container;
pub mod error;
pub mod graph;
pub mod host;
pub mod node;
pub mod plug;
pub mod value;

pub use container::{Container, CurrentGuard};
pub use error::{Result, RigError};
pub use graph::{Graph, SceneItem};
pub use host::{
    AttrRequest, AttrType, AttrValue, HostError, HostScene, LsFilter, PlugHandle, PublishRole,
    RelativesFilter, SceneRef, VertexHandle,
};
pub use node::Node;
pub use plug::{Plug, PlugIndex};
pub use value::Value;
