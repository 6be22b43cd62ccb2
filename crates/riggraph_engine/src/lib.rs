// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory reference host engine for the riggraph handle layer.
//!
//! Implements [`riggraph_core::HostScene`] over plain `IndexMap`
//! storage: vertices with typed attribute slots, directed plug
//! connections (a destination holds at most one source), a structural
//! hierarchy, containers with published interfaces, and the bulk
//! selection queries.
//!
//! The engine is single-threaded and synchronous; every mutation
//! either applies fully or returns a rejection with nothing changed.

pub mod query;
pub mod registry;
pub mod scene;

pub use registry::{AttrKind, AttrSpec, TypeRegistry, VertexType};
pub use scene::Scene;
