// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared helpers for the integration tests.

use riggraph_core::{Node, Result, SceneRef};
use riggraph_engine::Scene;

/// Fresh shared scene with the built-in vertex types, with tracing
/// wired to the environment filter for debugging test runs.
pub fn scene() -> SceneRef {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Scene::new().shared()
}

/// A free-standing transform with the given name.
pub fn transform(scene: &SceneRef, name: &str) -> Result<Node> {
    Node::create(scene, "transform", Some(name), None)
}

/// A transform parented under `parent`.
pub fn transform_under(scene: &SceneRef, name: &str, parent: &Node) -> Result<Node> {
    Node::create(scene, "transform", Some(name), Some(parent))
}
