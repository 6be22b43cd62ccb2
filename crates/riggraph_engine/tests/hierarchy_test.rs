// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hierarchy derivation scoped to a selection: DAG roots, ancestor and
//! descendant sets, and the direct (transitively reduced) frontiers.

mod common;

use common::{scene, transform, transform_under};
use riggraph_core::{Graph, Node, RigError, SceneRef};

/// root -> d1 -> d2 chain plus the selection holding all three.
fn chain(scene: &SceneRef) -> (Node, Node, Node, Graph) {
    let root = transform(scene, "root").unwrap();
    let d1 = transform_under(scene, "d1", &root).unwrap();
    let d2 = transform_under(scene, "d2", &d1).unwrap();
    let mut selection = Graph::new();
    selection.add(root.clone());
    selection.add(d1.clone());
    selection.add(d2.clone());
    (root, d1, d2, selection)
}

#[test]
fn test_dag_roots_of_chain_is_the_root_alone() {
    let scene = scene();
    let (root, _, _, selection) = chain(&scene);

    let roots = selection.dag_roots(true).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots.contains_node(&root));
}

#[test]
fn test_dag_roots_is_order_independent() {
    let scene = scene();
    let (root, d1, d2, _) = chain(&scene);

    // Deepest first: the ancestor test must look at the whole
    // selection, not just members seen so far.
    let mut selection = Graph::new();
    selection.add(d2);
    selection.add(d1);
    selection.add(root.clone());

    let roots = selection.dag_roots(true).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots.contains_node(&root));
}

#[test]
fn test_dag_roots_with_parentless_siblings() {
    let scene = scene();
    let a = transform(&scene, "a").unwrap();
    let b = transform(&scene, "b").unwrap();
    let a_child = transform_under(&scene, "a_child", &a).unwrap();

    let mut selection = Graph::new();
    selection.add(a.clone());
    selection.add(b.clone());
    selection.add(a_child);

    let roots = selection.dag_roots(true).unwrap();
    assert_eq!(roots.len(), 2);
    assert!(roots.contains_node(&a));
    assert!(roots.contains_node(&b));
}

#[test]
fn test_dag_roots_safe_flag_on_non_hierarchical_members() {
    let scene = scene();
    let (root, _, _, mut selection) = chain(&scene);
    let mult = Node::create(&scene, "multMatrix", Some("mult"), None).unwrap();
    selection.add(mult);

    // Safe mode skips the capability-less member.
    let roots = selection.dag_roots(true).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots.contains_node(&root));

    // Strict mode rejects it.
    let err = selection.dag_roots(false).unwrap_err();
    assert!(matches!(err, RigError::NotHierarchical { .. }));
}

#[test]
fn test_children_and_parents_of_scope_to_selection() {
    let scene = scene();
    let (root, d1, d2, selection) = chain(&scene);

    let children = selection.children_of(&root);
    assert_eq!(children.len(), 2);
    assert!(children.contains_node(&d1));
    assert!(children.contains_node(&d2));

    let parents = selection.parents_of(&d2);
    assert_eq!(parents.len(), 2);
    assert!(parents.contains_node(&root));
    assert!(parents.contains_node(&d1));

    // Descendants outside the selection are invisible to it.
    let mut partial = Graph::new();
    partial.add(root.clone());
    partial.add(d2.clone());
    let children = partial.children_of(&root);
    assert_eq!(children.len(), 1);
    assert!(children.contains_node(&d2));
}

#[test]
fn test_children_of_non_hierarchical_node_is_empty() {
    let scene = scene();
    let (_, _, _, selection) = chain(&scene);
    let mult = Node::create(&scene, "mult", None, None);
    // Unknown type is a host rejection at creation.
    assert!(mult.is_err());

    let mult = Node::create(&scene, "multMatrix", Some("mult"), None).unwrap();
    assert!(selection.children_of(&mult).is_empty());
    assert!(selection.parents_of(&mult).is_empty());
}

#[test]
fn test_direct_children_collapse_to_immediate_frontier() {
    let scene = scene();
    let (root, d1, d2, selection) = chain(&scene);

    // d2 is reachable only through d1, so the direct frontier is d1.
    let direct = selection.direct_children_of(&root);
    assert_eq!(direct.len(), 1);
    assert!(direct.contains_node(&d1));

    // Without d1 in the selection, d2 becomes direct.
    let mut partial = Graph::new();
    partial.add(root.clone());
    partial.add(d2.clone());
    let direct = partial.direct_children_of(&root);
    assert_eq!(direct.len(), 1);
    assert!(direct.contains_node(&d2));
}

#[test]
fn test_direct_parent_is_nearest_ancestor_in_selection() {
    let scene = scene();
    let (root, d1, d2, selection) = chain(&scene);

    assert_eq!(selection.direct_parent_of(&d2), Some(d1.clone()));
    assert_eq!(selection.direct_parent_of(&d1), Some(root.clone()));
    assert_eq!(selection.direct_parent_of(&root), None);

    // With the middle ancestor absent, the root is nearest.
    let mut partial = Graph::new();
    partial.add(root.clone());
    partial.add(d2.clone());
    assert_eq!(partial.direct_parent_of(&d2), Some(root));
}

#[test]
fn test_node_parents_and_children_accessors() {
    let scene = scene();
    let (root, d1, d2, _) = chain(&scene);

    assert!(root.parents().is_empty());
    assert_eq!(root.children(), vec![d1.clone()]);
    assert_eq!(d1.parents(), vec![root]);
    assert_eq!(d2.parents(), vec![d1]);
}
