// SPDX-License-Identifier: MIT OR Apache-2.0
//! Variadic plug assignment: matrix recognition, compound and array
//! distribution, scalar typing and the null plug sentinel.

mod common;

use common::{scene, transform};
use riggraph_core::{AttrRequest, AttrType, AttrValue, Node, RigError, Value};

fn numbers(range: std::ops::Range<i64>) -> Vec<Value> {
    range.map(Value::Int).collect()
}

#[test]
fn test_sixteen_numbers_assign_as_matrix() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    t.set("offsetParentMatrix", &numbers(0..16)).unwrap();

    let Some(AttrValue::Matrix(m)) = t.plug("offsetParentMatrix").value().unwrap() else {
        panic!("expected a matrix value");
    };
    assert_eq!(m[0][0], 0.0);
    assert_eq!(m[1][0], 4.0);
    assert_eq!(m[3][3], 15.0);
}

#[test]
fn test_sixteen_numbers_beat_distribution_on_array_plugs() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    // worldMatrix is array-typed, but sixteen numerics are still one
    // matrix for the plug itself, not sixteen element writes.
    t.plug("worldMatrix").set(&numbers(0..16)).unwrap();

    let Some(AttrValue::Matrix(m)) = t.plug("worldMatrix").value().unwrap() else {
        panic!("expected a matrix on the array plug itself");
    };
    assert_eq!(m[2][3], 11.0);
    // No element was touched on the way.
    assert!(t.plug("worldMatrix").child(0usize).value().unwrap().is_none());
}

#[test]
fn test_compound_distribution_across_children() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    t.set("translate", &[1.0.into(), 2.0.into(), 3.0.into()]).unwrap();

    assert_eq!(
        t.plug("translateX").value().unwrap(),
        Some(AttrValue::Float(1.0))
    );
    assert_eq!(
        t.plug("translate").child("translateY").value().unwrap(),
        Some(AttrValue::Float(2.0))
    );
    assert_eq!(
        t.plug("translate").child(2usize).value().unwrap(),
        Some(AttrValue::Float(3.0))
    );
}

#[test]
fn test_array_distribution_recurses_through_sequences() {
    let scene = scene();
    let mult = Node::create(&scene, "multMatrix", Some("mult"), None).unwrap();

    let first: Value = numbers(0..16).into();
    let second: Value = numbers(16..32).into();
    mult.set("matrixIn", &[first, second]).unwrap();

    let Some(AttrValue::Matrix(m0)) = mult.plug("matrixIn").child(0usize).value().unwrap() else {
        panic!("expected matrix in element 0");
    };
    let Some(AttrValue::Matrix(m1)) = mult.plug("matrixIn").child(1usize).value().unwrap() else {
        panic!("expected matrix in element 1");
    };
    assert_eq!(m0[0][0], 0.0);
    assert_eq!(m1[0][0], 16.0);
}

#[test]
fn test_scalar_assignment_by_dynamic_type() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    t.set("visibility", &[false.into()]).unwrap();
    assert_eq!(
        t.plug("visibility").value().unwrap(),
        Some(AttrValue::Bool(false))
    );

    // Integers widen onto float slots.
    t.set("translateX", &[5.into()]).unwrap();
    assert_eq!(
        t.plug("translateX").value().unwrap(),
        Some(AttrValue::Float(5.0))
    );
}

#[test]
fn test_scalar_type_mismatch_is_a_host_rejection() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let err = t.set("visibility", &["yes".into()]).unwrap_err();
    assert!(matches!(err, RigError::Host(_)));
    assert!(t.plug("visibility").value().unwrap().is_none());
}

#[test]
fn test_multiple_values_on_scalar_plug_fail() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let err = t.set("translateX", &[1.0.into(), 2.0.into()]).unwrap_err();
    assert!(matches!(err, RigError::Host(_)));
}

#[test]
fn test_child_lookup_by_long_short_and_position() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let translate = t.plug("translate");
    assert!(translate.is_compound());
    assert_eq!(translate.child("translateY"), t.plug("translateY"));
    assert_eq!(translate.child("ty"), t.plug("translateY"));
    assert_eq!(translate.child(1usize), t.plug("translateY"));

    // Short names resolve at the node level too.
    assert_eq!(t.plug("t"), translate);
}

#[test]
fn test_array_elements_are_sparse_with_logical_indices() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let wm = t.plug("worldMatrix");
    assert!(wm.is_array());

    let seventh = wm.child(7usize);
    assert!(!seventh.is_null());
    assert_eq!(seventh.logical_index(), Some(7));
    // Re-indexing yields the same element, not a new one.
    assert_eq!(wm.child(7usize), seventh);
}

#[test]
fn test_indexing_misses_yield_null_and_chain() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let missing = t.plug("noSuchAttr");
    assert!(missing.is_null());
    // The null plug indexes to itself, so deep lookups never panic.
    assert!(missing.child("x").is_null());
    assert!(missing.child(0usize).is_null());

    // Scalars have no children, by name or position.
    assert!(t.plug("translateX").child("x").is_null());
    assert!(t.plug("translateX").child(0usize).is_null());
    // Name lookup into an array is a miss too.
    assert!(t.plug("worldMatrix").child("first").is_null());
}

#[test]
fn test_null_plug_operations_fail_cleanly() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();
    let missing = t.plug("noSuchAttr");

    assert!(matches!(missing.set(&[1.into()]), Err(RigError::NullPlug)));
    assert!(matches!(missing.value(), Err(RigError::NullPlug)));
    assert!(matches!(missing.name(), Err(RigError::NullPlug)));
    assert!(missing.source().is_none());
    assert!(missing.destinations().is_empty());
}

#[test]
fn test_add_attr_creates_a_settable_plug() {
    let scene = scene();
    let t = transform(&scene, "t").unwrap();

    let space = t
        .add_attr(&AttrRequest::new("space", "spc", AttrType::Int))
        .unwrap();
    space.set(&[2.into()]).unwrap();
    assert_eq!(space.value().unwrap(), Some(AttrValue::Int(2)));
    assert_eq!(t.plug("space"), space);
    assert_eq!(t.plug("spc"), space);

    // Re-adding under either name is a host rejection.
    let err = t
        .add_attr(&AttrRequest::new("space", "sp2", AttrType::Int))
        .unwrap_err();
    assert!(matches!(err, RigError::Host(_)));
}

#[test]
fn test_string_scalar_round_trip() {
    let scene = scene();
    let meta = Node::create(&scene, "container", Some("meta"), None).unwrap();

    meta.set("containerType", &["rig".into()]).unwrap();
    assert_eq!(
        meta.plug("containerType").value().unwrap(),
        Some(AttrValue::String("rig".to_owned()))
    );
}
