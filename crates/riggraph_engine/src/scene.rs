// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene storage and the [`HostScene`] implementation.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use riggraph_core::{
    AttrRequest, AttrType, AttrValue, HostError, HostScene, LsFilter, PlugHandle, PublishRole,
    RelativesFilter, SceneRef, VertexHandle,
};

use crate::registry::{AttrKind, AttrSpec, TypeRegistry};

/// Shape of an instantiated attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum PlugShape {
    /// Single typed value slot
    Scalar(AttrType),
    /// Named sub-slots
    Compound,
    /// Indexed sub-slots
    Array,
}

/// One vertex in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VertexRecord {
    pub type_name: String,
    pub name: String,
    pub hierarchical: bool,
    pub parent: Option<VertexHandle>,
    pub children: Vec<VertexHandle>,
    pub root_plugs: Vec<PlugHandle>,
}

/// One instantiated attribute slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PlugRecord {
    pub vertex: VertexHandle,
    pub long_name: String,
    pub short_name: String,
    /// Attribute path under the vertex, e.g. `translate.translateX`
    /// or `matrixIn[2]`.
    pub path: String,
    pub shape: PlugShape,
    pub parent: Option<PlugHandle>,
    pub children: Vec<PlugHandle>,
    pub elements: IndexMap<u32, PlugHandle>,
    pub logical_index: Option<u32>,
    /// Element declaration, for array slots.
    pub element_spec: Option<AttrSpec>,
    pub value: Option<AttrValue>,
}

/// Published interface entry of a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PublishedEntry {
    pub name: String,
    pub target: PublishedTarget,
}

/// Target of a published interface entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum PublishedTarget {
    Node(VertexHandle, PublishRole),
    Plug(PlugHandle),
}

/// Container-specific state of a container vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ContainerRecord {
    pub members: IndexSet<VertexHandle>,
    pub published: Vec<PublishedEntry>,
    pub root_transform: Option<VertexHandle>,
}

/// The in-memory scene graph.
///
/// Storage is `IndexMap`-based so every listing (vertices, members,
/// published entries) keeps creation/insertion order, which is the
/// ordering contract the handle layer passes through to selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    registry: TypeRegistry,
    pub(crate) vertices: IndexMap<VertexHandle, VertexRecord>,
    pub(crate) plugs: IndexMap<PlugHandle, PlugRecord>,
    /// Incoming connection per destination; a destination holds at
    /// most one source.
    pub(crate) incoming: IndexMap<PlugHandle, PlugHandle>,
    pub(crate) containers: IndexMap<VertexHandle, ContainerRecord>,
    current: Option<VertexHandle>,
}

impl Scene {
    /// Create a scene with the built-in vertex types.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::with_builtins())
    }

    /// Create a scene with a custom type registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry,
            vertices: IndexMap::new(),
            plugs: IndexMap::new(),
            incoming: IndexMap::new(),
            containers: IndexMap::new(),
            current: None,
        }
    }

    /// The type registry backing this scene.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Move the scene behind the shared reference the handle layer
    /// expects.
    pub fn shared(self) -> SceneRef {
        Rc::new(RefCell::new(self))
    }

    pub(crate) fn vertex(&self, handle: VertexHandle) -> Result<&VertexRecord, HostError> {
        self.vertices
            .get(&handle)
            .ok_or_else(|| HostError::new("invalid vertex handle"))
    }

    pub(crate) fn plug_record(&self, handle: PlugHandle) -> Result<&PlugRecord, HostError> {
        self.plugs
            .get(&handle)
            .ok_or_else(|| HostError::new("invalid plug handle"))
    }

    /// Display name of a vertex: the stored short name when unique
    /// scene-wide, otherwise the pipe-qualified path from the root.
    pub(crate) fn display_name(&self, handle: VertexHandle) -> Result<String, HostError> {
        let record = self.vertex(handle)?;
        let duplicates = self
            .vertices
            .values()
            .filter(|v| v.name == record.name)
            .count();
        if duplicates <= 1 || !record.hierarchical {
            return Ok(record.name.clone());
        }
        let mut segments = vec![record.name.clone()];
        let mut cursor = record.parent;
        while let Some(parent) = cursor {
            let parent_record = self.vertex(parent)?;
            segments.push(parent_record.name.clone());
            cursor = parent_record.parent;
        }
        segments.reverse();
        Ok(format!("|{}", segments.join("|")))
    }

    /// Resolve a name collision the way the host does on create and
    /// rename: hierarchical vertices may share a short name under
    /// different parents; any other clash gets a numeric suffix.
    fn assign_name(
        &self,
        requested: &str,
        hierarchical: bool,
        parent: Option<VertexHandle>,
        exclude: Option<VertexHandle>,
    ) -> String {
        let clashes = |candidate: &str| {
            self.vertices.iter().any(|(handle, record)| {
                if Some(*handle) == exclude || record.name != candidate {
                    return false;
                }
                if hierarchical && record.hierarchical {
                    record.parent == parent
                } else {
                    true
                }
            })
        };
        if !clashes(requested) {
            return requested.to_owned();
        }
        let base = requested.trim_end_matches(|c: char| c.is_ascii_digit());
        let base = if base.is_empty() { requested } else { base };
        let mut counter = 1;
        loop {
            let candidate = format!("{base}{counter}");
            if !clashes(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Instantiate an attribute declaration into plug records, children
    /// first so the parent record lands complete.
    fn instantiate_attr(
        &mut self,
        vertex: VertexHandle,
        spec: &AttrSpec,
        parent: Option<PlugHandle>,
        path: String,
        logical_index: Option<u32>,
    ) -> PlugHandle {
        let handle = PlugHandle::new();
        let (shape, element_spec) = match &spec.kind {
            AttrKind::Scalar(attr_type) => (PlugShape::Scalar(*attr_type), None),
            AttrKind::Compound(_) => (PlugShape::Compound, None),
            AttrKind::Array(element) => (PlugShape::Array, Some((**element).clone())),
        };
        let mut children = Vec::new();
        if let AttrKind::Compound(child_specs) = &spec.kind {
            for child in child_specs.clone() {
                let child_path = format!("{path}.{}", child.name);
                children.push(self.instantiate_attr(
                    vertex,
                    &child,
                    Some(handle),
                    child_path,
                    None,
                ));
            }
        }
        self.plugs.insert(
            handle,
            PlugRecord {
                vertex,
                long_name: spec.name.clone(),
                short_name: spec.short_name.clone(),
                path,
                shape,
                parent,
                children,
                elements: IndexMap::new(),
                logical_index,
                element_spec,
                value: None,
            },
        );
        handle
    }

    /// Depth-first attribute search over a vertex's slot tree, long
    /// names before short names, compound children included, array
    /// elements excluded.
    fn find_plug_in(&self, roots: &[PlugHandle], name: &str) -> Option<PlugHandle> {
        for &root in roots {
            let record = self.plugs.get(&root)?;
            if record.long_name == name || record.short_name == name {
                return Some(root);
            }
            if let Some(found) = self.find_plug_in(&record.children, name) {
                return Some(found);
            }
        }
        None
    }

    fn container_record(&self, handle: VertexHandle) -> Result<&ContainerRecord, HostError> {
        self.containers
            .get(&handle)
            .ok_or_else(|| HostError::new("vertex is not a container"))
    }

    /// Drop a vertex from whichever container currently holds it.
    fn release_member(&mut self, member: VertexHandle) {
        for record in self.containers.values_mut() {
            record.members.shift_remove(&member);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl HostScene for Scene {
    fn create_vertex(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        parent: Option<VertexHandle>,
    ) -> Result<VertexHandle, HostError> {
        let vertex_type = self
            .registry
            .get(type_name)
            .cloned()
            .ok_or_else(|| HostError::new(format!("unknown vertex type '{type_name}'")))?;

        if let Some(parent) = parent {
            let parent_record = self.vertex(parent)?;
            if !parent_record.hierarchical || !vertex_type.hierarchical {
                return Err(HostError::new(format!(
                    "cannot parent '{type_name}' under '{}'",
                    parent_record.type_name
                )));
            }
        }

        let requested = match name {
            Some(name) => name.to_owned(),
            None => {
                let count = self
                    .vertices
                    .values()
                    .filter(|v| v.type_name == type_name)
                    .count();
                format!("{type_name}{}", count + 1)
            }
        };
        let assigned = self.assign_name(&requested, vertex_type.hierarchical, parent, None);

        let handle = VertexHandle::new();
        self.vertices.insert(
            handle,
            VertexRecord {
                type_name: type_name.to_owned(),
                name: assigned.clone(),
                hierarchical: vertex_type.hierarchical,
                parent,
                children: Vec::new(),
                root_plugs: Vec::new(),
            },
        );
        if let Some(parent) = parent {
            if let Some(parent_record) = self.vertices.get_mut(&parent) {
                parent_record.children.push(handle);
            }
        }

        for spec in &vertex_type.attrs {
            let path = spec.name.clone();
            let plug = self.instantiate_attr(handle, spec, None, path, None);
            if let Some(record) = self.vertices.get_mut(&handle) {
                record.root_plugs.push(plug);
            }
        }

        if type_name == "container" {
            self.containers.insert(handle, ContainerRecord::default());
        }

        if let Some(current) = self.current {
            if current != handle {
                self.add_member(current, handle)?;
            }
        }

        tracing::debug!("created {} '{}'", type_name, assigned);
        Ok(handle)
    }

    fn lookup_vertex(&self, name: &str) -> Option<VertexHandle> {
        self.vertices
            .iter()
            .find(|(handle, record)| {
                record.name == name || self.display_name(**handle).as_deref() == Ok(name)
            })
            .map(|(handle, _)| *handle)
    }

    fn vertex_exists(&self, vertex: VertexHandle) -> bool {
        self.vertices.contains_key(&vertex)
    }

    fn vertex_type(&self, vertex: VertexHandle) -> Result<String, HostError> {
        Ok(self.vertex(vertex)?.type_name.clone())
    }

    fn vertex_name(&self, vertex: VertexHandle) -> Result<String, HostError> {
        self.display_name(vertex)
    }

    fn rename_vertex(&mut self, vertex: VertexHandle, name: &str) -> Result<String, HostError> {
        let record = self.vertex(vertex)?;
        let assigned = self.assign_name(name, record.hierarchical, record.parent, Some(vertex));
        if let Some(record) = self.vertices.get_mut(&vertex) {
            record.name = assigned.clone();
        }
        tracing::debug!("renamed vertex to '{}'", assigned);
        Ok(assigned)
    }

    fn is_hierarchical(&self, vertex: VertexHandle) -> bool {
        self.vertices
            .get(&vertex)
            .is_some_and(|record| record.hierarchical)
    }

    fn parent_count(&self, vertex: VertexHandle) -> usize {
        self.vertices
            .get(&vertex)
            .map_or(0, |record| usize::from(record.parent.is_some()))
    }

    fn parent_at(&self, vertex: VertexHandle, index: usize) -> Option<VertexHandle> {
        if index == 0 {
            self.vertices.get(&vertex)?.parent
        } else {
            None
        }
    }

    fn child_count(&self, vertex: VertexHandle) -> usize {
        self.vertices
            .get(&vertex)
            .map_or(0, |record| record.children.len())
    }

    fn child_at(&self, vertex: VertexHandle, index: usize) -> Option<VertexHandle> {
        self.vertices.get(&vertex)?.children.get(index).copied()
    }

    fn is_ancestor_of(&self, ancestor: VertexHandle, vertex: VertexHandle) -> bool {
        let mut cursor = self.vertices.get(&vertex).and_then(|record| record.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.vertices.get(&current).and_then(|record| record.parent);
        }
        false
    }

    fn find_plug(&self, vertex: VertexHandle, name: &str) -> Option<PlugHandle> {
        let record = self.vertices.get(&vertex)?;
        self.find_plug_in(&record.root_plugs, name)
    }

    fn add_attribute(
        &mut self,
        vertex: VertexHandle,
        request: &AttrRequest,
    ) -> Result<PlugHandle, HostError> {
        self.vertex(vertex)?;
        if self.find_plug(vertex, &request.long_name).is_some()
            || self.find_plug(vertex, &request.short_name).is_some()
        {
            return Err(HostError::new(format!(
                "attribute '{}' already exists",
                request.long_name
            )));
        }
        let spec = AttrSpec::scalar(
            request.long_name.clone(),
            request.short_name.clone(),
            request.attr_type,
        );
        let path = spec.name.clone();
        let plug = self.instantiate_attr(vertex, &spec, None, path, None);
        if let Some(record) = self.vertices.get_mut(&vertex) {
            record.root_plugs.push(plug);
        }
        Ok(plug)
    }

    fn plug_vertex(&self, plug: PlugHandle) -> Result<VertexHandle, HostError> {
        Ok(self.plug_record(plug)?.vertex)
    }

    fn plug_name(&self, plug: PlugHandle) -> Result<String, HostError> {
        let record = self.plug_record(plug)?;
        Ok(format!(
            "{}.{}",
            self.display_name(record.vertex)?,
            record.path
        ))
    }

    fn plug_is_compound(&self, plug: PlugHandle) -> bool {
        self.plugs
            .get(&plug)
            .is_some_and(|record| record.shape == PlugShape::Compound)
    }

    fn plug_is_array(&self, plug: PlugHandle) -> bool {
        self.plugs
            .get(&plug)
            .is_some_and(|record| record.shape == PlugShape::Array)
    }

    fn plug_child_count(&self, plug: PlugHandle) -> usize {
        self.plugs
            .get(&plug)
            .map_or(0, |record| record.children.len())
    }

    fn plug_child_at(&self, plug: PlugHandle, index: usize) -> Option<PlugHandle> {
        self.plugs.get(&plug)?.children.get(index).copied()
    }

    fn plug_child_names(&self, plug: PlugHandle, index: usize) -> Option<(String, String)> {
        let child = self.plug_child_at(plug, index)?;
        let record = self.plugs.get(&child)?;
        Some((record.long_name.clone(), record.short_name.clone()))
    }

    fn plug_element(
        &mut self,
        plug: PlugHandle,
        logical_index: u32,
    ) -> Result<PlugHandle, HostError> {
        let record = self.plug_record(plug)?;
        if record.shape != PlugShape::Array {
            return Err(HostError::new("plug is not an array"));
        }
        if let Some(existing) = record.elements.get(&logical_index) {
            return Ok(*existing);
        }
        let spec = record
            .element_spec
            .clone()
            .ok_or_else(|| HostError::new("array plug has no element declaration"))?;
        let vertex = record.vertex;
        let path = format!("{}[{logical_index}]", record.path);
        let element = self.instantiate_attr(vertex, &spec, Some(plug), path, Some(logical_index));
        if let Some(record) = self.plugs.get_mut(&plug) {
            record.elements.insert(logical_index, element);
        }
        Ok(element)
    }

    fn plug_logical_index(&self, plug: PlugHandle) -> Option<u32> {
        self.plugs.get(&plug)?.logical_index
    }

    fn set_value(&mut self, plug: PlugHandle, value: AttrValue) -> Result<(), HostError> {
        let shape = self.plug_record(plug)?.shape;
        let value = match (shape, value) {
            (PlugShape::Scalar(slot), value) if value.attr_type() == slot => value,
            // Numeric widening only; narrowing is a rejection.
            (PlugShape::Scalar(AttrType::Float), AttrValue::Int(i)) => AttrValue::Float(i as f64),
            // Matrix data may land on a compound or array slot as a
            // whole; that is the host's matrix assignment, not a
            // per-element write.
            (PlugShape::Compound | PlugShape::Array, value @ AttrValue::Matrix(_)) => value,
            _ => {
                return Err(HostError::new(format!(
                    "type mismatch assigning to '{}'",
                    self.plug_name(plug).unwrap_or_default()
                )))
            }
        };
        if let Some(record) = self.plugs.get_mut(&plug) {
            record.value = Some(value);
        }
        Ok(())
    }

    fn value(&self, plug: PlugHandle) -> Result<Option<AttrValue>, HostError> {
        Ok(self.plug_record(plug)?.value.clone())
    }

    fn connect(
        &mut self,
        source: PlugHandle,
        dest: PlugHandle,
        force: bool,
    ) -> Result<(), HostError> {
        self.plug_record(source)?;
        self.plug_record(dest)?;
        if source == dest {
            return Err(HostError::new("cannot connect a plug to itself"));
        }
        if let Some(existing) = self.incoming.get(&dest).copied() {
            if existing == source {
                return Ok(());
            }
            if !force {
                return Err(HostError::new(format!(
                    "destination '{}' already connected",
                    self.plug_name(dest).unwrap_or_default()
                )));
            }
            // The replace pair commits together; nothing is observable
            // in between.
            self.incoming.shift_remove(&dest);
        }
        self.incoming.insert(dest, source);
        Ok(())
    }

    fn disconnect(&mut self, source: PlugHandle, dest: PlugHandle) -> Result<(), HostError> {
        if self.incoming.get(&dest) == Some(&source) {
            self.incoming.shift_remove(&dest);
        }
        Ok(())
    }

    fn source_of(&self, plug: PlugHandle) -> Option<PlugHandle> {
        self.incoming.get(&plug).copied()
    }

    fn destinations_of(&self, plug: PlugHandle) -> Vec<PlugHandle> {
        self.incoming
            .iter()
            .filter(|(_, source)| **source == plug)
            .map(|(dest, _)| *dest)
            .collect()
    }

    fn is_container(&self, vertex: VertexHandle) -> bool {
        self.containers.contains_key(&vertex)
    }

    fn add_member(
        &mut self,
        container: VertexHandle,
        member: VertexHandle,
    ) -> Result<(), HostError> {
        self.container_record(container)?;
        self.vertex(member)?;
        if container == member {
            return Err(HostError::new("a container cannot contain itself"));
        }
        if self
            .containers
            .get(&container)
            .is_some_and(|record| record.members.contains(&member))
        {
            return Ok(());
        }
        // A vertex belongs to at most one container; adding it again
        // elsewhere transfers it.
        self.release_member(member);
        if let Some(record) = self.containers.get_mut(&container) {
            record.members.insert(member);
        }
        tracing::debug!(
            "added '{}' to container '{}'",
            self.display_name(member).unwrap_or_default(),
            self.display_name(container).unwrap_or_default()
        );
        Ok(())
    }

    fn members(&self, container: VertexHandle) -> Vec<VertexHandle> {
        self.containers
            .get(&container)
            .map(|record| record.members.iter().copied().collect())
            .unwrap_or_default()
    }

    fn member_container(&self, vertex: VertexHandle) -> Option<VertexHandle> {
        self.containers
            .iter()
            .find(|(_, record)| record.members.contains(&vertex))
            .map(|(handle, _)| *handle)
    }

    fn subcontainers(&self, container: VertexHandle) -> Vec<VertexHandle> {
        self.members(container)
            .into_iter()
            .filter(|member| self.containers.contains_key(member))
            .collect()
    }

    fn published_nodes(
        &self,
        container: VertexHandle,
        role: PublishRole,
    ) -> Vec<(String, VertexHandle)> {
        self.containers
            .get(&container)
            .map(|record| {
                record
                    .published
                    .iter()
                    .filter_map(|entry| match entry.target {
                        PublishedTarget::Node(vertex, entry_role) if entry_role == role => {
                            Some((entry.name.clone(), vertex))
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn published_plugs(&self, container: VertexHandle) -> Vec<(String, PlugHandle)> {
        self.containers
            .get(&container)
            .map(|record| {
                record
                    .published
                    .iter()
                    .filter_map(|entry| match entry.target {
                        PublishedTarget::Plug(plug) => Some((entry.name.clone(), plug)),
                        PublishedTarget::Node(..) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn publish_node(
        &mut self,
        container: VertexHandle,
        name: &str,
        vertex: VertexHandle,
        role: PublishRole,
    ) -> Result<(), HostError> {
        self.container_record(container)?;
        self.vertex(vertex)?;
        if let Some(record) = self.containers.get_mut(&container) {
            record.published.push(PublishedEntry {
                name: name.to_owned(),
                target: PublishedTarget::Node(vertex, role),
            });
        }
        Ok(())
    }

    fn publish_plug(
        &mut self,
        container: VertexHandle,
        name: &str,
        plug: PlugHandle,
    ) -> Result<(), HostError> {
        self.container_record(container)?;
        self.plug_record(plug)?;
        if let Some(record) = self.containers.get_mut(&container) {
            record.published.push(PublishedEntry {
                name: name.to_owned(),
                target: PublishedTarget::Plug(plug),
            });
        }
        Ok(())
    }

    fn root_transform_of(&self, container: VertexHandle) -> Option<VertexHandle> {
        self.containers.get(&container)?.root_transform
    }

    fn set_root_transform_of(
        &mut self,
        container: VertexHandle,
        vertex: Option<VertexHandle>,
    ) -> Result<(), HostError> {
        self.container_record(container)?;
        if let Some(vertex) = vertex {
            self.vertex(vertex)?;
        }
        if let Some(record) = self.containers.get_mut(&container) {
            record.root_transform = vertex;
        }
        Ok(())
    }

    fn current_container(&self) -> Option<VertexHandle> {
        self.current
    }

    fn set_current_container(
        &mut self,
        container: Option<VertexHandle>,
    ) -> Result<(), HostError> {
        if let Some(container) = container {
            self.container_record(container)?;
        }
        self.current = container;
        Ok(())
    }

    fn ls(&self, filter: &LsFilter) -> Vec<VertexHandle> {
        self.query_ls(filter)
    }

    fn list_history(&self, vertex: VertexHandle) -> Vec<VertexHandle> {
        self.query_history(vertex)
    }

    fn list_relatives(&self, vertex: VertexHandle, filter: &RelativesFilter) -> Vec<VertexHandle> {
        self.query_relatives(vertex, filter)
    }
}
