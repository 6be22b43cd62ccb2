// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bulk selection queries: list-matching, construction history and
//! structural relatives.

use indexmap::IndexSet;

use riggraph_core::{LsFilter, RelativesFilter, VertexHandle};

use crate::scene::Scene;

impl Scene {
    /// Vertices matching the filter, in creation order.
    pub(crate) fn query_ls(&self, filter: &LsFilter) -> Vec<VertexHandle> {
        self.vertices
            .iter()
            .filter(|(handle, record)| {
                if let Some(vertex_type) = &filter.vertex_type {
                    if record.type_name != *vertex_type {
                        return false;
                    }
                }
                if let Some(pattern) = &filter.pattern {
                    let name = self
                        .display_name(**handle)
                        .unwrap_or_else(|_| record.name.clone());
                    if !wildcard_match(pattern, &name) {
                        return false;
                    }
                }
                true
            })
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Upstream construction history: the vertex itself, then every
    /// vertex reachable through incoming connections, depth-first.
    pub(crate) fn query_history(&self, vertex: VertexHandle) -> Vec<VertexHandle> {
        let mut seen = IndexSet::new();
        self.history_visit(vertex, &mut seen);
        seen.into_iter().collect()
    }

    fn history_visit(&self, vertex: VertexHandle, seen: &mut IndexSet<VertexHandle>) {
        if !self.vertices.contains_key(&vertex) || !seen.insert(vertex) {
            return;
        }
        for (dest, source) in &self.incoming {
            let Some(dest_record) = self.plugs.get(dest) else {
                continue;
            };
            if dest_record.vertex != vertex {
                continue;
            }
            if let Some(source_record) = self.plugs.get(source) {
                self.history_visit(source_record.vertex, seen);
            }
        }
    }

    /// Structural relatives per the filter flags, children before
    /// parents before deep descendants.
    pub(crate) fn query_relatives(
        &self,
        vertex: VertexHandle,
        filter: &RelativesFilter,
    ) -> Vec<VertexHandle> {
        let mut out = IndexSet::new();
        let Some(record) = self.vertices.get(&vertex) else {
            return Vec::new();
        };
        if filter.children {
            out.extend(record.children.iter().copied());
        }
        if filter.parents {
            out.extend(record.parent);
        }
        if filter.all_descendants {
            self.descend(vertex, &mut out);
        }
        out.into_iter().collect()
    }

    fn descend(&self, vertex: VertexHandle, out: &mut IndexSet<VertexHandle>) {
        let Some(record) = self.vertices.get(&vertex) else {
            return;
        };
        for &child in &record.children {
            if out.insert(child) {
                self.descend(child, out);
            }
        }
    }
}

/// Match a display name against a `*` wildcard pattern. Segments
/// between stars must appear in order; a pattern without stars is an
/// exact match.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }
    let mut remainder = name;
    let segments: Vec<&str> = pattern.split('*').collect();
    let last = segments.len() - 1;
    for (idx, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if idx == 0 {
            let Some(rest) = remainder.strip_prefix(segment) else {
                return false;
            };
            remainder = rest;
        } else if idx == last {
            return remainder.ends_with(segment);
        } else {
            let Some(pos) = remainder.find(segment) else {
                return false;
            };
            remainder = &remainder[pos + segment.len()..];
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_exact_and_star() {
        assert!(wildcard_match("arm_ctrl", "arm_ctrl"));
        assert!(!wildcard_match("arm_ctrl", "arm_ctrl1"));
        assert!(wildcard_match("*_ctrl", "arm_ctrl"));
        assert!(wildcard_match("arm_*", "arm_ctrl"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("a*c", "abc"));
        assert!(!wildcard_match("a*c", "abd"));
    }

    #[test]
    fn test_wildcard_middle_segments_in_order() {
        assert!(wildcard_match("l_*_jnt*", "l_arm_jnt2"));
        assert!(!wildcard_match("l_*_jnt", "r_arm_jnt"));
    }
}
