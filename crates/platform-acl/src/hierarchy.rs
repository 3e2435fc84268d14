//! # Entity Hierarchy
//!
//! The containment graph between entity types (a workspace contains
//! applications, an application contains pages, and so on). It is
//! configuration data, defined once and validated to be acyclic.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use tracing::warn;

use crate::entities::EntityType;
use crate::error::{AclError, AclResult};

/// A directed containment relation: `parent` owns instances of `child`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HierarchyEdge {
    /// The containing entity type.
    pub parent: EntityType,
    /// The contained entity type.
    pub child: EntityType,
}

impl HierarchyEdge {
    /// Create a new edge.
    pub const fn new(parent: EntityType, child: EntityType) -> Self {
        Self { parent, child }
    }
}

/// Validated, immutable containment graph.
///
/// # Example
///
/// ```
/// use platform_acl::hierarchy::{EntityHierarchy, HierarchyEdge};
/// use platform_acl::entities::EntityType;
///
/// let hierarchy = EntityHierarchy::from_edges([
///     HierarchyEdge::new(EntityType::Workspace, EntityType::Application),
///     HierarchyEdge::new(EntityType::Application, EntityType::Page),
/// ])
/// .unwrap();
///
/// assert!(hierarchy.is_descendant(EntityType::Workspace, EntityType::Page));
/// assert!(!hierarchy.is_descendant(EntityType::Page, EntityType::Workspace));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityHierarchy {
    edges: Vec<HierarchyEdge>,
    children: HashMap<EntityType, Vec<EntityType>>,
    parents: HashMap<EntityType, Vec<EntityType>>,
    /// Strict descendants of every entity type
    below: HashMap<EntityType, HashSet<EntityType>>,
}

impl EntityHierarchy {
    /// Build a hierarchy from its edges.
    ///
    /// Repeated edges are kept once.
    ///
    /// # Errors
    ///
    /// [`AclError::CyclicHierarchy`] for a self-edge or any cycle.
    pub fn from_edges<I>(edges: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = HierarchyEdge>,
    {
        let mut hierarchy = Self::default();
        let mut seen = HashSet::new();

        for edge in edges {
            if edge.parent == edge.child {
                warn!(entity_type = %edge.parent, "Rejected self-containing hierarchy edge");
                return Err(AclError::CyclicHierarchy {
                    path: vec![edge.parent.to_string(), edge.child.to_string()],
                });
            }
            if !seen.insert(edge) {
                continue;
            }
            hierarchy.edges.push(edge);
            hierarchy
                .children
                .entry(edge.parent)
                .or_default()
                .push(edge.child);
            hierarchy
                .parents
                .entry(edge.child)
                .or_default()
                .push(edge.parent);
        }

        if let Some(cycle) = find_cycle(EntityType::all(), |e| hierarchy.children(*e).to_vec()) {
            let path: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            warn!(cycle = %path.join(" -> "), "Rejected cyclic entity hierarchy");
            return Err(AclError::CyclicHierarchy { path });
        }

        hierarchy.below = EntityType::all()
            .into_iter()
            .map(|e| (e, hierarchy.descendants(e).into_iter().collect()))
            .collect();

        Ok(hierarchy)
    }

    /// All edges, in the order they were first declared.
    pub fn edges(&self) -> &[HierarchyEdge] {
        &self.edges
    }

    /// Entity types directly contained by `entity_type`.
    pub fn children(&self, entity_type: EntityType) -> &[EntityType] {
        self.children
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entity types that directly contain `entity_type`.
    pub fn parents(&self, entity_type: EntityType) -> &[EntityType] {
        self.parents
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every entity type reachable below `entity_type`, breadth-first.
    ///
    /// `entity_type` itself is not included.
    pub fn descendants(&self, entity_type: EntityType) -> Vec<EntityType> {
        let mut visited = HashSet::from([entity_type]);
        let mut queue = VecDeque::from([entity_type]);
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &child in self.children(current) {
                if visited.insert(child) {
                    result.push(child);
                    queue.push_back(child);
                }
            }
        }

        result
    }

    /// Check whether `descendant` is strictly below `ancestor`.
    ///
    /// Answered from the descendant sets computed when the hierarchy was built.
    pub fn is_descendant(&self, ancestor: EntityType, descendant: EntityType) -> bool {
        self.below
            .get(&ancestor)
            .map_or(false, |below| below.contains(&descendant))
    }

    /// Check whether `to` is `from` itself or one of its descendants.
    pub fn is_reachable(&self, from: EntityType, to: EntityType) -> bool {
        from == to || self.is_descendant(from, to)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first search for a cycle in a directed graph.
///
/// Returns the nodes of the first cycle found, with the repeated node at
/// both ends, or `None` if the graph is acyclic. Does not recurse: the walk
/// keeps an explicit stack of `(node, successors, next index)` frames.
pub(crate) fn find_cycle<N, I, F>(nodes: I, successors: F) -> Option<Vec<N>>
where
    N: Clone + Eq + Hash,
    I: IntoIterator<Item = N>,
    F: Fn(&N) -> Vec<N>,
{
    let mut marks: HashMap<N, Mark> = HashMap::new();

    for root in nodes {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root.clone(), Mark::InProgress);
        let next = successors(&root);
        let mut stack: Vec<(N, Vec<N>, usize)> = vec![(root, next, 0)];

        while let Some((node, next, index)) = stack.last_mut() {
            let Some(child) = next.get(*index).cloned() else {
                marks.insert(node.clone(), Mark::Done);
                stack.pop();
                continue;
            };
            *index += 1;

            match marks.get(&child).copied() {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    let start = stack.iter().position(|(n, _, _)| *n == child).unwrap_or(0);
                    let mut cycle: Vec<N> = stack[start..]
                        .iter()
                        .map(|(n, _, _)| n.clone())
                        .collect();
                    cycle.push(child);
                    return Some(cycle);
                }
                None => {
                    marks.insert(child.clone(), Mark::InProgress);
                    let next = successors(&child);
                    stack.push((child, next, 0));
                }
            }
        }
    }
    None
}
