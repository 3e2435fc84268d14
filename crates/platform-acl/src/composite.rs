//! # Composite Permissions
//!
//! A composite permission is granted on a coarse entity and implies other
//! permissions on the same entity or on entities it contains. For example
//! `manage:workspaceApplications` on a workspace implies
//! `manage:applications` on every application of that workspace.
//!
//! The mapping is validated when it is built:
//! - both sides of every entry must be registered in the catalog
//! - implied permissions may only target the same or a contained entity type
//! - the implication graph must be acyclic
//!
//! Query-time traversal relies on these checks but still tracks visited
//! permissions, so it terminates on any input.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::catalog::PermissionCatalog;
use crate::config::{CompositeDef, PermissionDef};
use crate::entities::EntityType;
use crate::error::{AclError, AclResult};
use crate::hierarchy::{find_cycle, EntityHierarchy};
use crate::permissions::{Permission, PermissionSet};

/// Validated map from a coarse permission to the permissions it directly implies.
#[derive(Debug, Clone, Default)]
pub struct CompositeMapping {
    entries: HashMap<Permission, Vec<Permission>>,
    /// Coarse permissions in declaration order
    order: Vec<Permission>,
}

impl CompositeMapping {
    /// Build and validate a mapping against a catalog and a hierarchy.
    ///
    /// Several definitions for the same coarse permission are concatenated;
    /// repeated implied permissions are kept once.
    ///
    /// # Errors
    ///
    /// - [`AclError::UnknownPermission`] if either side is not in `catalog`
    /// - [`AclError::InvalidImplication`] if an implied permission targets an
    ///   entity type that is neither the coarse one nor contained by it
    /// - [`AclError::CyclicHierarchy`] if a permission implies itself,
    ///   directly or transitively
    pub fn build(
        definitions: &[CompositeDef],
        catalog: &PermissionCatalog,
        hierarchy: &EntityHierarchy,
    ) -> AclResult<Self> {
        let mut mapping = Self::default();

        for definition in definitions {
            let coarse = canonical(catalog, &definition.permission)?;

            for def in &definition.implies {
                let implied = canonical(catalog, def)?;

                if implied == coarse {
                    warn!(permission = %coarse, "Rejected self-implying composite permission");
                    return Err(AclError::CyclicHierarchy {
                        path: vec![coarse.to_string(), implied.to_string()],
                    });
                }
                if !hierarchy.is_reachable(coarse.entity_type(), implied.entity_type()) {
                    warn!(
                        from = %coarse,
                        to = %implied,
                        "Rejected implication outside the containment hierarchy"
                    );
                    return Err(AclError::InvalidImplication {
                        from: coarse.to_string(),
                        to: implied.to_string(),
                    });
                }

                mapping.insert(coarse.clone(), implied.clone());
            }
        }

        let cycle = find_cycle(mapping.order.iter().cloned(), |p| mapping.direct(p).to_vec());
        if let Some(cycle) = cycle {
            let path: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            warn!(cycle = %path.join(" -> "), "Rejected cyclic composite permission mapping");
            return Err(AclError::CyclicHierarchy { path });
        }

        Ok(mapping)
    }

    fn insert(&mut self, coarse: Permission, implied: Permission) {
        if !self.entries.contains_key(&coarse) {
            self.order.push(coarse.clone());
        }
        let implied_list = self.entries.entry(coarse.clone()).or_default();
        if !implied_list.contains(&implied) {
            debug!(from = %coarse, to = %implied, "Registered composite implication");
            implied_list.push(implied);
        }
    }

    /// Permissions directly implied by `permission`, in declaration order.
    pub fn direct(&self, permission: &Permission) -> &[Permission] {
        self.entries
            .get(permission)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check whether `permission` implies anything beyond itself.
    pub fn is_composite(&self, permission: &Permission) -> bool {
        !self.direct(permission).is_empty()
    }

    /// Iterate over coarse permissions and their direct implications.
    pub fn iter(&self) -> impl Iterator<Item = (&Permission, &[Permission])> {
        self.order.iter().map(|p| (p, self.direct(p)))
    }

    /// Number of composite permissions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no composite permissions are configured.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every permission reachable from `permission`, including itself.
    pub fn expand(&self, permission: &Permission) -> PermissionSet {
        let mut result = PermissionSet::new();
        self.traverse(permission, |p| {
            result.add(p.clone());
            true
        });
        result
    }

    /// Permissions targeting `target` that a grant of `permission` implies.
    ///
    /// A grant always implies itself, so the result contains `permission`
    /// when `target` is its own entity type. Targets outside the containment
    /// subtree of `permission` yield an empty set.
    pub fn implied_permissions(
        &self,
        permission: &Permission,
        target: EntityType,
        hierarchy: &EntityHierarchy,
    ) -> PermissionSet {
        if !self.is_composite(permission) {
            return if permission.entity_type() == target {
                PermissionSet::from_iter([permission.clone()])
            } else {
                PermissionSet::new()
            };
        }
        if !hierarchy.is_reachable(permission.entity_type(), target) {
            return PermissionSet::new();
        }

        let mut result = PermissionSet::new();
        self.traverse(permission, |p| {
            if p.entity_type() == target {
                result.add(p.clone());
            }
            // implications never point up the hierarchy
            hierarchy.is_reachable(p.entity_type(), target)
        });
        result
    }

    /// Breadth-first walk from `start`. `visit` decides whether to expand a node.
    fn traverse<F>(&self, start: &Permission, mut visit: F)
    where
        F: FnMut(&Permission) -> bool,
    {
        let mut visited = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(current) = queue.pop_front() {
            if !visit(&current) {
                continue;
            }
            for next in self.direct(&current) {
                if visited.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
    }
}

fn canonical<'c>(catalog: &'c PermissionCatalog, def: &PermissionDef) -> AclResult<&'c Permission> {
    catalog
        .lookup(&def.identifier, def.entity_type)
        .ok_or_else(|| AclError::UnknownPermission {
            identifier: def.identifier.clone(),
            entity_type: def.entity_type,
        })
}
