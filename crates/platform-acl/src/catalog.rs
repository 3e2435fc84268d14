//! # Permission Catalog
//!
//! The registry of every permission known to the platform. A catalog is
//! assembled once with [`PermissionCatalogBuilder`] and then frozen; the
//! frozen [`PermissionCatalog`] only answers queries.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::entities::EntityType;
use crate::error::{AclError, AclResult};
use crate::permissions::Permission;

type Index = HashMap<EntityType, HashMap<Cow<'static, str>, usize>>;

/// Builder for a [`PermissionCatalog`].
///
/// # Example
///
/// ```
/// use platform_acl::catalog::PermissionCatalogBuilder;
/// use platform_acl::entities::EntityType;
///
/// let mut builder = PermissionCatalogBuilder::new();
/// builder.register("manage:workspaces", EntityType::Workspace).unwrap();
/// assert!(builder.register("manage:workspaces", EntityType::Workspace).is_err());
///
/// let catalog = builder.build();
/// assert!(catalog.lookup("manage:workspaces", EntityType::Workspace).is_some());
/// ```
#[derive(Debug, Default)]
pub struct PermissionCatalogBuilder {
    permissions: Vec<Permission>,
    index: Index,
}

impl PermissionCatalogBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permission.
    ///
    /// # Errors
    ///
    /// - [`AclError::InvalidIdentifier`] if the identifier is not `verb:resource`
    /// - [`AclError::DuplicateDefinition`] if the pair is already registered
    pub fn register(
        &mut self,
        identifier: impl Into<Cow<'static, str>>,
        entity_type: EntityType,
    ) -> AclResult<Permission> {
        let permission = Permission::new(identifier, entity_type)?;
        self.insert(permission)
    }

    fn insert(&mut self, permission: Permission) -> AclResult<Permission> {
        let by_identifier = self.index.entry(permission.entity_type()).or_default();
        if by_identifier.contains_key(permission.identifier()) {
            warn!(
                identifier = permission.identifier(),
                entity_type = %permission.entity_type(),
                "Rejected duplicate permission definition"
            );
            return Err(AclError::DuplicateDefinition {
                identifier: permission.identifier().to_string(),
                entity_type: permission.entity_type(),
            });
        }

        by_identifier.insert(
            Cow::Owned(permission.identifier().to_string()),
            self.permissions.len(),
        );
        debug!(
            identifier = permission.identifier(),
            entity_type = %permission.entity_type(),
            "Registered permission"
        );
        self.permissions.push(permission.clone());
        Ok(permission)
    }

    /// Number of permissions registered so far.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Freeze the catalog.
    pub fn build(self) -> PermissionCatalog {
        let mut by_entity: HashMap<EntityType, Vec<usize>> = HashMap::new();
        for (position, permission) in self.permissions.iter().enumerate() {
            by_entity
                .entry(permission.entity_type())
                .or_default()
                .push(position);
        }

        PermissionCatalog {
            permissions: self.permissions,
            index: self.index,
            by_entity,
        }
    }
}

/// Immutable set of permission definitions.
///
/// Lookups are exact on both the identifier and the entity type.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    /// Declaration order
    permissions: Vec<Permission>,
    index: Index,
    by_entity: HashMap<EntityType, Vec<usize>>,
}

impl PermissionCatalog {
    /// Look up a permission by identifier and entity type.
    ///
    /// # Returns
    ///
    /// `Some(&Permission)` on an exact match, `None` otherwise. A miss means
    /// "no such permission" and is never an error.
    pub fn lookup(&self, identifier: &str, entity_type: EntityType) -> Option<&Permission> {
        let found = self
            .index
            .get(&entity_type)
            .and_then(|by_identifier| by_identifier.get(identifier))
            .map(|&position| &self.permissions[position]);

        if found.is_none() {
            trace!(identifier, entity_type = %entity_type, "Permission lookup miss");
        }
        found
    }

    /// Look up a permission by identifier and entity type name.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownEntityType`] if `entity_name` does not resolve.
    pub fn resolve(&self, identifier: &str, entity_name: &str) -> AclResult<Option<&Permission>> {
        let entity_type = EntityType::resolve(entity_name)?;
        Ok(self.lookup(identifier, entity_type))
    }

    /// Check whether a permission is part of this catalog.
    pub fn contains(&self, permission: &Permission) -> bool {
        self.lookup(permission.identifier(), permission.entity_type())
            .is_some()
    }

    /// All permissions targeting `entity_type`, in declaration order.
    pub fn all_for_entity_type(&self, entity_type: EntityType) -> Vec<&Permission> {
        self.by_entity
            .get(&entity_type)
            .map(|positions| positions.iter().map(|&p| &self.permissions[p]).collect())
            .unwrap_or_default()
    }

    /// Iterate over all permissions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Number of permissions in the catalog.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}
