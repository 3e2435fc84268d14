//! The validated permission catalog snapshot.
//!
//! [`AclCatalog`] ties the permission catalog, the containment hierarchy and
//! the composite mapping together. It is built and validated in one step
//! and is immutable afterwards, so it can be shared across threads without
//! locking.

use std::sync::OnceLock;

use tracing::{info, instrument, trace, warn};

use crate::catalog::{PermissionCatalog, PermissionCatalogBuilder};
use crate::composite::CompositeMapping;
use crate::config::CatalogConfig;
use crate::entities::EntityType;
use crate::error::AclResult;
use crate::hierarchy::EntityHierarchy;
use crate::permissions::{Permission, PermissionSet};

static GLOBAL: OnceLock<AclCatalog> = OnceLock::new();

/// Immutable, validated permission catalog.
///
/// # Example
///
/// ```
/// use platform_acl::{AclCatalog, EntityType};
/// use platform_acl::permissions::{MANAGE_APPLICATIONS, WORKSPACE_MANAGE_APPLICATIONS};
///
/// let acl = AclCatalog::global();
///
/// let perm = acl.lookup("manage:workspaceApplications", EntityType::Workspace).unwrap();
/// assert_eq!(perm, &WORKSPACE_MANAGE_APPLICATIONS);
///
/// let implied = acl.implied_permissions(perm, EntityType::Application);
/// assert!(implied.has(&MANAGE_APPLICATIONS));
/// ```
#[derive(Debug, Clone)]
pub struct AclCatalog {
    permissions: PermissionCatalog,
    hierarchy: EntityHierarchy,
    composites: CompositeMapping,
}

impl AclCatalog {
    /// Build and validate a catalog.
    ///
    /// Nothing is returned unless every definition is valid: a duplicate
    /// pair, a cycle in the hierarchy or in the composite mapping, an
    /// unknown permission in a mapping, or an implication outside the
    /// containment hierarchy all fail the whole build.
    #[instrument(skip_all)]
    pub fn from_config(config: &CatalogConfig) -> AclResult<Self> {
        Self::build(config).map_err(|e| {
            warn!(error = %e, code = e.error_code(), "Permission catalog rejected");
            e
        })
    }

    fn build(config: &CatalogConfig) -> AclResult<Self> {
        let mut builder = PermissionCatalogBuilder::new();
        for def in &config.permissions {
            builder.register(def.identifier.clone(), def.entity_type)?;
        }
        let permissions = builder.build();
        let hierarchy = EntityHierarchy::from_edges(config.hierarchy.iter().copied())?;
        let composites = CompositeMapping::build(&config.composites, &permissions, &hierarchy)?;

        info!(
            permissions = permissions.len(),
            edges = hierarchy.edges().len(),
            composites = composites.len(),
            "Permission catalog built"
        );

        Ok(Self {
            permissions,
            hierarchy,
            composites,
        })
    }

    /// Build the platform's built-in catalog.
    pub fn builtin() -> AclResult<Self> {
        Self::from_config(&CatalogConfig::builtin())
    }

    /// The process-wide built-in catalog.
    ///
    /// Built and validated on first use; every later call returns the same
    /// snapshot.
    ///
    /// # Panics
    ///
    /// If the compiled-in table is invalid. The platform cannot start
    /// without a valid catalog.
    pub fn global() -> &'static AclCatalog {
        GLOBAL.get_or_init(|| match Self::builtin() {
            Ok(catalog) => catalog,
            Err(e) => panic!("built-in permission catalog is invalid: {e}"),
        })
    }

    /// Look up a permission by identifier and entity type.
    ///
    /// Exact match on both fields. `None` means the permission does not
    /// exist for that entity type.
    pub fn lookup(&self, identifier: &str, entity_type: EntityType) -> Option<&Permission> {
        self.permissions.lookup(identifier, entity_type)
    }

    /// Look up a permission by identifier and entity type name.
    pub fn resolve(&self, identifier: &str, entity_name: &str) -> AclResult<Option<&Permission>> {
        self.permissions.resolve(identifier, entity_name)
    }

    /// All permissions targeting `entity_type`, in declaration order.
    pub fn all_for_entity_type(&self, entity_type: EntityType) -> Vec<&Permission> {
        self.permissions.all_for_entity_type(entity_type)
    }

    /// Permissions on `target` implied by a grant of `permission`.
    ///
    /// The result holds every reachable permission whose entity type is
    /// `target`; callers pick the one their check needs. A grant implies
    /// itself, so `target == permission.entity_type()` always includes
    /// `permission`. Permissions outside this catalog imply nothing.
    pub fn implied_permissions(
        &self,
        permission: &Permission,
        target: EntityType,
    ) -> PermissionSet {
        if !self.permissions.contains(permission) {
            trace!(permission = %permission, "Resolving a permission outside the catalog");
            return PermissionSet::new();
        }
        self.composites
            .implied_permissions(permission, target, &self.hierarchy)
    }

    /// Check whether a grant of `granted` implies `required`.
    pub fn implies(&self, granted: &Permission, required: &Permission) -> bool {
        (granted == required && self.permissions.contains(granted))
            || self
                .implied_permissions(granted, required.entity_type())
                .has(required)
    }

    /// Every permission a grant of `permission` implies, at any level.
    pub fn expand(&self, permission: &Permission) -> PermissionSet {
        if !self.permissions.contains(permission) {
            return PermissionSet::new();
        }
        self.composites.expand(permission)
    }

    /// Permissions directly implied by `permission`.
    pub fn composites_of(&self, permission: &Permission) -> &[Permission] {
        self.composites.direct(permission)
    }

    /// The permission definitions.
    pub fn permissions(&self) -> &PermissionCatalog {
        &self.permissions
    }

    /// The containment hierarchy.
    pub fn hierarchy(&self) -> &EntityHierarchy {
        &self.hierarchy
    }

    /// The composite mapping.
    pub fn composites(&self) -> &CompositeMapping {
        &self.composites
    }
}
