//! Catalog configuration.
//!
//! Provides the declarative table a catalog is built from: the permission
//! definitions, the containment hierarchy and the composite mappings. The
//! platform's own table is compiled in ([`CatalogConfig::builtin`]); a
//! deployment can replace it with a JSON file named by an environment
//! variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::EntityType;
use crate::error::{AclError, AclResult};
use crate::hierarchy::HierarchyEdge;
use crate::permissions::{self, Permission};

/// Environment variable naming a JSON catalog definition file.
pub const CATALOG_PATH_ENV: &str = "ACL_CATALOG_PATH";

/// A permission definition: identifier plus target entity type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PermissionDef {
    /// Wire-level identifier, `verb:resource`.
    pub identifier: String,
    /// Entity type the permission is checked against.
    pub entity_type: EntityType,
}

impl PermissionDef {
    /// Create a new permission definition.
    pub fn new(identifier: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            identifier: identifier.into(),
            entity_type,
        }
    }
}

impl From<&Permission> for PermissionDef {
    fn from(permission: &Permission) -> Self {
        Self::new(permission.identifier(), permission.entity_type())
    }
}

/// A composite permission and the permissions it directly implies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositeDef {
    /// The coarse permission.
    pub permission: PermissionDef,
    /// Permissions implied on the same or contained entity types.
    pub implies: Vec<PermissionDef>,
}

/// Declarative catalog definition.
///
/// # Example
///
/// ```
/// use platform_acl::config::CatalogConfig;
///
/// let config = CatalogConfig::from_json(r#"{
///     "permissions": [
///         { "identifier": "manage:workspaceApplications", "entity_type": "workspace" },
///         { "identifier": "manage:applications", "entity_type": "application" }
///     ],
///     "hierarchy": [ { "parent": "workspace", "child": "application" } ],
///     "composites": [ {
///         "permission": { "identifier": "manage:workspaceApplications", "entity_type": "workspace" },
///         "implies": [ { "identifier": "manage:applications", "entity_type": "application" } ]
///     } ]
/// }"#).unwrap();
///
/// assert_eq!(config.permissions.len(), 2);
/// assert_eq!(config.composites.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Permission definitions, in declaration order.
    pub permissions: Vec<PermissionDef>,

    /// Containment edges between entity types.
    #[serde(default)]
    pub hierarchy: Vec<HierarchyEdge>,

    /// Composite permission mappings.
    #[serde(default)]
    pub composites: Vec<CompositeDef>,
}

impl Default for CatalogConfig {
    /// Returns the platform's built-in table.
    fn default() -> Self {
        Self::builtin()
    }
}

impl CatalogConfig {
    /// An empty definition, for assembling a catalog by hand.
    pub fn empty() -> Self {
        Self {
            permissions: Vec::new(),
            hierarchy: Vec::new(),
            composites: Vec::new(),
        }
    }

    /// The platform's built-in permission table.
    pub fn builtin() -> Self {
        Self {
            permissions: permissions::BUILTIN.iter().map(PermissionDef::from).collect(),
            hierarchy: BUILTIN_HIERARCHY.to_vec(),
            composites: builtin_composites(),
        }
    }

    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> AclResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON definition from a file.
    pub fn from_file(path: impl AsRef<Path>) -> AclResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AclError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Load configuration from the environment.
    ///
    /// Environment variables:
    /// - `ACL_CATALOG_PATH`: JSON catalog definition file (default: built-in table)
    pub fn from_env() -> AclResult<Self> {
        match std::env::var(CATALOG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::builtin()),
        }
    }

    /// Add a permission definition.
    pub fn with_permission(
        mut self,
        identifier: impl Into<String>,
        entity_type: EntityType,
    ) -> Self {
        self.permissions.push(PermissionDef::new(identifier, entity_type));
        self
    }

    /// Add a containment edge.
    pub fn with_edge(mut self, parent: EntityType, child: EntityType) -> Self {
        self.hierarchy.push(HierarchyEdge::new(parent, child));
        self
    }

    /// Add a composite mapping.
    pub fn with_composite(
        mut self,
        permission: PermissionDef,
        implies: Vec<PermissionDef>,
    ) -> Self {
        self.composites.push(CompositeDef {
            permission,
            implies,
        });
        self
    }
}

/// The platform's containment hierarchy.
pub const BUILTIN_HIERARCHY: &[HierarchyEdge] = &[
    HierarchyEdge::new(EntityType::Tenant, EntityType::User),
    HierarchyEdge::new(EntityType::Tenant, EntityType::Workspace),
    HierarchyEdge::new(EntityType::User, EntityType::Workspace),
    HierarchyEdge::new(EntityType::Workspace, EntityType::Application),
    HierarchyEdge::new(EntityType::Workspace, EntityType::Datasource),
    HierarchyEdge::new(EntityType::Workspace, EntityType::PermissionGroup),
    HierarchyEdge::new(EntityType::Application, EntityType::Page),
    HierarchyEdge::new(EntityType::Application, EntityType::CommentThread),
    HierarchyEdge::new(EntityType::Page, EntityType::Action),
    HierarchyEdge::new(EntityType::CommentThread, EntityType::Comment),
];

fn builtin_composites() -> Vec<CompositeDef> {
    use crate::permissions::*;

    let table: &[(&Permission, &[Permission])] = &[
        // User
        (&USER_MANAGE_WORKSPACES, &[MANAGE_WORKSPACES]),
        (&USER_READ_WORKSPACES, &[READ_WORKSPACES]),
        // Workspace
        (&MANAGE_WORKSPACES, &[READ_WORKSPACES, MANAGE_PERMISSION_GROUPS]),
        (&READ_WORKSPACES, &[READ_PERMISSION_GROUPS]),
        (&WORKSPACE_INVITE_USERS, &[ASSIGN_PERMISSION_GROUPS]),
        (&WORKSPACE_MANAGE_APPLICATIONS, &[MANAGE_APPLICATIONS]),
        (&WORKSPACE_READ_APPLICATIONS, &[READ_APPLICATIONS]),
        (&WORKSPACE_PUBLISH_APPLICATIONS, &[PUBLISH_APPLICATIONS]),
        (&WORKSPACE_EXPORT_APPLICATIONS, &[EXPORT_APPLICATIONS]),
        (&WORKSPACE_DELETE_APPLICATIONS, &[DELETE_APPLICATIONS]),
        (&WORKSPACE_MAKE_PUBLIC_APPLICATIONS, &[MAKE_PUBLIC_APPLICATIONS]),
        (&WORKSPACE_MANAGE_DATASOURCES, &[MANAGE_DATASOURCES]),
        (&WORKSPACE_READ_DATASOURCES, &[READ_DATASOURCES]),
        (&WORKSPACE_DELETE_DATASOURCES, &[DELETE_DATASOURCES]),
        (&WORKSPACE_EXECUTE_DATASOURCES, &[EXECUTE_DATASOURCES]),
        // Application
        (
            &MANAGE_APPLICATIONS,
            &[READ_APPLICATIONS, CREATE_PAGES, MANAGE_PAGES, MANAGE_THREADS],
        ),
        (&READ_APPLICATIONS, &[READ_PAGES, READ_THREADS]),
        (&DELETE_APPLICATIONS, &[DELETE_PAGES]),
        (&COMMENT_ON_APPLICATIONS, &[COMMENT_ON_THREADS]),
        // Page
        (&MANAGE_PAGES, &[READ_PAGES, CREATE_PAGE_ACTIONS, MANAGE_ACTIONS]),
        (&READ_PAGES, &[READ_ACTIONS, EXECUTE_ACTIONS]),
        (&DELETE_PAGES, &[DELETE_ACTIONS]),
        // Action
        (&MANAGE_ACTIONS, &[READ_ACTIONS, EXECUTE_ACTIONS]),
        // Datasource
        (
            &MANAGE_DATASOURCES,
            &[READ_DATASOURCES, EXECUTE_DATASOURCES, CREATE_DATASOURCE_ACTIONS],
        ),
        // Comments
        (
            &MANAGE_THREADS,
            &[READ_THREADS, COMMENT_ON_THREADS, MANAGE_COMMENTS],
        ),
        (&READ_THREADS, &[READ_COMMENTS]),
        (&MANAGE_COMMENTS, &[READ_COMMENTS]),
        // Permission groups
        (
            &MANAGE_PERMISSION_GROUPS,
            &[READ_PERMISSION_GROUPS, ASSIGN_PERMISSION_GROUPS],
        ),
        // Themes
        (&MANAGE_THEMES, &[READ_THEMES]),
    ];

    table
        .iter()
        .map(|(permission, implies)| CompositeDef {
            permission: PermissionDef::from(*permission),
            implies: implies.iter().map(PermissionDef::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let config = CatalogConfig::builtin();
        assert_eq!(config.permissions.len(), 56);
        assert_eq!(config.hierarchy.len(), 10);
        assert_eq!(config.composites.len(), 29);
        assert_eq!(config, CatalogConfig::default());

        assert_eq!(
            config.permissions[0],
            PermissionDef::new("create:workspace", EntityType::Tenant)
        );
    }

    #[test]
    fn test_builtin_composites_reference_builtin_permissions() {
        let config = CatalogConfig::builtin();
        for composite in &config.composites {
            assert!(config.permissions.contains(&composite.permission));
            for implied in &composite.implies {
                assert!(config.permissions.contains(implied), "{implied:?}");
            }
        }
    }

    #[test]
    fn test_from_json_defaults_optional_sections() {
        let config = CatalogConfig::from_json(
            r#"{ "permissions": [ { "identifier": "read:themes", "entity_type": "theme" } ] }"#,
        )
        .unwrap();
        assert_eq!(config.permissions.len(), 1);
        assert!(config.hierarchy.is_empty());
        assert!(config.composites.is_empty());
    }

    #[test]
    fn test_from_json_rejects_unknown_entity_type() {
        let err = CatalogConfig::from_json(
            r#"{ "permissions": [ { "identifier": "read:widgets", "entity_type": "widget" } ] }"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_json_round_trip_of_builtin() {
        let config = CatalogConfig::builtin();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(CatalogConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let path =
            std::env::temp_dir().join(format!("platform-acl-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "permissions": [ { "identifier": "read:pages", "entity_type": "page" } ] }"#,
        )
        .unwrap();

        let config = CatalogConfig::from_file(&path).unwrap();
        assert_eq!(
            config.permissions,
            vec![PermissionDef::new("read:pages", EntityType::Page)]
        );
        std::fs::remove_file(&path).unwrap();

        let err = CatalogConfig::from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    // One test owns ACL_CATALOG_PATH so the steps do not race each other.
    #[test]
    fn test_from_env() {
        std::env::remove_var(CATALOG_PATH_ENV);
        assert_eq!(CatalogConfig::from_env().unwrap(), CatalogConfig::builtin());

        std::env::set_var(CATALOG_PATH_ENV, "   ");
        assert_eq!(CatalogConfig::from_env().unwrap(), CatalogConfig::builtin());

        let path =
            std::env::temp_dir().join(format!("platform-acl-env-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "permissions": [ { "identifier": "read:themes", "entity_type": "theme" } ] }"#,
        )
        .unwrap();
        std::env::set_var(CATALOG_PATH_ENV, format!(" {} ", path.display()));
        let config = CatalogConfig::from_env().unwrap();
        assert_eq!(config.permissions, vec![PermissionDef::new("read:themes", EntityType::Theme)]);
        assert!(config.hierarchy.is_empty());
        assert!(config.composites.is_empty());

        std::fs::remove_file(&path).unwrap();
        let err = CatalogConfig::from_env().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        std::env::remove_var(CATALOG_PATH_ENV);
    }

    #[test]
    fn test_fluent_builders() {
        let config = CatalogConfig::empty()
            .with_permission("manage:pages", EntityType::Page)
            .with_permission("read:pages", EntityType::Page)
            .with_edge(EntityType::Application, EntityType::Page)
            .with_composite(
                PermissionDef::new("manage:pages", EntityType::Page),
                vec![PermissionDef::new("read:pages", EntityType::Page)],
            );

        assert_eq!(config.permissions.len(), 2);
        assert_eq!(
            config.hierarchy,
            vec![HierarchyEdge::new(EntityType::Application, EntityType::Page)]
        );
        assert_eq!(config.composites[0].implies.len(), 1);
    }
}
