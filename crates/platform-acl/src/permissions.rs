//! # Permissions
//!
//! Core permission value type, the built-in permission definitions, and
//! permission sets.
//!
//! A permission is a wire-level identifier (`"verb:resource"`) bound to the
//! single entity type it is checked against. Identifiers are not unique on
//! their own; the pair is.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use crate::entities::EntityType;
use crate::error::{AclError, AclResult};

/// A permission is an identifier bound to a target entity type.
///
/// Permissions are immutable. Built-in permissions are available as
/// constants in this module; permissions loaded from configuration are
/// created by the catalog builder.
///
/// # Example
///
/// ```
/// use platform_acl::permissions::MANAGE_APPLICATIONS;
/// use platform_acl::entities::EntityType;
///
/// assert_eq!(MANAGE_APPLICATIONS.identifier(), "manage:applications");
/// assert_eq!(MANAGE_APPLICATIONS.entity_type(), EntityType::Application);
/// assert_eq!(MANAGE_APPLICATIONS.verb(), "manage");
/// assert_eq!(MANAGE_APPLICATIONS.to_string(), "manage:applications@application");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permission {
    identifier: Cow<'static, str>,
    entity_type: EntityType,
}

impl Permission {
    const fn builtin(identifier: &'static str, entity_type: EntityType) -> Self {
        Self {
            identifier: Cow::Borrowed(identifier),
            entity_type,
        }
    }

    /// Create a validated permission. Only the catalog builder calls this.
    pub(crate) fn new(
        identifier: impl Into<Cow<'static, str>>,
        entity_type: EntityType,
    ) -> AclResult<Self> {
        let identifier = identifier.into();
        validate_identifier(&identifier)?;
        Ok(Self {
            identifier,
            entity_type,
        })
    }

    /// The wire-level identifier, e.g. `"manage:workspaces"`.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The entity type this permission is checked against.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// The verb half of the identifier (`"manage"` in `"manage:workspaces"`).
    pub fn verb(&self) -> &str {
        self.split().0
    }

    /// The resource half of the identifier (`"workspaces"` in `"manage:workspaces"`).
    pub fn resource(&self) -> &str {
        self.split().1
    }

    /// Check whether this permission has the given identifier and entity type.
    pub fn matches(&self, identifier: &str, entity_type: EntityType) -> bool {
        self.entity_type == entity_type && self.identifier == identifier
    }

    fn split(&self) -> (&str, &str) {
        self.identifier
            .split_once(':')
            .unwrap_or((&*self.identifier, ""))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identifier, self.entity_type)
    }
}

/// Check that an identifier has the form `verb:resource`.
///
/// Both halves must be non-empty and free of whitespace and further colons.
pub fn validate_identifier(identifier: &str) -> AclResult<()> {
    let valid = match identifier.split_once(':') {
        Some((verb, resource)) => {
            !verb.is_empty()
                && !resource.is_empty()
                && !resource.contains(':')
                && !identifier.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AclError::InvalidIdentifier(identifier.to_string()))
    }
}

// Tenant level permissions
pub const CREATE_WORKSPACES: Permission =
    Permission::builtin("create:workspace", EntityType::Tenant);
pub const CREATE_USER_GROUPS: Permission =
    Permission::builtin("create:userGroups", EntityType::Tenant);
pub const CREATE_PERMISSION_GROUPS: Permission =
    Permission::builtin("create:permissionGroups", EntityType::Tenant);

// User level permissions
/// Manage every workspace the user belongs to.
pub const USER_MANAGE_WORKSPACES: Permission =
    Permission::builtin("manage:userWorkspace", EntityType::User);
/// Read every workspace the user belongs to.
pub const USER_READ_WORKSPACES: Permission =
    Permission::builtin("read:userWorkspace", EntityType::User);
/// Access to the instance configuration screens.
pub const MANAGE_INSTANCE_ENV: Permission =
    Permission::builtin("manage:instanceEnv", EntityType::User);
pub const READ_USERS: Permission = Permission::builtin("read:users", EntityType::User);
pub const MANAGE_USERS: Permission = Permission::builtin("manage:users", EntityType::User);
pub const RESET_PASSWORD_USERS: Permission =
    Permission::builtin("resetPassword:users", EntityType::User);

// Workspace level permissions
pub const MANAGE_WORKSPACES: Permission =
    Permission::builtin("manage:workspaces", EntityType::Workspace);
pub const READ_WORKSPACES: Permission =
    Permission::builtin("read:workspaces", EntityType::Workspace);
pub const DELETE_WORKSPACES: Permission =
    Permission::builtin("delete:workspace", EntityType::Workspace);
pub const CREATE_APPLICATION: Permission =
    Permission::builtin("create:applications", EntityType::Workspace);
pub const CREATE_DATASOURCE: Permission =
    Permission::builtin("create:datasources", EntityType::Workspace);

// Workspace-wide grants over the workspace's applications
pub const WORKSPACE_MANAGE_APPLICATIONS: Permission =
    Permission::builtin("manage:workspaceApplications", EntityType::Workspace);
pub const WORKSPACE_READ_APPLICATIONS: Permission =
    Permission::builtin("read:workspaceApplications", EntityType::Workspace);
pub const WORKSPACE_PUBLISH_APPLICATIONS: Permission =
    Permission::builtin("publish:workspaceApplications", EntityType::Workspace);
pub const WORKSPACE_EXPORT_APPLICATIONS: Permission =
    Permission::builtin("export:workspaceApplications", EntityType::Workspace);
pub const WORKSPACE_DELETE_APPLICATIONS: Permission =
    Permission::builtin("delete:workspaceApplications", EntityType::Workspace);
pub const WORKSPACE_MAKE_PUBLIC_APPLICATIONS: Permission =
    Permission::builtin("makePublic:workspaceApplications", EntityType::Workspace);

// Workspace-wide grants over the workspace's datasources
pub const WORKSPACE_MANAGE_DATASOURCES: Permission =
    Permission::builtin("manage:workspaceDatasources", EntityType::Workspace);
pub const WORKSPACE_READ_DATASOURCES: Permission =
    Permission::builtin("read:workspaceDatasources", EntityType::Workspace);
pub const WORKSPACE_DELETE_DATASOURCES: Permission =
    Permission::builtin("delete:workspaceDatasources", EntityType::Workspace);
pub const WORKSPACE_EXECUTE_DATASOURCES: Permission =
    Permission::builtin("execute:workspaceDatasources", EntityType::Workspace);

pub const WORKSPACE_INVITE_USERS: Permission =
    Permission::builtin("inviteUsers:workspace", EntityType::Workspace);

// Application level permissions
pub const MANAGE_APPLICATIONS: Permission =
    Permission::builtin("manage:applications", EntityType::Application);
pub const READ_APPLICATIONS: Permission =
    Permission::builtin("read:applications", EntityType::Application);
pub const PUBLISH_APPLICATIONS: Permission =
    Permission::builtin("publish:applications", EntityType::Application);
pub const EXPORT_APPLICATIONS: Permission =
    Permission::builtin("export:applications", EntityType::Application);
pub const DELETE_APPLICATIONS: Permission =
    Permission::builtin("delete:applications", EntityType::Application);
pub const MAKE_PUBLIC_APPLICATIONS: Permission =
    Permission::builtin("makePublic:applications", EntityType::Application);
/// Start a comment thread on the application.
pub const COMMENT_ON_APPLICATIONS: Permission =
    Permission::builtin("canComment:applications", EntityType::Application);
pub const CREATE_PAGES: Permission = Permission::builtin("create:pages", EntityType::Application);

// Page level permissions
pub const MANAGE_PAGES: Permission = Permission::builtin("manage:pages", EntityType::Page);
pub const READ_PAGES: Permission = Permission::builtin("read:pages", EntityType::Page);
pub const DELETE_PAGES: Permission = Permission::builtin("delete:pages", EntityType::Page);
pub const CREATE_PAGE_ACTIONS: Permission =
    Permission::builtin("create:pageActions", EntityType::Page);

// Action level permissions
pub const MANAGE_ACTIONS: Permission = Permission::builtin("manage:actions", EntityType::Action);
pub const READ_ACTIONS: Permission = Permission::builtin("read:actions", EntityType::Action);
pub const EXECUTE_ACTIONS: Permission = Permission::builtin("execute:actions", EntityType::Action);
pub const DELETE_ACTIONS: Permission = Permission::builtin("delete:actions", EntityType::Action);

// Datasource level permissions
pub const MANAGE_DATASOURCES: Permission =
    Permission::builtin("manage:datasources", EntityType::Datasource);
pub const READ_DATASOURCES: Permission =
    Permission::builtin("read:datasources", EntityType::Datasource);
pub const EXECUTE_DATASOURCES: Permission =
    Permission::builtin("execute:datasources", EntityType::Datasource);
pub const DELETE_DATASOURCES: Permission =
    Permission::builtin("delete:datasources", EntityType::Datasource);
pub const CREATE_DATASOURCE_ACTIONS: Permission =
    Permission::builtin("create:datasourceActions", EntityType::Datasource);

// Comment permissions
pub const COMMENT_ON_THREADS: Permission =
    Permission::builtin("canComment:commentThreads", EntityType::CommentThread);
pub const READ_THREADS: Permission =
    Permission::builtin("read:commentThreads", EntityType::CommentThread);
pub const MANAGE_THREADS: Permission =
    Permission::builtin("manage:commentThreads", EntityType::CommentThread);
pub const READ_COMMENTS: Permission = Permission::builtin("read:comments", EntityType::Comment);
pub const MANAGE_COMMENTS: Permission = Permission::builtin("manage:comments", EntityType::Comment);

// Theme permissions
pub const READ_THEMES: Permission = Permission::builtin("read:themes", EntityType::Theme);
pub const MANAGE_THEMES: Permission = Permission::builtin("manage:themes", EntityType::Theme);

// Permission group permissions
pub const MANAGE_PERMISSION_GROUPS: Permission =
    Permission::builtin("manage:permissionGroups", EntityType::PermissionGroup);
pub const READ_PERMISSION_GROUPS: Permission =
    Permission::builtin("read:permissionGroups", EntityType::PermissionGroup);
pub const ASSIGN_PERMISSION_GROUPS: Permission =
    Permission::builtin("assign:permissionGroups", EntityType::PermissionGroup);

/// Every built-in permission, in declaration order.
pub const BUILTIN: &[Permission] = &[
    CREATE_WORKSPACES,
    CREATE_USER_GROUPS,
    CREATE_PERMISSION_GROUPS,
    USER_MANAGE_WORKSPACES,
    USER_READ_WORKSPACES,
    MANAGE_INSTANCE_ENV,
    READ_USERS,
    MANAGE_USERS,
    RESET_PASSWORD_USERS,
    MANAGE_WORKSPACES,
    READ_WORKSPACES,
    DELETE_WORKSPACES,
    CREATE_APPLICATION,
    CREATE_DATASOURCE,
    WORKSPACE_MANAGE_APPLICATIONS,
    WORKSPACE_READ_APPLICATIONS,
    WORKSPACE_PUBLISH_APPLICATIONS,
    WORKSPACE_EXPORT_APPLICATIONS,
    WORKSPACE_DELETE_APPLICATIONS,
    WORKSPACE_MAKE_PUBLIC_APPLICATIONS,
    WORKSPACE_MANAGE_DATASOURCES,
    WORKSPACE_READ_DATASOURCES,
    WORKSPACE_DELETE_DATASOURCES,
    WORKSPACE_EXECUTE_DATASOURCES,
    WORKSPACE_INVITE_USERS,
    MANAGE_APPLICATIONS,
    READ_APPLICATIONS,
    PUBLISH_APPLICATIONS,
    EXPORT_APPLICATIONS,
    DELETE_APPLICATIONS,
    MAKE_PUBLIC_APPLICATIONS,
    COMMENT_ON_APPLICATIONS,
    CREATE_PAGES,
    MANAGE_PAGES,
    READ_PAGES,
    DELETE_PAGES,
    CREATE_PAGE_ACTIONS,
    MANAGE_ACTIONS,
    READ_ACTIONS,
    EXECUTE_ACTIONS,
    DELETE_ACTIONS,
    MANAGE_DATASOURCES,
    READ_DATASOURCES,
    EXECUTE_DATASOURCES,
    DELETE_DATASOURCES,
    CREATE_DATASOURCE_ACTIONS,
    COMMENT_ON_THREADS,
    READ_THREADS,
    MANAGE_THREADS,
    READ_COMMENTS,
    MANAGE_COMMENTS,
    READ_THEMES,
    MANAGE_THEMES,
    MANAGE_PERMISSION_GROUPS,
    READ_PERMISSION_GROUPS,
    ASSIGN_PERMISSION_GROUPS,
];

/// An ordered set of permissions.
///
/// Iteration is ordered by identifier, then entity type, so results are
/// deterministic regardless of how the set was assembled.
///
/// # Example
///
/// ```
/// use platform_acl::permissions::{PermissionSet, MANAGE_PAGES, READ_PAGES};
///
/// let mut set = PermissionSet::new();
/// set.add(MANAGE_PAGES);
/// set.add(READ_PAGES);
///
/// assert!(set.has(&READ_PAGES));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeSet::new(),
        }
    }

    /// Add a permission to the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was not already present
    pub fn add(&mut self, permission: Permission) -> bool {
        self.permissions.insert(permission)
    }

    /// Remove a permission from the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present, `false` otherwise
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if the set contains a permission (exact identifier and entity type).
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Check if the set contains a permission by identifier and entity type.
    pub fn has_identifier(&self, identifier: &str, entity_type: EntityType) -> bool {
        self.permissions
            .iter()
            .any(|p| p.matches(identifier, entity_type))
    }

    /// Iterate over the permissions targeting one entity type.
    pub fn for_entity_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Permission> {
        self.permissions
            .iter()
            .filter(move |p| p.entity_type == entity_type)
    }

    /// Iterate over all permissions in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Check if this set contains all permissions from another set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.permissions.is_subset(&self.permissions)
    }

    /// Check if this set contains any permission from another set.
    pub fn contains_any(&self, other: &PermissionSet) -> bool {
        !self.permissions.is_disjoint(&other.permissions)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<T: IntoIterator<Item = Permission>>(&mut self, iter: T) {
        self.permissions.extend(iter);
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}
