//! # Entity Types
//!
//! Defines the resource kinds that permissions are checked against.
//! The set is closed: adding a resource kind is a catalog change, not a
//! runtime operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AclError, AclResult};

/// Resource kinds in the platform's containment hierarchy.
///
/// - **Tenant**: the root of an installation
/// - **User**, **Workspace**, **PermissionGroup**: identity and tenancy
/// - **Application**, **Page**, **Action**, **Datasource**: building blocks
///   owned by a workspace
/// - **CommentThread**, **Comment**: collaboration on applications
/// - **Theme**: application styling
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Tenant (installation root).
    Tenant,
    /// User accounts.
    User,
    /// Workspaces owning applications and datasources.
    Workspace,
    /// Applications within a workspace.
    Application,
    /// Pages within an application.
    Page,
    /// Actions (queries and API calls) on a page.
    Action,
    /// Datasources within a workspace.
    Datasource,
    /// Comment threads on an application.
    CommentThread,
    /// Comments within a thread.
    Comment,
    /// Application themes.
    Theme,
    /// Permission groups (roles).
    PermissionGroup,
}

impl EntityType {
    /// Get the canonical string representation of the entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Tenant => "tenant",
            EntityType::User => "user",
            EntityType::Workspace => "workspace",
            EntityType::Application => "application",
            EntityType::Page => "page",
            EntityType::Action => "action",
            EntityType::Datasource => "datasource",
            EntityType::CommentThread => "comment_thread",
            EntityType::Comment => "comment",
            EntityType::Theme => "theme",
            EntityType::PermissionGroup => "permission_group",
        }
    }

    /// Parse entity type from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, accepts plurals and class names)
    ///
    /// # Returns
    ///
    /// `Some(EntityType)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use platform_acl::entities::EntityType;
    ///
    /// assert_eq!(EntityType::parse("workspace"), Some(EntityType::Workspace));
    /// assert_eq!(EntityType::parse("workspaces"), Some(EntityType::Workspace));
    /// assert_eq!(EntityType::parse("CommentThread"), Some(EntityType::CommentThread));
    /// assert_eq!(EntityType::parse("widget"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tenant" | "tenants" => Some(EntityType::Tenant),
            "user" | "users" => Some(EntityType::User),
            "workspace" | "workspaces" => Some(EntityType::Workspace),
            "application" | "applications" | "app" | "apps" => Some(EntityType::Application),
            "page" | "pages" => Some(EntityType::Page),
            "action" | "actions" => Some(EntityType::Action),
            "datasource" | "datasources" => Some(EntityType::Datasource),
            "comment_thread" | "commentthread" | "comment_threads" | "commentthreads"
            | "thread" | "threads" => Some(EntityType::CommentThread),
            "comment" | "comments" => Some(EntityType::Comment),
            "theme" | "themes" => Some(EntityType::Theme),
            "permission_group" | "permissiongroup" | "permission_groups" | "permissiongroups" => {
                Some(EntityType::PermissionGroup)
            }
            _ => None,
        }
    }

    /// Resolve an entity type by name.
    ///
    /// Same matching rules as [`EntityType::parse`], but a miss is reported
    /// as [`AclError::UnknownEntityType`].
    ///
    /// # Example
    ///
    /// ```
    /// use platform_acl::entities::EntityType;
    ///
    /// assert_eq!(EntityType::resolve("page").unwrap(), EntityType::Page);
    /// assert!(EntityType::resolve("widget").is_err());
    /// ```
    pub fn resolve(name: &str) -> AclResult<Self> {
        Self::parse(name).ok_or_else(|| AclError::UnknownEntityType(name.to_string()))
    }

    /// Get all entity types, in declaration order.
    pub fn all() -> Vec<Self> {
        vec![
            EntityType::Tenant,
            EntityType::User,
            EntityType::Workspace,
            EntityType::Application,
            EntityType::Page,
            EntityType::Action,
            EntityType::Datasource,
            EntityType::CommentThread,
            EntityType::Comment,
            EntityType::Theme,
            EntityType::PermissionGroup,
        ]
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}
