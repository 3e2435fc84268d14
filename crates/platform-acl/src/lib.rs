//! # Platform ACL
//!
//! This crate is the permission catalog for the Relay platform's
//! multi-tenant resource hierarchy. Authorization checks use it to resolve
//! a permission by name and to expand composite grants.
//!
//! ## Overview
//!
//! The platform-acl crate handles:
//! - **Entity types**: The closed set of resource kinds (Tenant, Workspace, Application, ...)
//! - **Permissions**: `verb:resource` identifiers bound to a single entity type
//! - **Catalog**: Unique (identifier, entity type) pairs with exact lookup
//! - **Hierarchy**: Containment edges between entity types
//! - **Composites**: Coarse grants implying finer permissions further down
//!
//! ## Architecture
//!
//! ```text
//! Permission = Identifier + EntityType
//!
//! Tenant ─┬─ User ── Workspace
//!         └─ Workspace ─┬─ Application ─┬─ Page ── Action
//!                       │               └─ CommentThread ── Comment
//!                       ├─ Datasource
//!                       └─ PermissionGroup
//!
//! manage:workspaceApplications@workspace
//!   └─ manage:applications@application
//!        └─ manage:pages@page
//!             └─ manage:actions@action
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_acl::{AclCatalog, EntityType};
//! use platform_acl::permissions::{MANAGE_ACTIONS, WORKSPACE_MANAGE_APPLICATIONS};
//!
//! let acl = AclCatalog::global();
//!
//! // Exact lookup on identifier and entity type
//! let perm = acl.lookup("manage:workspaceApplications", EntityType::Workspace).unwrap();
//! assert!(acl.lookup("manage:workspaceApplications", EntityType::Application).is_none());
//!
//! // A workspace-level grant implies action-level permissions
//! let implied = acl.implied_permissions(perm, EntityType::Action);
//! assert!(implied.has(&MANAGE_ACTIONS));
//! assert!(acl.implies(&WORKSPACE_MANAGE_APPLICATIONS, &MANAGE_ACTIONS));
//! ```
//!
//! ## Configuration
//!
//! [`AclCatalog::global`] uses the compiled-in table. Deployments that
//! define their own table load it with [`CatalogConfig::from_env`] (reads
//! the JSON file named by `ACL_CATALOG_PATH`) and build it with
//! [`AclCatalog::from_config`]. A table that fails validation never
//! produces a catalog.

pub mod acl;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod permissions;

// Re-export main types for convenience
pub use acl::AclCatalog;
pub use catalog::{PermissionCatalog, PermissionCatalogBuilder};
pub use composite::CompositeMapping;
pub use config::{CatalogConfig, CompositeDef, PermissionDef};
pub use entities::EntityType;
pub use error::{AclError, AclResult};
pub use hierarchy::{EntityHierarchy, HierarchyEdge};
pub use permissions::{Permission, PermissionSet};
