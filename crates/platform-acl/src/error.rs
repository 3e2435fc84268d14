//! Error types for catalog construction and resolution
//!
//! Every variant except `UnknownEntityType` is raised while a catalog is
//! being built and is fatal to startup. Lookup misses are not errors; they
//! surface as `None` or an empty `PermissionSet`.

use thiserror::Error;

use crate::entities::EntityType;

/// ACL catalog error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AclError {
    /// Two definitions share the same (identifier, entity type) pair
    #[error("Duplicate permission definition: {identifier} on {entity_type}")]
    DuplicateDefinition {
        /// Permission identifier
        identifier: String,
        /// Target entity type
        entity_type: EntityType,
    },

    /// The containment hierarchy or the composite mapping contains a cycle
    #[error("Cyclic hierarchy: {}", .path.join(" -> "))]
    CyclicHierarchy {
        /// Nodes along the cycle, first and last are the same node
        path: Vec<String>,
    },

    /// A composite entry refers to a permission that was never registered
    #[error("Unknown permission: {identifier} on {entity_type}")]
    UnknownPermission {
        /// Permission identifier
        identifier: String,
        /// Target entity type
        entity_type: EntityType,
    },

    /// An implied permission is not on the same or a contained entity type
    #[error("Invalid implication: {from} cannot imply {to}")]
    InvalidImplication {
        /// Coarse permission, rendered as `identifier@entity_type`
        from: String,
        /// Implied permission, rendered as `identifier@entity_type`
        to: String,
    },

    /// Identifier is not of the form `verb:resource`
    #[error("Invalid permission identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Entity type name did not resolve
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ACL catalog operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Check if this error invalidates a catalog under construction.
    ///
    /// `UnknownEntityType` is the only error a caller can hit after startup,
    /// when resolving a user-supplied entity name.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AclError::UnknownEntityType(_))
    }

    /// Get error code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::DuplicateDefinition { .. } => "DUPLICATE_DEFINITION",
            AclError::CyclicHierarchy { .. } => "CYCLIC_HIERARCHY",
            AclError::UnknownPermission { .. } => "UNKNOWN_PERMISSION",
            AclError::InvalidImplication { .. } => "INVALID_IMPLICATION",
            AclError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            AclError::UnknownEntityType(_) => "UNKNOWN_ENTITY_TYPE",
            AclError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<serde_json::Error> for AclError {
    fn from(err: serde_json::Error) -> Self {
        AclError::Config(err.to_string())
    }
}
