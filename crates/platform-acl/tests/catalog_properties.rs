//! Property tests for the permission catalog and composite resolution.
//!
//! Covered:
//! 1. (identifier, entity type) uniqueness and lookup round-trips
//! 2. Per-entity listing correctness
//! 3. Acyclicity validation of hierarchies and composite mappings, including
//!    long implication chains
//! 4. Transitivity and self-implication of composite grants
//! 5. Concurrent readers of the shared catalog

use std::collections::HashSet;
use std::sync::Arc;

use platform_acl::permissions::{self, MANAGE_APPLICATIONS, WORKSPACE_MANAGE_APPLICATIONS};
use platform_acl::{AclCatalog, AclError, CatalogConfig, EntityType, PermissionDef};

/// Minimal workspace/application/page catalog with a single composite.
fn workspace_to_application_config() -> CatalogConfig {
    CatalogConfig::empty()
        .with_permission("manage:workspaceApplications", EntityType::Workspace)
        .with_permission("manage:applications", EntityType::Application)
        .with_permission("manage:pages", EntityType::Page)
        .with_edge(EntityType::Workspace, EntityType::Application)
        .with_edge(EntityType::Application, EntityType::Page)
        .with_composite(
            PermissionDef::new("manage:workspaceApplications", EntityType::Workspace),
            vec![PermissionDef::new("manage:applications", EntityType::Application)],
        )
}

#[test]
fn test_pairs_are_unique() {
    let acl = AclCatalog::global();
    let pairs: HashSet<(&str, EntityType)> = acl
        .permissions()
        .iter()
        .map(|p| (p.identifier(), p.entity_type()))
        .collect();
    assert_eq!(pairs.len(), acl.permissions().len());
}

#[test]
fn test_lookup_round_trip() {
    let acl = AclCatalog::global();
    for permission in acl.permissions().iter() {
        assert_eq!(
            acl.lookup(permission.identifier(), permission.entity_type()),
            Some(permission)
        );
    }
    for permission in permissions::BUILTIN {
        assert_eq!(
            acl.lookup(permission.identifier(), permission.entity_type()),
            Some(permission)
        );
    }
}

#[test]
fn test_lookup_miss() {
    let acl = AclCatalog::global();
    assert_eq!(acl.lookup("nonexistent:thing", EntityType::Workspace), None);
}

#[test]
fn test_all_for_entity_type_is_a_partition() {
    let acl = AclCatalog::global();
    let mut total = 0;

    for entity_type in EntityType::all() {
        let listed = acl.all_for_entity_type(entity_type);
        assert!(listed.iter().all(|p| p.entity_type() == entity_type));

        let expected: Vec<_> = acl
            .permissions()
            .iter()
            .filter(|p| p.entity_type() == entity_type)
            .collect();
        assert_eq!(listed, expected, "listing for {entity_type}");
        total += listed.len();
    }

    assert_eq!(total, acl.permissions().len());
}

#[test]
fn test_same_identifier_on_two_entity_types() {
    let config = CatalogConfig::empty()
        .with_permission("read:items", EntityType::Page)
        .with_permission("read:items", EntityType::Action);
    let acl = AclCatalog::from_config(&config).unwrap();

    let on_page = acl.lookup("read:items", EntityType::Page).unwrap();
    let on_action = acl.lookup("read:items", EntityType::Action).unwrap();
    assert_ne!(on_page, on_action);
}

#[test]
fn test_duplicate_definition_is_fatal() {
    let config = CatalogConfig::empty()
        .with_permission("read:items", EntityType::Page)
        .with_permission("read:items", EntityType::Page);
    assert!(matches!(
        AclCatalog::from_config(&config),
        Err(AclError::DuplicateDefinition { .. })
    ));
}

#[test]
fn test_cyclic_mapping_is_rejected() {
    let config = workspace_to_application_config()
        .with_permission("read:applications", EntityType::Application)
        .with_composite(
            PermissionDef::new("manage:applications", EntityType::Application),
            vec![PermissionDef::new("read:applications", EntityType::Application)],
        )
        .with_composite(
            PermissionDef::new("read:applications", EntityType::Application),
            vec![PermissionDef::new("manage:applications", EntityType::Application)],
        );

    let err = AclCatalog::from_config(&config).unwrap_err();
    assert!(matches!(err, AclError::CyclicHierarchy { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_cyclic_hierarchy_is_rejected() {
    let config =
        workspace_to_application_config().with_edge(EntityType::Page, EntityType::Workspace);
    assert!(matches!(
        AclCatalog::from_config(&config),
        Err(AclError::CyclicHierarchy { .. })
    ));
}

#[test]
fn test_builtin_mapping_is_acyclic() {
    let acl = AclCatalog::global();
    for (coarse, _) in acl.composites().iter() {
        let expanded = acl.expand(coarse);
        for implied in expanded.iter().filter(|p| *p != coarse) {
            assert!(
                !acl.expand(implied).has(coarse),
                "{implied} leads back to {coarse}"
            );
        }
    }
}

/// Same-level chain `chain:r0 -> chain:r1 -> ... -> chain:r{depth-1}` on pages.
fn page_chain_config(depth: usize) -> CatalogConfig {
    let def = |i: usize| PermissionDef::new(format!("chain:r{i}"), EntityType::Page);
    let mut config = CatalogConfig::empty();
    for i in 0..depth {
        config = config.with_permission(format!("chain:r{i}"), EntityType::Page);
    }
    for i in 1..depth {
        config = config.with_composite(def(i - 1), vec![def(i)]);
    }
    config
}

#[test]
fn test_deep_composite_chain_is_accepted() {
    let depth = 20_000;
    let acl = AclCatalog::from_config(&page_chain_config(depth)).unwrap();

    let head = acl.lookup("chain:r0", EntityType::Page).unwrap();
    let tail = acl
        .lookup(&format!("chain:r{}", depth - 1), EntityType::Page)
        .unwrap();
    assert!(acl.implies(head, tail));
    assert_eq!(acl.implied_permissions(head, EntityType::Page).len(), depth);
}

#[test]
fn test_deep_composite_cycle_is_rejected() {
    let depth = 20_000;
    let config = page_chain_config(depth).with_composite(
        PermissionDef::new(format!("chain:r{}", depth - 1), EntityType::Page),
        vec![PermissionDef::new("chain:r0", EntityType::Page)],
    );

    match AclCatalog::from_config(&config) {
        Err(AclError::CyclicHierarchy { path }) => {
            assert_eq!(path.len(), depth + 1);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected a cyclic mapping error, got {other:?}"),
    }
}

#[test]
fn test_workspace_grant_scenario() {
    let acl = AclCatalog::from_config(&workspace_to_application_config()).unwrap();
    let granted = acl
        .lookup("manage:workspaceApplications", EntityType::Workspace)
        .unwrap();

    let on_application = acl.implied_permissions(granted, EntityType::Application);
    assert!(on_application.has(&MANAGE_APPLICATIONS));
    assert_eq!(on_application.len(), 1);

    let on_page = acl.implied_permissions(granted, EntityType::Page);
    assert!(on_page.is_empty());
}

#[test]
fn test_chained_composite_reaches_pages() {
    let config = workspace_to_application_config().with_composite(
        PermissionDef::new("manage:applications", EntityType::Application),
        vec![PermissionDef::new("manage:pages", EntityType::Page)],
    );
    let acl = AclCatalog::from_config(&config).unwrap();

    let on_page = acl.implied_permissions(&WORKSPACE_MANAGE_APPLICATIONS, EntityType::Page);
    assert!(on_page.has(&permissions::MANAGE_PAGES));
}

#[test]
fn test_transitivity() {
    let acl = AclCatalog::global();
    for (p, direct) in acl.composites().iter() {
        for q in direct {
            for r in acl.composites_of(q) {
                assert!(
                    acl.implied_permissions(p, r.entity_type()).has(r),
                    "{p} -> {q} -> {r}"
                );
            }
        }
    }
}

#[test]
fn test_self_implication() {
    let acl = AclCatalog::global();
    for permission in acl.permissions().iter() {
        assert!(acl
            .implied_permissions(permission, permission.entity_type())
            .has(permission));
        assert!(acl.implies(permission, permission));
    }
}

#[test]
fn test_multiple_siblings_returned() {
    let acl = AclCatalog::global();
    let implied =
        acl.implied_permissions(&permissions::MANAGE_DATASOURCES, EntityType::Datasource);
    let ids: Vec<&str> = implied.iter().map(|p| p.identifier()).collect();
    assert_eq!(
        ids,
        vec![
            "create:datasourceActions",
            "execute:datasources",
            "manage:datasources",
            "read:datasources",
        ]
    );
}

#[test]
fn test_config_json_builds_same_catalog() {
    let json = serde_json::to_string(&CatalogConfig::builtin()).unwrap();
    let acl = AclCatalog::from_config(&CatalogConfig::from_json(&json).unwrap()).unwrap();
    let global = AclCatalog::global();

    assert_eq!(acl.permissions().len(), global.permissions().len());
    assert_eq!(
        acl.expand(&WORKSPACE_MANAGE_APPLICATIONS),
        global.expand(&WORKSPACE_MANAGE_APPLICATIONS)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_see_same_catalog() {
    let custom = Arc::new(AclCatalog::from_config(&workspace_to_application_config()).unwrap());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let custom = Arc::clone(&custom);
        handles.push(tokio::spawn(async move {
            let global = AclCatalog::global();
            let implied = global
                .implied_permissions(&WORKSPACE_MANAGE_APPLICATIONS, EntityType::Application);
            let local = custom
                .implied_permissions(&WORKSPACE_MANAGE_APPLICATIONS, EntityType::Application);
            (global as *const AclCatalog as usize, implied, local)
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let (first_ptr, first_implied, first_local) = &results[0];
    for (ptr, implied, local) in &results {
        assert_eq!(ptr, first_ptr);
        assert_eq!(implied, first_implied);
        assert_eq!(local, first_local);
    }
    assert!(first_local.has(&MANAGE_APPLICATIONS));
}
