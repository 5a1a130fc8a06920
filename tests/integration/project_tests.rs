//! Integration tests for .ormproj parsing against the fixtures

use pretty_assertions::assert_eq;
use rust_ormgen::project::{parse_ormproj, DEFAULT_DESCRIPTOR_FILE, DEFAULT_SCHEMA_FILE};
use rust_ormgen::ChecksMode;

use crate::common::TestContext;

#[test]
fn test_parse_shop_project() {
    let ctx = TestContext::with_fixture("shop");
    let project = parse_ormproj(&ctx.project_path()).expect("Should parse project");

    assert_eq!(project.name, "Shop");
    assert_eq!(project.database_name, "shopdb");
    assert_eq!(project.checks, ChecksMode::Strict);
    assert_eq!(project.descriptor_file, DEFAULT_DESCRIPTOR_FILE);
    assert_eq!(project.schema_file, DEFAULT_SCHEMA_FILE);
    assert_eq!(project.project_dir, ctx.project_dir);

    // draft.xml is matched by the Include glob and dropped by Remove
    assert_eq!(
        project.sources,
        vec![
            ctx.project_dir.join("model/customer.xml"),
            ctx.project_dir.join("model/order.xml"),
        ]
    );
}

#[test]
fn test_parse_project_without_sources_scans_directory() {
    let ctx = TestContext::with_fixture("broken");
    let project = parse_ormproj(&ctx.project_path()).expect("Should parse project");

    assert_eq!(project.name, "Broken");
    assert_eq!(project.database_name, "Broken");
    assert_eq!(project.sources, vec![ctx.project_dir.join("model/model.xml")]);
}

#[test]
fn test_scan_ignores_previous_output() {
    let ctx = TestContext::with_fixture("broken");
    std::fs::create_dir_all(ctx.build_dir()).unwrap();
    std::fs::write(ctx.build_dir().join("repository_user.xml"), "<descriptor-repository/>")
        .unwrap();

    let project = parse_ormproj(&ctx.project_path()).unwrap();
    assert_eq!(project.sources.len(), 1);
}

#[test]
fn test_parse_project_with_explicit_sources_and_file_names() {
    let ctx = TestContext::with_fixture("redefined_element");
    let project = parse_ormproj(&ctx.project_path()).expect("Should parse project");

    assert_eq!(project.checks, ChecksMode::Basic);
    assert_eq!(project.descriptor_file, "repository.xml");
    assert_eq!(project.schema_file, "schema.xml");
    assert_eq!(
        project.sources,
        vec![
            ctx.project_dir.join("model/items.xml"),
            ctx.project_dir.join("model/owners.xml"),
        ]
    );
}

#[test]
fn test_missing_explicit_source_fails() {
    let ctx = TestContext::with_fixture("redefined_element");
    std::fs::remove_file(ctx.project_dir.join("model/items.xml")).unwrap();

    let err = parse_ormproj(&ctx.project_path()).unwrap_err();
    assert!(
        format!("{:#}", err).contains("model/items.xml"),
        "Error should name the missing source: {:#}",
        err
    );
}

#[test]
fn test_non_project_root_is_rejected() {
    let ctx = TestContext::with_fixture("shop");
    std::fs::write(ctx.project_path(), "<declarations/>").unwrap();

    let err = parse_ormproj(&ctx.project_path()).unwrap_err();
    assert!(err
        .downcast_ref::<rust_ormgen::OrmGenError>()
        .is_some_and(|e| matches!(e, rust_ormgen::OrmGenError::InvalidProjectFormat { .. })));
}
