//! Unit tests for persistence participation, tables and extents

use pretty_assertions::assert_eq;
use rust_ormgen::MappingErrorKind;

use crate::{resolve_err, resolve_ok};

fn extents(model: &rust_ormgen::ResolvedModel, class: &str) -> Vec<String> {
    model.class(class).unwrap().extents.clone()
}

#[test]
fn test_extents_skip_non_persistent_intermediate() {
    let xml = r#"<declarations>
        <class name="test.A"><ojb.class/></class>
        <class name="test.B" extends="test.A"><ojb.class generate-repository-info="false"/></class>
        <class name="test.D" extends="test.B"><ojb.class/></class>
        <class name="test.E" extends="test.D"/>
      </declarations>"#;
    let model = resolve_ok(xml);

    assert_eq!(extents(&model, "test.A"), vec!["test.D", "test.E"]);
    assert_eq!(extents(&model, "test.D"), vec!["test.E"]);
    assert!(model.class("test.B").is_none());
}

#[test]
fn test_extents_follow_declaration_order_depth_first() {
    let xml = r#"<declarations>
        <class name="test.Root"><ojb.class/></class>
        <class name="test.Left" extends="test.Root"/>
        <class name="test.Right" extends="test.Root"/>
        <class name="test.LeftChild" extends="test.Left"/>
      </declarations>"#;
    let model = resolve_ok(xml);
    assert_eq!(
        extents(&model, "test.Root"),
        vec!["test.Left", "test.LeftChild", "test.Right"]
    );
}

#[test]
fn test_interface_extents_include_implementors() {
    let xml = r#"<declarations>
        <interface name="test.Shape"><ojb.class generate-table-info="false"/></interface>
        <class name="test.Circle" implements="test.Shape"><ojb.class/></class>
        <class name="test.Square" implements="test.Shape"><ojb.class/></class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let shape = model.class("test.Shape").unwrap();
    assert!(shape.is_interface);
    assert_eq!(shape.table, None);
    assert_eq!(shape.extents, vec!["test.Circle", "test.Square"]);
}

#[test]
fn test_explicit_extent_without_automatic_discovery() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class determine-extents="false"/>
          <ojb.extent-class class-ref="test.C"/>
        </class>
        <class name="test.B" extends="test.A"/>
        <class name="test.C" extends="test.A"/>
      </declarations>"#;
    let model = resolve_ok(xml);
    assert_eq!(extents(&model, "test.A"), vec!["test.C"]);
}

#[test]
fn test_extent_class_must_be_persistent_subtype() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <ojb.extent-class class-ref="test.Unrelated"/>
        </class>
        <class name="test.Unrelated"><ojb.class/></class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::UnresolvedReference);
}

#[test]
fn test_table_names() {
    let xml = r#"<declarations>
        <class name="test.Outer$Inner"><ojb.class/></class>
        <class name="test.Named"><ojb.class table="NAMED_TAB"/></class>
        <class name="test.MetaOnly"><ojb.class generate-table-info="false"/></class>
        <class name="test.Plain"/>
      </declarations>"#;
    let model = resolve_ok(xml);

    assert_eq!(model.class("test.Outer$Inner").unwrap().table.as_deref(), Some("Inner"));
    assert_eq!(model.class("test.Named").unwrap().table.as_deref(), Some("NAMED_TAB"));
    assert_eq!(model.class("test.MetaOnly").unwrap().table, None);
    assert!(model.class("test.Plain").is_none());

    let tables: Vec<&str> = model.schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tables, vec!["Inner", "NAMED_TAB"]);
}

#[test]
fn test_subclass_marker_can_disable_inherited_persistence_for_itself_only() {
    let xml = r#"<declarations>
        <class name="test.A"><ojb.class/></class>
        <class name="test.B" extends="test.A"><ojb.class generate-repository-info="false"/></class>
        <class name="test.C" extends="test.B"/>
      </declarations>"#;
    let model = resolve_ok(xml);
    assert!(model.class("test.B").is_none());
    assert!(model.class("test.C").is_some());
}

#[test]
fn test_supertype_cycle_fails() {
    let xml = r#"<declarations>
        <class name="test.A" extends="test.B"><ojb.class/></class>
        <class name="test.B" extends="test.A"/>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::StructuralConflict);
}

#[test]
fn test_invalid_isolation_level_fails() {
    let xml = r#"<declarations>
        <class name="test.A"><ojb.class isolation-level="sometimes"/></class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::InvalidOptionValue);
}
