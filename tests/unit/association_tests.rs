//! Unit tests for references, collections and indirection tables

use pretty_assertions::assert_eq;
use rust_ormgen::metadata::ForeignKey;
use rust_ormgen::model::JdbcType;
use rust_ormgen::{ChecksMode, MappingErrorKind};

use crate::{resolve_err, resolve_ok, resolve_xml};

/// `test.A` owning a 1:N collection of `test.B` through `B.aid`
fn one_to_many(aid_type: &str, foreignkey: &str) -> String {
    format!(
        r#"<declarations>
            <class name="test.A">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
              <field name="bs" type="test.B[]"><ojb.collection foreignkey="{}"/></field>
            </class>
            <class name="test.B">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
              <field name="aid" type="{}"><ojb.field/></field>
            </class>
          </declarations>"#,
        foreignkey, aid_type
    )
}

/// `test.B` referencing `test.A` through `B.aid`
fn reference(aid_type: &str, foreignkey: &str) -> String {
    format!(
        r#"<declarations>
            <class name="test.A">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
            </class>
            <class name="test.B">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
              <field name="aid" type="{}"><ojb.field/></field>
              <field name="a" type="test.A"><ojb.reference foreignkey="{}"/></field>
            </class>
          </declarations>"#,
        aid_type, foreignkey
    )
}

// ============================================================================
// 1:N collections
// ============================================================================

#[test]
fn test_one_to_many_inverse_foreign_key() {
    let model = resolve_ok(&one_to_many("int", "aid"));

    let collection = model.class("test.A").unwrap().collection("bs").unwrap();
    assert_eq!(collection.element_class_ref, "test.B");
    assert_eq!(collection.foreign_keys, vec!["aid"]);
    assert!(!collection.is_many_to_many());

    let b_table = model.schema.table("B").unwrap();
    assert_eq!(
        b_table.foreign_keys,
        vec![ForeignKey {
            foreign_table: "A".to_string(),
            references: vec![("aid".to_string(), "id".to_string())],
        }]
    );
}

#[test]
fn test_database_foreignkey_false_skips_constraint() {
    let xml = one_to_many("int", "aid").replace(
        r#"foreignkey="aid""#,
        r#"foreignkey="aid" database-foreignkey="false""#,
    );
    let model = resolve_ok(&xml);
    assert!(model.class("test.A").unwrap().collection("bs").is_some());
    assert!(model.schema.table("B").unwrap().foreign_keys.is_empty());
}

#[test]
fn test_inverse_foreign_key_must_exist_on_element() {
    assert_eq!(
        resolve_err(&one_to_many("int", "missing")),
        MappingErrorKind::UnresolvedReference
    );
}

#[test]
fn test_orderby_field_must_exist_on_element() {
    let xml = one_to_many("int", "aid").replace(
        r#"foreignkey="aid""#,
        r#"foreignkey="aid" orderby="nope=DESC""#,
    );
    assert_eq!(resolve_err(&xml), MappingErrorKind::UnresolvedReference);

    let xml = one_to_many("int", "aid").replace(
        r#"foreignkey="aid""#,
        r#"foreignkey="aid" orderby="id=DESC""#,
    );
    let model = resolve_ok(&xml);
    let orderby = &model.class("test.A").unwrap().collection("bs").unwrap().orderby;
    assert_eq!(orderby[0].field, "id");
    assert!(orderby[0].descending);
}

// ============================================================================
// Arity and type symmetry
// ============================================================================

#[test]
fn test_reference_arity_and_type_checks() {
    let model = resolve_ok(&reference("int", "aid"));
    let b = model.class("test.B").unwrap();
    assert_eq!(b.reference("a").unwrap().class_ref, "test.A");
    assert_eq!(
        model.schema.table("B").unwrap().foreign_keys[0].foreign_table,
        "A"
    );

    assert_eq!(
        resolve_err(&reference("int", "aid,id")),
        MappingErrorKind::ArityMismatch
    );
    assert_eq!(
        resolve_err(&reference("long", "aid")),
        MappingErrorKind::TypeMismatch
    );
}

#[test]
fn test_inverse_collection_arity_and_type_checks() {
    assert_eq!(
        resolve_err(&one_to_many("int", "aid,id")),
        MappingErrorKind::ArityMismatch
    );
    assert_eq!(
        resolve_err(&one_to_many("java.lang.String", "aid")),
        MappingErrorKind::TypeMismatch
    );
}

#[test]
fn test_indirection_table_arity_check() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="A_B" foreignkey="A_ID" remote-foreignkey="B_ID,B_ID2"/>
          </field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::ArityMismatch);
}

#[test]
fn test_anonymous_reference_uses_anonymous_key() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <ojb.field name="aid" jdbc-type="INTEGER"/>
          <ojb.reference name="a" class-ref="test.A" foreignkey="aid"/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let reference = model.class("test.B").unwrap().reference("a").unwrap();
    assert!(reference.anonymous);
    assert_eq!(reference.class_ref, "test.A");
}

#[test]
fn test_reference_to_non_persistent_class_fails() {
    let xml = r#"<declarations>
        <class name="test.A">
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="aid" type="int"><ojb.field/></field>
          <field name="a" type="test.A"><ojb.reference foreignkey="aid"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::UnresolvedReference);
}

// ============================================================================
// M:N collections
// ============================================================================

const SELF_REFERENTIAL: &str = r#"<declarations>
    <class name="test.A">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="children" type="test.A[]">
        <ojb.collection indirection-table="A_B" foreignkey="PARENT_ID" remote-foreignkey="CHILD_ID"/>
      </field>
      <field name="parents" type="test.A[]">
        <ojb.collection indirection-table="A_B" foreignkey="CHILD_ID" remote-foreignkey="PARENT_ID"/>
      </field>
    </class>
  </declarations>"#;

#[test]
fn test_self_referential_many_to_many() {
    let model = resolve_ok(SELF_REFERENTIAL);

    let join = model.schema.table("A_B").unwrap();
    let columns: Vec<&str> = join.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["PARENT_ID", "CHILD_ID"]);
    assert!(join.columns.iter().all(|c| c.jdbc_type == JdbcType::INTEGER));

    assert_eq!(join.foreign_keys.len(), 2);
    for fk in &join.foreign_keys {
        assert_eq!(fk.foreign_table, "A");
        assert_eq!(fk.references[0].1, "id");
    }

    let children = model.class("test.A").unwrap().collection("children").unwrap();
    assert!(children.is_many_to_many());
    assert_eq!(children.foreign_keys, vec!["PARENT_ID"]);
    assert_eq!(children.remote_foreign_keys, vec!["CHILD_ID"]);
}

#[test]
fn test_remote_foreign_key_taken_from_counterpart() {
    let xml = SELF_REFERENTIAL.replacen(r#" remote-foreignkey="CHILD_ID""#, "", 1);
    let model = resolve_ok(&xml);
    let children = model.class("test.A").unwrap().collection("children").unwrap();
    assert_eq!(children.remote_foreign_keys, vec!["CHILD_ID"]);
}

#[test]
fn test_counterparts_must_agree_on_columns() {
    let xml = SELF_REFERENTIAL.replacen(
        r#"remote-foreignkey="CHILD_ID""#,
        r#"remote-foreignkey="OTHER_ID""#,
        1,
    );
    assert_eq!(resolve_err(&xml), MappingErrorKind::StructuralConflict);
}

#[test]
fn test_same_column_on_both_sides_fails() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="A_B" foreignkey="X_ID" remote-foreignkey="X_ID"/>
          </field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::StructuralConflict);
}

#[test]
fn test_missing_remote_foreign_key_fails() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="A_B" foreignkey="A_ID"/>
          </field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::UnresolvedReference);
}

#[test]
fn test_indirection_table_primary_keys() {
    let xml = SELF_REFERENTIAL.replace(
        r#"indirection-table="A_B""#,
        r#"indirection-table="A_B" indirection-table-primarykeys="true""#,
    );
    let model = resolve_ok(&xml);
    let join = model.schema.table("A_B").unwrap();
    assert!(join.columns.iter().all(|c| c.primary_key && c.required));
}

// ============================================================================
// Element class redefinition and containers
// ============================================================================

const OWNER_WITH_REDEFINED_ELEMENT: &str = r#"<declarations>
    <class name="test.Owner">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="items" type="test.Item[]"><ojb.collection foreignkey="ownerId"/></field>
    </class>
    <class name="test.SpecialOwner" extends="test.Owner">
      <ojb.modify-inherited name="items" element-class-ref="test.Other"/>
    </class>
    <class name="test.Item">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="ownerId" type="int"><ojb.field/></field>
    </class>
    <class name="test.Other">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="ownerId" type="int"><ojb.field/></field>
    </class>
  </declarations>"#;

#[test]
fn test_unrelated_element_class_fails_in_strict_mode() {
    let err = resolve_xml(OWNER_WITH_REDEFINED_ELEMENT, ChecksMode::Strict).unwrap_err();
    assert_eq!(err.kind(), MappingErrorKind::TypeMismatch);
    assert!(err.to_string().contains("test.SpecialOwner"));
}

#[test]
fn test_unrelated_element_class_accepted_in_basic_mode() {
    let model = resolve_xml(OWNER_WITH_REDEFINED_ELEMENT, ChecksMode::Basic)
        .expect("Basic mode should accept the redefinition");
    let special = model.class("test.SpecialOwner").unwrap();
    let items = special.collection("items").unwrap();
    assert_eq!(items.element_class_ref, "test.Other");
    assert_eq!(items.declared_in, "test.Owner");
    assert_eq!(
        model
            .class("test.Owner")
            .unwrap()
            .collection("items")
            .unwrap()
            .element_class_ref,
        "test.Item"
    );
}

fn list_collection(collection_class: &str) -> String {
    format!(
        r#"<declarations>
            <class name="test.A">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
              <field name="bs" type="java.util.List&lt;test.B&gt;">
                <ojb.collection foreignkey="aid" collection-class="{}"/>
              </field>
            </class>
            <class name="test.B">
              <ojb.class/>
              <field name="id" type="int"><ojb.field primarykey="true"/></field>
              <field name="aid" type="int"><ojb.field/></field>
            </class>
          </declarations>"#,
        collection_class
    )
}

#[test]
fn test_collection_class_must_be_manageable() {
    let xml = list_collection("java.util.ArrayList");
    assert_eq!(resolve_err(&xml), MappingErrorKind::ContainerCompatibility);
    assert!(resolve_xml(&xml, ChecksMode::Basic).is_ok());

    let model = resolve_ok(&list_collection(
        "org.apache.ojb.broker.util.collections.RemovalAwareList",
    ));
    let collection = model.class("test.A").unwrap().collection("bs").unwrap();
    assert_eq!(collection.element_class_ref, "test.B");
}

#[test]
fn test_collection_class_must_match_container_interface() {
    let xml = list_collection("org.apache.ojb.broker.util.collections.ManageableHashSet");
    assert_eq!(resolve_err(&xml), MappingErrorKind::ContainerCompatibility);
}

#[test]
fn test_unknown_collection_class_fails() {
    let xml = list_collection("test.NoSuchCollection");
    assert_eq!(resolve_err(&xml), MappingErrorKind::UnresolvedReference);
}

#[test]
fn test_array_member_requires_array_backed_collection() {
    let array = one_to_many("int", "aid").replace(
        r#"foreignkey="aid""#,
        r#"foreignkey="aid" collection-class="org.apache.ojb.broker.util.collections.ManageableHashSet""#,
    );
    assert_eq!(resolve_err(&array), MappingErrorKind::ContainerCompatibility);

    let array = one_to_many("int", "aid").replace(
        r#"foreignkey="aid""#,
        r#"foreignkey="aid" collection-class="org.apache.ojb.broker.util.collections.ManageableVector""#,
    );
    resolve_ok(&array);
}

// ============================================================================
// Constraints of collections declared by non-persistent supertypes
// ============================================================================

const NON_PERSISTENT_DECLARER: &str = r#"<declarations>
    <class name="test.Base">
      <ojb.class generate-repository-info="false"/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="bs" type="test.B[]"><ojb.collection foreignkey="aid"/></field>
      <field name="cs" type="test.C[]">
        <ojb.collection indirection-table="A_C" foreignkey="A_ID" remote-foreignkey="C_ID"/>
      </field>
    </class>
    <class name="test.A" extends="test.Base">
      <ojb.class/>
    </class>
    <class name="test.B">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
      <field name="aid" type="int"><ojb.field/></field>
    </class>
    <class name="test.C">
      <ojb.class/>
      <field name="id" type="int"><ojb.field primarykey="true"/></field>
    </class>
  </declarations>"#;

#[test]
fn test_inverse_constraint_from_non_persistent_declarer() {
    let model = resolve_ok(NON_PERSISTENT_DECLARER);
    assert!(model.class("test.Base").is_none());
    assert!(model.class("test.A").unwrap().collection("bs").is_some());

    assert_eq!(
        model.schema.table("B").unwrap().foreign_keys,
        vec![ForeignKey {
            foreign_table: "A".to_string(),
            references: vec![("aid".to_string(), "id".to_string())],
        }]
    );
}

#[test]
fn test_join_table_constraints_from_non_persistent_declarer() {
    let model = resolve_ok(NON_PERSISTENT_DECLARER);

    let join = model.schema.table("A_C").unwrap();
    assert_eq!(
        join.foreign_keys,
        vec![
            ForeignKey {
                foreign_table: "A".to_string(),
                references: vec![("A_ID".to_string(), "id".to_string())],
            },
            ForeignKey {
                foreign_table: "C".to_string(),
                references: vec![("C_ID".to_string(), "id".to_string())],
            },
        ]
    );
}

#[test]
fn test_inverse_constraint_from_unmarked_interface() {
    let xml = r#"<declarations>
        <interface name="test.Owner">
          <field name="bs" type="test.B[]"><ojb.collection foreignkey="aid"/></field>
        </interface>
        <class name="test.A" implements="test.Owner">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="aid" type="int"><ojb.field/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let foreign_tables: Vec<&str> = model
        .schema
        .table("B")
        .unwrap()
        .foreign_keys
        .iter()
        .map(|fk| fk.foreign_table.as_str())
        .collect();
    assert_eq!(foreign_tables, vec!["A"]);
}

// ============================================================================
// Shared indirection tables
// ============================================================================

#[test]
fn test_shared_join_table_with_conflicting_key_types_fails() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="J" foreignkey="O_ID" remote-foreignkey="B_ID"/>
          </field>
        </class>
        <class name="test.C">
          <ojb.class/>
          <field name="id" type="java.lang.String"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="J" foreignkey="O_ID" remote-foreignkey="B_ID"/>
          </field>
        </class>
        <class name="test.B">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::StructuralConflict);
}
