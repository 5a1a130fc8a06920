//! Unit tests for the schema view: columns, shared tables and indexes

use pretty_assertions::assert_eq;
use rust_ormgen::metadata::Index;
use rust_ormgen::model::JdbcType;
use rust_ormgen::{ChecksMode, MappingErrorKind};

use crate::{resolve_err, resolve_ok, resolve_xml};

#[test]
fn test_column_defaults() {
    let xml = r#"<declarations>
        <class name="test.Product">
          <ojb.class table="PRODUCT"/>
          <field name="id" type="long"><ojb.field primarykey="true" autoincrement="database"/></field>
          <field name="name" type="java.lang.String"><ojb.field nullable="false"/></field>
          <field name="code" type="char"><ojb.field/></field>
          <field name="price" type="java.math.BigDecimal"><ojb.field column-documentation="gross"/></field>
          <field name="stock" type="int"><ojb.field default-value="0"/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let table = model.schema.table("PRODUCT").unwrap();

    let id = table.column("id").unwrap();
    assert_eq!(id.jdbc_type, JdbcType::BIGINT);
    assert!(id.primary_key && id.required && id.auto_increment);

    let name = table.column("name").unwrap();
    assert_eq!(name.jdbc_type, JdbcType::VARCHAR);
    assert_eq!(name.size.as_deref(), Some("254"));
    assert!(name.required);

    assert_eq!(table.column("code").unwrap().size.as_deref(), Some("1"));

    let price = table.column("price").unwrap();
    assert_eq!(price.jdbc_type, JdbcType::DECIMAL);
    assert_eq!(price.size.as_deref(), Some("20,0"));
    assert_eq!(price.description.as_deref(), Some("gross"));
    assert!(!price.required);

    assert_eq!(table.column("stock").unwrap().default_value.as_deref(), Some("0"));
}

#[test]
fn test_explicit_jdbc_type_suppresses_conversion() {
    let xml = r#"<declarations>
        <class name="test.Doc">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="payload" type="test.Payload"><ojb.field/></field>
          <field name="raw" type="test.Payload"><ojb.field jdbc-type="BLOB"/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let doc = model.class("test.Doc").unwrap();
    assert_eq!(doc.field("payload").unwrap().jdbc_type, JdbcType::LONGVARBINARY);
    assert!(doc.field("payload").unwrap().conversion.is_some());
    assert_eq!(doc.field("raw").unwrap().jdbc_type, JdbcType::BLOB);
    assert_eq!(doc.field("raw").unwrap().conversion, None);
}

#[test]
fn test_shared_table_merges_columns() {
    let xml = r#"<declarations>
        <class name="test.Person">
          <ojb.class table="PARTY"/>
          <field name="id" type="int"><ojb.field primarykey="true" column="ID"/></field>
          <field name="firstName" type="java.lang.String"><ojb.field column="FIRST_NAME"/></field>
        </class>
        <class name="test.Company">
          <ojb.class table="PARTY"/>
          <field name="id" type="int"><ojb.field primarykey="true" column="ID"/></field>
          <field name="legalName" type="java.lang.String"><ojb.field column="LEGAL_NAME"/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    assert_eq!(model.schema.tables.len(), 1);
    let columns: Vec<&str> = model.schema.tables[0]
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(columns, vec!["ID", "FIRST_NAME", "LEGAL_NAME"]);
}

#[test]
fn test_shared_table_column_type_conflict_fails() {
    let xml = r#"<declarations>
        <class name="test.Person">
          <ojb.class table="PARTY"/>
          <field name="id" type="int"><ojb.field primarykey="true" column="ID"/></field>
        </class>
        <class name="test.Company">
          <ojb.class table="PARTY"/>
          <field name="id" type="long"><ojb.field primarykey="true" column="ID"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::StructuralConflict);
}

#[test]
fn test_indexes() {
    let xml = r#"<declarations>
        <class name="test.User">
          <ojb.class table="USERS"/>
          <ojb.index name="USERS_LOGIN_UQ" fields="login,realm" unique="true"/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="login" type="java.lang.String"><ojb.field column="LOGIN" indexed="true"/></field>
          <field name="realm" type="java.lang.String"><ojb.field column="REALM"/></field>
        </class>
      </declarations>"#;
    let model = resolve_ok(xml);
    let table = model.schema.table("USERS").unwrap();
    assert_eq!(
        table.indices,
        vec![
            Index {
                name: "USERS_LOGIN_IDX".to_string(),
                unique: false,
                columns: vec!["LOGIN".to_string()],
            },
            Index {
                name: "USERS_LOGIN_UQ".to_string(),
                unique: true,
                columns: vec!["LOGIN".to_string(), "REALM".to_string()],
            },
        ]
    );
}

#[test]
fn test_index_on_unknown_field_fails() {
    let xml = r#"<declarations>
        <class name="test.User">
          <ojb.class/>
          <ojb.index name="IDX" fields="missing"/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
        </class>
      </declarations>"#;
    assert_eq!(resolve_err(xml), MappingErrorKind::UnresolvedReference);
}

#[test]
fn test_resolution_is_deterministic() {
    let xml = r#"<declarations>
        <class name="test.A">
          <ojb.class/>
          <field name="id" type="int"><ojb.field primarykey="true"/></field>
          <field name="bs" type="test.B[]">
            <ojb.collection indirection-table="A_B" foreignkey="A_ID" remote-foreignkey="B_ID"/>
          </field>
        </class>
        <class name="test.B" extends="test.A">
          <field name="name" type="java.lang.String"><ojb.field indexed="true"/></field>
        </class>
      </declarations>"#;
    let first = resolve_xml(xml, ChecksMode::Strict).unwrap();
    let second = resolve_xml(xml, ChecksMode::Strict).unwrap();
    assert_eq!(first, second);

    let first_docs = rust_ormgen::emit::render_outputs(&first).unwrap();
    let second_docs = rust_ormgen::emit::render_outputs(&second).unwrap();
    assert_eq!(first_docs.descriptor, second_docs.descriptor);
    assert_eq!(first_docs.schema, second_docs.schema);
}

#[test]
fn test_database_name_is_placed_on_schema() {
    let xml = r#"<declarations><class name="test.A"><ojb.class/></class></declarations>"#;
    let model = resolve_ok(xml);
    assert_eq!(model.schema.database_name, "testdb");
}
