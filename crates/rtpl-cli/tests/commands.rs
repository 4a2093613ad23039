//! Command-level tests: files in, rule text out.

use std::fs;
use std::io::Write;

use rtpl_cli::commands::{load_model, render, variables, write_output};
use rtpl_drl::{MarshalMode, MarshalOptions};
use tempfile::{NamedTempFile, TempDir};

const RULE_JSON: &str = r#"{
    "name": "t1",
    "lhs": [
        {
            "kind": "fact",
            "fact_type": "Person",
            "constraints": [
                { "kind": "single", "field_name": "field1", "operator": "==", "value": "$f1", "value_kind": "template" },
                { "kind": "single", "field_name": "field2", "operator": "==", "value": "$f2", "value_kind": "template" }
            ]
        }
    ]
}"#;

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn csv_rows_render_one_rule_each() {
    let model_file = temp_file(RULE_JSON);
    let rows_file = temp_file("$f1,$f2\nfoo,bar\n,baz\n");
    let model = load_model(model_file.path(), Some(rows_file.path())).unwrap();
    assert_eq!(model.row_count(), 2);

    let macro_text = render(&model, MarshalOptions::default()).unwrap();
    let direct_text = render(
        &model,
        MarshalOptions::default().with_mode(MarshalMode::Direct),
    )
    .unwrap();
    assert_eq!(squash(&macro_text), squash(&direct_text));
    insta::assert_snapshot!(squash(&macro_text), @r#"rule "t1_0" dialect "mvel" when Person( field1 == "foo", field2 == "bar" ) then end rule "t1_1" dialect "mvel" when Person( field2 == "baz" ) then end"#);
}

#[test]
fn csv_rows_replace_embedded_rows() {
    let json = format!(r#"{{ "rule": {RULE_JSON}, "rows": [["a", "b"], ["c", "d"], ["e", "f"]] }}"#);
    let model_file = temp_file(&json);

    let embedded = load_model(model_file.path(), None).unwrap();
    assert_eq!(embedded.row_count(), 3);

    let rows_file = temp_file("f2\nonly\n");
    let replaced = load_model(model_file.path(), Some(rows_file.path())).unwrap();
    assert_eq!(replaced.row_count(), 1);
    assert_eq!(replaced.rows[0].get(0), None);
    assert_eq!(replaced.rows[0].get(1), Some("only"));
}

#[test]
fn missing_model_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");
    let err = load_model(&path, None).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn variables_table_lists_template_columns() {
    let model_file = temp_file(RULE_JSON);
    let table = variables(model_file.path()).unwrap().to_string();
    assert!(table.contains("$f1"), "{table}");
    assert!(table.contains("$f2"), "{table}");
    assert!(table.contains("template key"), "{table}");
}

#[test]
fn output_is_written_to_the_requested_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.drl");
    write_output("rule \"r\"\nend\n", Some(&path)).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "rule \"r\"\nend\n");
}
