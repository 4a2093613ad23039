//! Tests for rtpl-model types.

use rtpl_model::{
    ActionFieldValue, ActionSetField, CollectSource, DataType, FactPattern, FieldConstraint,
    FreeFormLine, FromCollectPattern, LhsItem, RhsItem, Row, RuleModel, SingleFieldConstraint,
    TemplateModel, ValueKind,
};

#[test]
fn rule_model_deserializes_from_authoring_json() {
    let json = r#"{
        "name": "discount",
        "package_name": "org.acme",
        "lhs": [
            {
                "kind": "fact",
                "fact_type": "Person",
                "bound_name": "$p",
                "constraints": [
                    {
                        "kind": "single",
                        "field_name": "age",
                        "data_type": "numeric",
                        "operator": ">",
                        "value": "$minAge",
                        "value_kind": "template"
                    }
                ]
            },
            { "kind": "free_form", "text": "eval( @{check} )" }
        ],
        "rhs": [
            {
                "kind": "set_field",
                "variable": "$p",
                "field_values": [
                    { "field": "discount", "value": "$rate", "nature": "template", "data_type": "numeric" }
                ]
            }
        ]
    }"#;

    let rule: RuleModel = serde_json::from_str(json).expect("deserialize rule");

    assert_eq!(rule.name, "discount");
    assert_eq!(rule.package_name.as_deref(), Some("org.acme"));
    assert!(rule.imports.is_empty());
    assert!(!rule.has_dsl_sentences);

    let LhsItem::Fact(pattern) = &rule.lhs[0] else {
        panic!("expected a fact pattern, got {:?}", rule.lhs[0]);
    };
    assert_eq!(pattern.bound_name.as_deref(), Some("$p"));
    let FieldConstraint::Single(constraint) = &pattern.constraints[0] else {
        panic!("expected a single constraint");
    };
    assert_eq!(constraint.value_kind, ValueKind::Template);
    assert_eq!(constraint.data_type, Some(DataType::Numeric));
    assert!(constraint.connectives.is_empty());

    assert_eq!(
        rule.lhs[1],
        LhsItem::FreeForm(FreeFormLine::new("eval( @{check} )"))
    );

    let RhsItem::SetField(action) = &rule.rhs[0] else {
        panic!("expected a set-field action");
    };
    assert!(action.field_values[0].is_template());
}

#[test]
fn builders_match_deserialized_shape() {
    let built = RuleModel::new("r")
        .with_lhs(
            FactPattern::new("Person")
                .with_constraint(SingleFieldConstraint::template("name", "==", "$n")),
        )
        .with_rhs(ActionSetField::new("$p").with_value(ActionFieldValue::literal("age", "1")));

    let json = serde_json::to_string(&built).expect("serialize rule");
    let parsed: RuleModel = serde_json::from_str(&json).expect("deserialize rule");
    assert_eq!(parsed, built);
}

#[test]
fn template_rows_serialize_as_nullable_arrays() {
    let model = TemplateModel::new(RuleModel::new("t1"))
        .with_row(Row::from_cells(&[Some("foo"), None]));

    let json = serde_json::to_value(&model).expect("serialize template model");
    assert_eq!(json["rows"], serde_json::json!([["foo", null]]));
    assert_eq!(model.row_count(), 1);
}

#[test]
fn collect_source_accepts_free_form_lines() {
    let pattern = FromCollectPattern::new(
        FactPattern::new("java.util.ArrayList"),
        FreeFormLine::new("Person( name == \"@{name}\" )"),
    );
    assert!(matches!(pattern.source, CollectSource::FreeForm(_)));
}
