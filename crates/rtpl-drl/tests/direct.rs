//! Direct marshalling: template keys resolved against one row.

use rtpl_drl::{
    EmptyDataProvider, MarshalError, MarshalOptions, RowDataProvider, marshal_rule,
};
use rtpl_model::{
    ActionFieldValue, ActionInsertFact, ActionSetField, CompositeFieldConstraint,
    ConnectiveConstraint, DataType, FactPattern, FreeFormLine, FromCollectPattern, Junction, Row,
    RuleModel, SingleFieldConstraint, ValueKind,
};

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn render(rule: &RuleModel, names: &[&str], cells: &[Option<&str>]) -> String {
    let columns = columns(names);
    let row = Row::from_cells(cells);
    let provider = RowDataProvider::new(&columns, &row);
    let drl = marshal_rule(rule, &provider, &MarshalOptions::default()).expect("marshal rule");
    squash(&drl)
}

fn person_rule() -> RuleModel {
    RuleModel::new("t1").with_lhs(
        FactPattern::new("Person")
            .with_constraint(
                SingleFieldConstraint::template("field1", "==", "$f1")
                    .with_data_type(DataType::String),
            )
            .with_constraint(SingleFieldConstraint::template("field2", "==", "$f2")),
    )
}

#[test]
fn single_template_constraint_is_resolved() {
    let rule = RuleModel::new("t1").with_lhs(
        FactPattern::new("Person")
            .with_constraint(SingleFieldConstraint::template("field1", "==", "$f1")),
    );
    let drl = render(&rule, &["$f1"], &[Some("foo")]);
    insta::assert_snapshot!(drl, @r#"rule "t1" dialect "mvel" when Person( field1 == "foo" ) then end"#);
}

#[test]
fn missing_value_drops_constraint_and_separator() {
    let drl = render(&person_rule(), &["$f1", "$f2"], &[None, Some("bar")]);
    assert!(drl.contains("Person( field2 == \"bar\" )"), "{drl}");
    assert!(!drl.contains(','), "{drl}");

    let drl = render(&person_rule(), &["$f1", "$f2"], &[Some("foo"), Some("")]);
    assert!(drl.contains("Person( field1 == \"foo\" )"), "{drl}");
}

#[test]
fn both_values_keep_both_constraints() {
    let drl = render(&person_rule(), &["$f1", "$f2"], &[Some("foo"), Some("bar")]);
    assert!(
        drl.contains("Person( field1 == \"foo\", field2 == \"bar\" )"),
        "{drl}"
    );
}

#[test]
fn free_form_line_is_dropped_when_any_key_is_missing() {
    let rule = RuleModel::new("r")
        .with_lhs(FreeFormLine::new("Person( age > @{min} && age < @{max} )"))
        .with_lhs(FactPattern::new("Account"));

    let full = render(&rule, &["min", "max"], &[Some("18"), Some("65")]);
    assert!(full.contains("Person( age > 18 && age < 65 )"), "{full}");

    let partial = render(&rule, &["min", "max"], &[Some("18"), None]);
    assert!(!partial.contains("Person"), "{partial}");
    assert!(!partial.contains("@{"), "{partial}");
    assert!(partial.contains("Account( )"), "{partial}");
}

#[test]
fn from_collect_with_free_form_source_is_atomic() {
    let rule = RuleModel::new("r").with_lhs(FromCollectPattern::new(
        FactPattern::new("java.util.ArrayList").bound_to("$list"),
        FreeFormLine::new("Person( name == \"@{name}\", age > @{age} )"),
    ));

    let present = render(&rule, &["name", "age"], &[Some("bob"), Some("21")]);
    insta::assert_snapshot!(present, @r#"rule "r" dialect "mvel" when $list : java.util.ArrayList( ) from collect ( Person( name == "bob", age > 21 ) ) then end"#);

    let absent = render(&rule, &["name", "age"], &[Some("bob"), None]);
    assert!(!absent.contains("collect"), "{absent}");
    assert!(!absent.contains("Person"), "{absent}");
}

#[test]
fn from_collect_with_fact_source_is_always_written() {
    let rule = RuleModel::new("r").with_lhs(FromCollectPattern::new(
        FactPattern::new("java.util.ArrayList"),
        FactPattern::new("Person")
            .with_constraint(SingleFieldConstraint::template("name", "==", "$n")),
    ));
    let drl = render(&rule, &["$n"], &[None]);
    assert!(
        drl.contains("java.util.ArrayList( ) from collect ( Person( ) )"),
        "{drl}"
    );
}

#[test]
fn composite_children_are_dropped_individually() {
    let rule = RuleModel::new("r").with_lhs(
        FactPattern::new("Person")
            .with_constraint(SingleFieldConstraint::literal("active", "==", "true").with_data_type(DataType::Boolean))
            .with_constraint(
                CompositeFieldConstraint::new(Junction::Or)
                    .with_constraint(SingleFieldConstraint::template("a", "==", "$a"))
                    .with_constraint(SingleFieldConstraint::template("b", "==", "$b"))
                    .with_constraint(SingleFieldConstraint::template("c", "==", "$c")),
            ),
    );

    let drl = render(&rule, &["$a", "$b", "$c"], &[None, Some("2"), Some("3")]);
    assert!(
        drl.contains("Person( active == true, b == \"2\" || c == \"3\" )"),
        "{drl}"
    );

    let drl = render(&rule, &["$a", "$b", "$c"], &[None, None, None]);
    assert!(drl.contains("Person( active == true )"), "{drl}");
}

#[test]
fn connectives_are_dropped_without_their_host() {
    let rule = RuleModel::new("r").with_lhs(
        FactPattern::new("Person").with_constraint(
            SingleFieldConstraint::template("age", ">", "$min")
                .with_data_type(DataType::Numeric)
                .with_connective(ConnectiveConstraint::new("&& <", "$max", ValueKind::Template)),
        ),
    );

    let drl = render(&rule, &["$min", "$max"], &[Some("18"), None]);
    assert!(drl.contains("Person( age > 18 )"), "{drl}");

    let drl = render(&rule, &["$min", "$max"], &[Some("18"), Some("65")]);
    assert!(drl.contains("Person( age > 18 && < 65 )"), "{drl}");

    let drl = render(&rule, &["$min", "$max"], &[None, Some("65")]);
    assert!(drl.contains("Person( )"), "{drl}");
}

#[test]
fn actions_skip_missing_template_values() {
    let rule = RuleModel::new("r")
        .with_lhs(FactPattern::new("Person").bound_to("$p"))
        .with_rhs(
            ActionSetField::new("$p")
                .with_value(ActionFieldValue::template("discount", "$rate").with_data_type(DataType::BigDecimal))
                .with_value(ActionFieldValue::template("note", "$note")),
        )
        .with_rhs(
            ActionInsertFact::new("Audit")
                .with_value(ActionFieldValue::template("note", "$note"))
                .with_value(ActionFieldValue::literal("kind", "discount")),
        )
        .with_rhs(FreeFormLine::new("System.out.println( \"@{note}\" );"));

    let drl = render(&rule, &["$rate", "$note"], &[Some("0.15"), None]);
    insta::assert_snapshot!(drl, @r#"rule "r" dialect "mvel" when $p : Person( ) then $p.setDiscount( new java.math.BigDecimal( "0.15" ) ); Audit fact0 = new Audit(); fact0.setKind( "discount" ); insert( fact0 ); end"#);
}

#[test]
fn empty_provider_suppresses_every_template_fragment() {
    let rule = person_rule().with_lhs(FreeFormLine::new("eval( true )"));
    let drl = marshal_rule(&rule, &EmptyDataProvider, &MarshalOptions::default())
        .expect("marshal rule");
    assert_eq!(
        squash(&drl),
        "rule \"t1\" dialect \"mvel\" when Person( ) eval( true ) then end"
    );
}

#[test]
fn dialect_default_can_be_disabled() {
    let options = MarshalOptions::default().with_default_dialect(None::<String>);
    let drl = marshal_rule(&person_rule(), &EmptyDataProvider, &options).expect("marshal rule");
    assert!(!drl.contains("dialect"));
}

#[test]
fn malformed_template_fails_the_whole_pass() {
    let mut constraint = SingleFieldConstraint::template("field1", "==", "$f1");
    constraint.value = Some(String::new());
    let rule = RuleModel::new("r").with_lhs(FactPattern::new("Person").with_constraint(constraint));

    let err = marshal_rule(&rule, &EmptyDataProvider, &MarshalOptions::default())
        .expect_err("empty key must fail");
    assert!(matches!(err, MarshalError::MalformedModel { .. }), "{err}");
    assert!(err.to_string().contains("Person.field1"));
}

#[test]
fn marshalling_twice_is_identical_and_leaves_the_model_untouched() {
    let rule = person_rule().with_lhs(FreeFormLine::new("eval( @{$f1} )"));
    let before = rule.clone();

    let first = render(&rule, &["$f1", "$f2"], &[Some("x"), None]);
    let other = render(&rule, &["$f1", "$f2"], &[None, Some("y")]);
    let again = render(&rule, &["$f1", "$f2"], &[Some("x"), None]);

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(rule, before);
}

#[test]
fn works_with_a_provider_trait_object() {
    let columns = columns(&["$f1", "$f2"]);
    let row = Row::from_cells(&[Some("foo"), Some("bar")]);
    let provider = RowDataProvider::new(&columns, &row);
    let dynamic: &dyn rtpl_drl::TemplateDataProvider = &provider;
    let drl = marshal_rule(&person_rule(), dynamic, &MarshalOptions::default()).expect("marshal");
    assert!(drl.contains("field2 == \"bar\""));
}

#[test]
fn free_form_keys_are_taken_verbatim() {
    let rule = RuleModel::new("r").with_lhs(FreeFormLine::new("eval( @{a||b} > @{ c } )"));
    let drl = render(&rule, &["a||b", " c "], &[Some("5"), Some("1")]);
    assert!(drl.contains("eval( 5 > 1 )"), "{drl}");
}
