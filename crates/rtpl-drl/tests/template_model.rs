//! Template models marshalled end to end, in both modes.
//!
//! Output is compared with whitespace runs collapsed; only token order matters.

use rtpl_drl::{MarshalMode, MarshalOptions, TemplateMarshaller};
use rtpl_model::{
    CompositeFieldConstraint, DataType, FactPattern, FreeFormLine, InterpolationVariable,
    Junction, Row, RuleModel, SingleFieldConstraint, TemplateModel,
};

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn marshal(model: &TemplateModel, mode: MarshalMode) -> String {
    let marshaller = TemplateMarshaller::new(MarshalOptions::default().with_mode(mode));
    squash(&marshaller.marshal(model).expect("marshal template model"))
}

fn assert_both_modes(model: &TemplateModel, expected: &str) {
    assert_eq!(marshal(model, MarshalMode::Macro), expected, "macro mode");
    assert_eq!(marshal(model, MarshalMode::Direct), expected, "direct mode");
}

fn simple_model(row: &[Option<&str>]) -> TemplateModel {
    let pattern = FactPattern::new("Person")
        .with_constraint(
            SingleFieldConstraint::template("field1", "==", "$f1").with_data_type(DataType::String),
        )
        .with_constraint(SingleFieldConstraint::template("field2", "==", "$f2"));
    TemplateModel::new(RuleModel::new("t1").with_lhs(pattern)).with_row(Row::from_cells(row))
}

fn composite_model(row: &[Option<&str>]) -> TemplateModel {
    let composite = CompositeFieldConstraint::new(Junction::Or)
        .with_constraint(
            SingleFieldConstraint::template("field1", "==", "$f1").with_data_type(DataType::String),
        )
        .with_constraint(
            SingleFieldConstraint::template("field2", "==", "$f2").with_data_type(DataType::String),
        );
    TemplateModel::new(
        RuleModel::new("t1").with_lhs(FactPattern::new("Person").with_constraint(composite)),
    )
    .with_row(Row::from_cells(row))
}

#[test]
fn simple_both_values() {
    assert_both_modes(
        &simple_model(&[Some("foo"), Some("bar")]),
        r#"rule "t1_0" dialect "mvel" when Person( field1 == "foo", field2 == "bar" ) then end"#,
    );
}

#[test]
fn simple_first_value() {
    assert_both_modes(
        &simple_model(&[Some("foo"), None]),
        r#"rule "t1_0" dialect "mvel" when Person( field1 == "foo" ) then end"#,
    );
}

#[test]
fn simple_second_value() {
    assert_both_modes(
        &simple_model(&[None, Some("bar")]),
        r#"rule "t1_0" dialect "mvel" when Person( field2 == "bar" ) then end"#,
    );
}

#[test]
fn composite_both_values() {
    assert_both_modes(
        &composite_model(&[Some("foo"), Some("bar")]),
        r#"rule "t1_0" dialect "mvel" when Person( field1 == "foo" || field2 == "bar" ) then end"#,
    );
}

#[test]
fn composite_first_value() {
    assert_both_modes(
        &composite_model(&[Some("foo"), None]),
        r#"rule "t1_0" dialect "mvel" when Person( field1 == "foo" ) then end"#,
    );
}

#[test]
fn composite_second_value() {
    assert_both_modes(
        &composite_model(&[None, Some("bar")]),
        r#"rule "t1_0" dialect "mvel" when Person( field2 == "bar" ) then end"#,
    );
}

#[test]
fn composite_without_values_leaves_an_empty_pattern() {
    assert_both_modes(
        &composite_model(&[None, None]),
        r#"rule "t1_0" dialect "mvel" when Person( ) then end"#,
    );
}

#[test]
fn one_rule_per_row_with_a_single_package_header() {
    let mut model = simple_model(&[Some("a"), Some("b")]);
    model.rule.package_name = Some("org.acme".to_string());
    model.rule.imports.push("org.acme.Person".to_string());
    model.push_row(Row::from_cells(&[None, Some("c")]));

    let expected = concat!(
        r#"package org.acme; import org.acme.Person; "#,
        r#"rule "t1_0" dialect "mvel" when Person( field1 == "a", field2 == "b" ) then end "#,
        r#"rule "t1_1" dialect "mvel" when Person( field2 == "c" ) then end"#,
    );
    assert_both_modes(&model, expected);
}

#[test]
fn zero_rows_yield_empty_macro_output_and_one_plain_direct_rule() {
    let model = TemplateModel::new(simple_model(&[]).rule);

    assert_eq!(marshal(&model, MarshalMode::Macro), "");
    insta::assert_snapshot!(
        marshal(&model, MarshalMode::Direct),
        @r#"rule "t1" dialect "mvel" when Person( ) then end"#
    );
}

#[test]
fn declared_variables_fix_column_order() {
    let pattern = FactPattern::new("Person")
        .with_constraint(SingleFieldConstraint::template("field1", "==", "$f1"))
        .with_constraint(SingleFieldConstraint::template("field2", "==", "$f2"));
    let rule = RuleModel::new("t1")
        .with_variable(InterpolationVariable::new("$f2"))
        .with_variable(InterpolationVariable::new("$f1"))
        .with_lhs(pattern);
    let model = TemplateModel::new(rule).with_row(Row::from_cells(&[Some("second"), None]));

    assert_both_modes(
        &model,
        r#"rule "t1_0" dialect "mvel" when Person( field2 == "second" ) then end"#,
    );
}

#[test]
fn free_form_lines_follow_row_values() {
    let rule = RuleModel::new("t1")
        .with_lhs(FactPattern::new("Person").bound_to("$p"))
        .with_lhs(FreeFormLine::new("eval( $p.getAge() > @{min} )"))
        .with_rhs(FreeFormLine::new("$p.setTier( \"@{tier}\" );"));
    let model = TemplateModel::new(rule)
        .with_row(Row::from_cells(&[Some("18"), Some("gold")]))
        .with_row(Row::from_cells(&[None, Some("silver")]));

    let expected = concat!(
        r#"rule "t1_0" dialect "mvel" when $p : Person( ) eval( $p.getAge() > 18 ) "#,
        r#"then $p.setTier( "gold" ); end "#,
        r#"rule "t1_1" dialect "mvel" when $p : Person( ) then $p.setTier( "silver" ); end"#,
    );
    assert_both_modes(&model, expected);
}

#[test]
fn keys_missing_from_declared_variables_read_as_absent() {
    let pattern = FactPattern::new("Person")
        .with_constraint(SingleFieldConstraint::template("a", "==", "$a"))
        .with_constraint(SingleFieldConstraint::template("b", "==", "$b"));
    let rule = RuleModel::new("t1")
        .with_variable(InterpolationVariable::new("$a"))
        .with_lhs(pattern)
        .with_lhs(FreeFormLine::new("eval( @{$b} > 0 )"));
    let model = TemplateModel::new(rule).with_row(Row::from_cells(&[Some("x")]));

    assert_both_modes(
        &model,
        r#"rule "t1_0" dialect "mvel" when Person( a == "x" ) then end"#,
    );
}

#[test]
fn spaced_names_and_unclosed_openers_agree_across_modes() {
    let rule = RuleModel::new("t1")
        .with_lhs(FactPattern::new("Person").bound_to("$p"))
        .with_lhs(FreeFormLine::new("eval( $p.getAge() > @{ min } )"))
        .with_lhs(FreeFormLine::new("eval( $p.getName() != \"@{\" )"));
    let model = TemplateModel::new(rule)
        .with_row(Row::from_cells(&[Some("18")]))
        .with_row(Row::from_cells(&[None]));

    let expected = concat!(
        r#"rule "t1_0" dialect "mvel" when $p : Person( ) eval( $p.getAge() > 18 ) "#,
        r#"eval( $p.getName() != "@{" ) then end "#,
        r#"rule "t1_1" dialect "mvel" when $p : Person( ) eval( $p.getName() != "@{" ) then end"#,
    );
    assert_both_modes(&model, expected);
}
