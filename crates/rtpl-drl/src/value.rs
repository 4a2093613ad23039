//! Rendering of constraint and action values.
//!
//! Values are written as the rule language expects them for their data type.
//! Nothing is escaped: a value that already carries its own quotes is kept
//! as is.

use rtpl_model::{DataType, FieldNature, ValueKind};

/// Append a constraint value (`when` side) to `out`.
pub fn write_constraint_value(
    out: &mut String,
    kind: ValueKind,
    data_type: Option<DataType>,
    value: &str,
) {
    match kind {
        ValueKind::Variable | ValueKind::Expression => out.push_str(value),
        ValueKind::Literal | ValueKind::Template => match data_type {
            None | Some(DataType::String | DataType::Date) => write_quoted(out, value),
            Some(DataType::Boolean | DataType::Numeric | DataType::Comparable) => {
                out.push_str(value);
            }
            Some(DataType::BigDecimal) => {
                out.push_str(value);
                out.push('B');
            }
            Some(DataType::BigInteger) => {
                out.push_str(value);
                out.push('I');
            }
        },
    }
}

/// Append an action value (`then` side) to `out`.
pub fn write_action_value(
    out: &mut String,
    nature: FieldNature,
    data_type: Option<DataType>,
    value: &str,
) {
    match nature {
        FieldNature::Variable | FieldNature::Formula => out.push_str(value),
        FieldNature::Literal | FieldNature::Template => match data_type {
            None | Some(DataType::String | DataType::Date) => write_quoted(out, value),
            Some(DataType::BigDecimal) => {
                out.push_str("new java.math.BigDecimal( \"");
                out.push_str(value);
                out.push_str("\" )");
            }
            Some(DataType::BigInteger) => {
                out.push_str("new java.math.BigInteger( \"");
                out.push_str(value);
                out.push_str("\" )");
            }
            Some(DataType::Boolean | DataType::Numeric | DataType::Comparable) => {
                out.push_str(value);
            }
        },
    }
}

/// Setter name for a field: `name` becomes `setName`.
pub fn setter_name(field: &str) -> String {
    let mut chars = field.chars();
    let mut setter = String::with_capacity(field.len() + 3);
    setter.push_str("set");
    if let Some(first) = chars.next() {
        setter.extend(first.to_uppercase());
        setter.push_str(chars.as_str());
    }
    setter
}

fn write_quoted(out: &mut String, value: &str) {
    if is_quoted(value) {
        out.push_str(value);
    } else {
        out.push('"');
        out.push_str(value);
        out.push('"');
    }
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}
