//! Left-hand side of a rule: fact patterns, field constraints and free-form lines.

use serde::{Deserialize, Serialize};

use crate::enums::{DataType, Junction, ValueKind};

/// One item of the `when` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LhsItem {
    Fact(FactPattern),
    FreeForm(FreeFormLine),
    FromCollect(FromCollectPattern),
}

impl From<FactPattern> for LhsItem {
    fn from(pattern: FactPattern) -> Self {
        LhsItem::Fact(pattern)
    }
}

impl From<FreeFormLine> for LhsItem {
    fn from(line: FreeFormLine) -> Self {
        LhsItem::FreeForm(line)
    }
}

impl From<FromCollectPattern> for LhsItem {
    fn from(pattern: FromCollectPattern) -> Self {
        LhsItem::FromCollect(pattern)
    }
}

/// A matched fact: `$p : Person( age > 18 )`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactPattern {
    pub fact_type: String,
    #[serde(default)]
    pub bound_name: Option<String>,
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub constraints: Vec<FieldConstraint>,
}

impl FactPattern {
    pub fn new(fact_type: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            bound_name: None,
            negated: false,
            constraints: Vec::new(),
        }
    }

    /// Bind the matched fact to a variable name.
    pub fn bound_to(mut self, name: impl Into<String>) -> Self {
        self.bound_name = Some(name.into());
        self
    }

    /// Match the absence of the fact (`not Person( .. )`).
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<FieldConstraint>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn add_constraint(&mut self, constraint: impl Into<FieldConstraint>) {
        self.constraints.push(constraint.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldConstraint {
    Single(SingleFieldConstraint),
    Composite(CompositeFieldConstraint),
}

impl From<SingleFieldConstraint> for FieldConstraint {
    fn from(constraint: SingleFieldConstraint) -> Self {
        FieldConstraint::Single(constraint)
    }
}

impl From<CompositeFieldConstraint> for FieldConstraint {
    fn from(constraint: CompositeFieldConstraint) -> Self {
        FieldConstraint::Composite(constraint)
    }
}

/// A comparison on one field, optionally followed by connective comparisons
/// on the same field (`age > 18 && < 65`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleFieldConstraint {
    pub field_name: String,
    #[serde(default)]
    pub field_binding: Option<String>,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub value_kind: ValueKind,
    #[serde(default)]
    pub connectives: Vec<ConnectiveConstraint>,
}

impl SingleFieldConstraint {
    pub fn new(
        field_name: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
        value_kind: ValueKind,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_binding: None,
            data_type: None,
            operator: Some(operator.into()),
            value: Some(value.into()),
            value_kind,
            connectives: Vec::new(),
        }
    }

    pub fn literal(
        field_name: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(field_name, operator, value, ValueKind::Literal)
    }

    /// A constraint whose value is the template key `key` (the key doubles as
    /// the column name of the row data).
    pub fn template(
        field_name: impl Into<String>,
        operator: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::new(field_name, operator, key, ValueKind::Template)
    }

    /// A bare field reference, typically used only to bind the field.
    pub fn field(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_binding: None,
            data_type: None,
            operator: None,
            value: None,
            value_kind: ValueKind::Literal,
            connectives: Vec::new(),
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn bound_to(mut self, name: impl Into<String>) -> Self {
        self.field_binding = Some(name.into());
        self
    }

    pub fn with_connective(mut self, connective: ConnectiveConstraint) -> Self {
        self.connectives.push(connective);
        self
    }

    pub fn is_template(&self) -> bool {
        self.value_kind == ValueKind::Template
    }
}

/// A comparison chained onto its host constraint. The operator carries the
/// junction, e.g. `"|| =="` or `"&& <"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectiveConstraint {
    pub operator: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub value_kind: ValueKind,
}

impl ConnectiveConstraint {
    pub fn new(operator: impl Into<String>, value: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            operator: operator.into(),
            value: Some(value.into()),
            value_kind,
        }
    }

    pub fn is_template(&self) -> bool {
        self.value_kind == ValueKind::Template
    }
}

/// A group of constraints joined by a single junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFieldConstraint {
    pub junction: Junction,
    #[serde(default)]
    pub constraints: Vec<FieldConstraint>,
}

impl CompositeFieldConstraint {
    pub fn new(junction: Junction) -> Self {
        Self {
            junction,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<FieldConstraint>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

/// Raw rule-language text, possibly containing `@{key}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeFormLine {
    pub text: String,
}

impl FreeFormLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// `Outer( .. ) from collect ( <source> )`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromCollectPattern {
    pub fact: FactPattern,
    pub source: CollectSource,
}

impl FromCollectPattern {
    pub fn new(fact: FactPattern, source: impl Into<CollectSource>) -> Self {
        Self {
            fact,
            source: source.into(),
        }
    }
}

/// The inner pattern of a `from collect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectSource {
    Fact(FactPattern),
    FreeForm(FreeFormLine),
}

impl From<FactPattern> for CollectSource {
    fn from(pattern: FactPattern) -> Self {
        CollectSource::Fact(pattern)
    }
}

impl From<FreeFormLine> for CollectSource {
    fn from(line: FreeFormLine) -> Self {
        CollectSource::FreeForm(line)
    }
}
