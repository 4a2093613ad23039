//! Right-hand side of a rule: actions executed when the rule fires.

use serde::{Deserialize, Serialize};

use crate::enums::{DataType, FieldNature};
use crate::pattern::FreeFormLine;

/// One item of the `then` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RhsItem {
    InsertFact(ActionInsertFact),
    SetField(ActionSetField),
    RetractFact(ActionRetractFact),
    FreeForm(FreeFormLine),
}

impl From<ActionInsertFact> for RhsItem {
    fn from(action: ActionInsertFact) -> Self {
        RhsItem::InsertFact(action)
    }
}

impl From<ActionSetField> for RhsItem {
    fn from(action: ActionSetField) -> Self {
        RhsItem::SetField(action)
    }
}

impl From<ActionRetractFact> for RhsItem {
    fn from(action: ActionRetractFact) -> Self {
        RhsItem::RetractFact(action)
    }
}

impl From<FreeFormLine> for RhsItem {
    fn from(line: FreeFormLine) -> Self {
        RhsItem::FreeForm(line)
    }
}

/// Create and insert a new fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInsertFact {
    pub fact_type: String,
    #[serde(default)]
    pub bound_name: Option<String>,
    #[serde(default)]
    pub field_values: Vec<ActionFieldValue>,
}

impl ActionInsertFact {
    pub fn new(fact_type: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            bound_name: None,
            field_values: Vec::new(),
        }
    }

    pub fn bound_to(mut self, name: impl Into<String>) -> Self {
        self.bound_name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: ActionFieldValue) -> Self {
        self.field_values.push(value);
        self
    }
}

/// Assign fields of an already bound fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSetField {
    pub variable: String,
    #[serde(default)]
    pub field_values: Vec<ActionFieldValue>,
}

impl ActionSetField {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            field_values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: ActionFieldValue) -> Self {
        self.field_values.push(value);
        self
    }
}

/// Retract the fact bound to `variable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRetractFact {
    pub variable: String,
}

impl ActionRetractFact {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

/// A single field assignment inside an insert or set-field action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFieldValue {
    pub field: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub nature: FieldNature,
    #[serde(default)]
    pub data_type: Option<DataType>,
}

impl ActionFieldValue {
    pub fn new(field: impl Into<String>, value: impl Into<String>, nature: FieldNature) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            nature,
            data_type: None,
        }
    }

    pub fn literal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, value, FieldNature::Literal)
    }

    pub fn template(field: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(field, key, FieldNature::Template)
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn is_template(&self) -> bool {
        self.nature == FieldNature::Template
    }
}
