//! Type-safe enumerations for rule model concepts.
//!
//! Authoring tools store these as loose strings; parsing is lenient about
//! case and accepts the common Java type names for field data types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Data type of a fact field, used to decide how a value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Text; rendered double-quoted.
    String,
    /// `true` / `false`; rendered raw.
    Boolean,
    /// Date literal; rendered double-quoted.
    Date,
    /// Any primitive number (Integer, Long, Double, Float, Short, Byte).
    Numeric,
    /// Arbitrary precision decimal.
    BigDecimal,
    /// Arbitrary precision integer.
    BigInteger,
    /// A comparable object reference; rendered raw.
    Comparable,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Boolean => "Boolean",
            DataType::Date => "Date",
            DataType::Numeric => "Numeric",
            DataType::BigDecimal => "BigDecimal",
            DataType::BigInteger => "BigInteger",
            DataType::Comparable => "Comparable",
        }
    }

    /// Returns true if values of this type are written without quotes.
    pub fn is_unquoted(&self) -> bool {
        matches!(
            self,
            DataType::Boolean | DataType::Numeric | DataType::Comparable
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "STRING" => Ok(DataType::String),
            "BOOLEAN" => Ok(DataType::Boolean),
            "DATE" => Ok(DataType::Date),
            "NUMERIC" | "INTEGER" | "LONG" | "DOUBLE" | "FLOAT" | "SHORT" | "BYTE" => {
                Ok(DataType::Numeric)
            }
            "BIGDECIMAL" | "BIG_DECIMAL" => Ok(DataType::BigDecimal),
            "BIGINTEGER" | "BIG_INTEGER" => Ok(DataType::BigInteger),
            "COMPARABLE" => Ok(DataType::Comparable),
            _ => Err(ModelError::UnknownDataType(s.to_string())),
        }
    }
}

/// How the value of a field constraint is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// A fixed value typed at authoring time.
    #[default]
    Literal,
    /// A variable bound elsewhere in the rule (`$p`).
    Variable,
    /// A template key resolved from a table row (`$f1`).
    Template,
    /// A free expression written verbatim.
    Expression,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Literal => "literal",
            ValueKind::Variable => "variable",
            ValueKind::Template => "template",
            ValueKind::Expression => "expression",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(ValueKind::Literal),
            "variable" => Ok(ValueKind::Variable),
            "template" => Ok(ValueKind::Template),
            "expression" => Ok(ValueKind::Expression),
            _ => Err(ModelError::UnknownValueKind(s.to_string())),
        }
    }
}

/// How the value of an action field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNature {
    #[default]
    Literal,
    Variable,
    Formula,
    Template,
}

impl FieldNature {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldNature::Literal => "literal",
            FieldNature::Variable => "variable",
            FieldNature::Formula => "formula",
            FieldNature::Template => "template",
        }
    }
}

impl fmt::Display for FieldNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldNature {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(FieldNature::Literal),
            "variable" => Ok(FieldNature::Variable),
            "formula" => Ok(FieldNature::Formula),
            "template" => Ok(FieldNature::Template),
            _ => Err(ModelError::UnknownFieldNature(s.to_string())),
        }
    }
}

/// Logical junction joining the children of a composite constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    /// The operator token as written in a rule (`&&` or `||`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Junction::And => "&&",
            Junction::Or => "||",
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Junction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "&&" | "AND" => Ok(Junction::And),
            "||" | "OR" => Ok(Junction::Or),
            _ => Err(ModelError::UnknownJunction(s.to_string())),
        }
    }
}
