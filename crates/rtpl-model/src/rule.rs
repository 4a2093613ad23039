use serde::{Deserialize, Serialize};

use crate::action::RhsItem;
use crate::enums::DataType;
use crate::pattern::LhsItem;

/// A complete rule definition as produced by an authoring tool.
///
/// The model is read-only while it is being marshalled; every marshal pass
/// starts from the same tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleModel {
    pub name: String,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<RuleAttribute>,
    #[serde(default)]
    pub metadata: Vec<RuleMetadata>,
    #[serde(default)]
    pub lhs: Vec<LhsItem>,
    #[serde(default)]
    pub rhs: Vec<RhsItem>,
    /// Declared template columns. When empty, columns are derived from the
    /// template keys found in the rule.
    #[serde(default)]
    pub interpolation_variables: Vec<InterpolationVariable>,
    #[serde(default)]
    pub has_dsl_sentences: bool,
}

impl RuleModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_name: None,
            imports: Vec::new(),
            attributes: Vec::new(),
            metadata: Vec::new(),
            lhs: Vec::new(),
            rhs: Vec::new(),
            interpolation_variables: Vec::new(),
            has_dsl_sentences: false,
        }
    }

    pub fn with_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(RuleAttribute::new(name, value));
        self
    }

    pub fn add_lhs_item(&mut self, item: impl Into<LhsItem>) {
        self.lhs.push(item.into());
    }

    pub fn add_rhs_item(&mut self, item: impl Into<RhsItem>) {
        self.rhs.push(item.into());
    }

    pub fn with_lhs(mut self, item: impl Into<LhsItem>) -> Self {
        self.add_lhs_item(item);
        self
    }

    pub fn with_rhs(mut self, item: impl Into<RhsItem>) -> Self {
        self.add_rhs_item(item);
        self
    }

    pub fn with_variable(mut self, variable: InterpolationVariable) -> Self {
        self.interpolation_variables.push(variable);
        self
    }

    /// Returns the attribute with the given name, ignoring case.
    pub fn attribute(&self, name: &str) -> Option<&RuleAttribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
    }
}

/// A rule attribute such as `salience 10` or `dialect "mvel"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAttribute {
    pub name: String,
    pub value: String,
}

/// Attributes whose values are written without quotes.
const UNQUOTED_ATTRIBUTES: &[&str] = &[
    "salience",
    "duration",
    "no-loop",
    "lock-on-active",
    "auto-focus",
    "enabled",
];

impl RuleAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true if the value is written verbatim rather than quoted.
    pub fn is_unquoted(&self) -> bool {
        UNQUOTED_ATTRIBUTES
            .iter()
            .any(|name| self.name.eq_ignore_ascii_case(name))
    }
}

/// A metadata annotation, written as `@name(value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl RuleMetadata {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A declared template column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationVariable {
    pub var_name: String,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub fact_type: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl InterpolationVariable {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            data_type: None,
            fact_type: None,
            field: None,
        }
    }
}
