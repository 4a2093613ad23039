//! Template column discovery.
//!
//! Row cells line up positionally with the rule's template columns. Declared
//! interpolation variables win; otherwise the columns are the distinct
//! template keys of the rule in traversal order.

use std::collections::HashSet;

use rtpl_model::{
    ActionFieldValue, CollectSource, FactPattern, FieldConstraint, LhsItem, RhsItem, RuleModel,
};

use crate::placeholder;

/// Column names for the rule's row data.
pub fn template_columns(rule: &RuleModel) -> Vec<String> {
    if rule.interpolation_variables.is_empty() {
        template_keys(rule)
    } else {
        rule.interpolation_variables
            .iter()
            .map(|variable| variable.var_name.clone())
            .collect()
    }
}

/// Distinct template keys referenced anywhere in the rule, first use first.
pub fn template_keys(rule: &RuleModel) -> Vec<String> {
    let mut collector = KeyCollector::default();
    for item in &rule.lhs {
        match item {
            LhsItem::Fact(pattern) => collector.pattern(pattern),
            LhsItem::FreeForm(line) => collector.text(&line.text),
            LhsItem::FromCollect(collect) => {
                collector.pattern(&collect.fact);
                match &collect.source {
                    CollectSource::Fact(pattern) => collector.pattern(pattern),
                    CollectSource::FreeForm(line) => collector.text(&line.text),
                }
            }
        }
    }
    for item in &rule.rhs {
        match item {
            RhsItem::InsertFact(action) => collector.field_values(&action.field_values),
            RhsItem::SetField(action) => collector.field_values(&action.field_values),
            RhsItem::RetractFact(_) => {}
            RhsItem::FreeForm(line) => collector.text(&line.text),
        }
    }
    collector.keys
}

#[derive(Default)]
struct KeyCollector {
    seen: HashSet<String>,
    keys: Vec<String>,
}

impl KeyCollector {
    fn push(&mut self, key: &str) {
        if !key.is_empty() && self.seen.insert(key.to_string()) {
            self.keys.push(key.to_string());
        }
    }

    fn pattern(&mut self, pattern: &FactPattern) {
        for constraint in &pattern.constraints {
            self.constraint(constraint);
        }
    }

    fn constraint(&mut self, constraint: &FieldConstraint) {
        match constraint {
            FieldConstraint::Single(single) => {
                if single.is_template()
                    && let Some(key) = &single.value
                {
                    self.push(key);
                }
                for connective in &single.connectives {
                    if connective.is_template()
                        && let Some(key) = &connective.value
                    {
                        self.push(key);
                    }
                }
            }
            FieldConstraint::Composite(composite) => {
                for child in &composite.constraints {
                    self.constraint(child);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        for name in placeholder::names(text) {
            self.push(name);
        }
    }

    fn field_values(&mut self, values: &[ActionFieldValue]) {
        for value in values {
            if value.is_template()
                && let Some(key) = &value.value
            {
                self.push(key);
            }
        }
    }
}
